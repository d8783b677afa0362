//! Validated parser output and the seam where a dependency parser plugs in.

use crate::{Pos, Relation, SlotError, SlotResult, SpanRef, Token};

/// Produces dependency-annotated tokens for a sentence.
///
/// The decomposition core never parses text itself; anything that can
/// deliver [`Token`]s with heads and relations can drive it.
pub trait DependencyParser {
    fn parse(&self, sentence: &str) -> SlotResult<Vec<Token>>;
}

/// A parsed sentence whose dependency structure has been validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedSentence {
    tokens: Vec<Token>,
    /// children[i] = indices of tokens whose head is i, in position order
    children: Vec<Vec<usize>>,
    root: usize,
}

impl ParsedSentence {
    /// Validate parser output.
    ///
    /// Every token must carry its own position as `index`, every head must
    /// exist, and at least one token must be a root. With several roots the
    /// first one is the sentence root.
    pub fn new(tokens: Vec<Token>) -> SlotResult<Self> {
        if tokens.is_empty() {
            return Err(SlotError::EmptySentence);
        }

        let mut children = vec![Vec::new(); tokens.len()];
        let mut root = None;

        for (position, token) in tokens.iter().enumerate() {
            if token.index != position {
                return Err(SlotError::MisnumberedToken {
                    position,
                    index: token.index,
                });
            }
            if token.head_index >= tokens.len() {
                return Err(SlotError::InvalidHead {
                    index: token.index,
                    head: token.head_index,
                });
            }
            if token.is_root() {
                if root.is_none() {
                    root = Some(position);
                }
            } else {
                children[token.head_index].push(position);
            }
        }

        let root = root.ok_or(SlotError::MissingRoot)?;

        Ok(Self {
            tokens,
            children,
            root,
        })
    }

    /// Parse a CoNLL block. See [`ConllReader`].
    pub fn from_conll(text: &str) -> SlotResult<Self> {
        Self::new(ConllReader.parse(text)?)
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn token(&self, index: usize) -> Option<&Token> {
        self.tokens.get(index)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn root(&self) -> usize {
        self.root
    }

    /// The whole sentence as a range.
    pub fn full_range(&self) -> SpanRef {
        SpanRef::new(0, self.tokens.len() - 1)
    }

    /// Direct dependents of `index`, in position order.
    pub fn children(&self, index: usize) -> &[usize] {
        self.children.get(index).map(Vec::as_slice).unwrap_or(&[])
    }

    /// First direct dependent of `index` carrying `relation`.
    pub fn child_with(&self, index: usize, relation: &Relation) -> Option<&Token> {
        self.children(index)
            .iter()
            .map(|&child| &self.tokens[child])
            .find(|child| &child.relation == relation)
    }

    /// Tokens inside `range`, clipped to the sentence.
    pub fn tokens_in(&self, range: SpanRef) -> &[Token] {
        if range.start_idx >= self.tokens.len() {
            return &[];
        }
        let end = range.end_idx.min(self.tokens.len() - 1);
        &self.tokens[range.start_idx..=end]
    }

    /// Whitespace-joined surface text of `range`.
    pub fn render(&self, range: SpanRef) -> String {
        self.tokens_in(range)
            .iter()
            .map(|token| token.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Reads already-parsed CoNLL text.
///
/// Two layouts are accepted, one token per line:
/// - CoNLL-U, ten tab-separated columns (`ID FORM LEMMA UPOS XPOS FEATS HEAD DEPREL DEPS MISC`)
/// - compact, six whitespace-separated columns (`ID FORM LEMMA UPOS HEAD DEPREL`)
///
/// IDs and heads are 1-based and head `0` marks the root. Lines starting
/// with `#` are comments; multiword-token ranges (`1-2`) and empty nodes
/// (`1.1`) are skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConllReader;

impl DependencyParser for ConllReader {
    fn parse(&self, sentence: &str) -> SlotResult<Vec<Token>> {
        let mut tokens = Vec::new();

        for (line_idx, line) in sentence.lines().enumerate() {
            let line_no = line_idx + 1;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let columns: Vec<&str> = if trimmed.contains('\t') {
                trimmed.split('\t').map(str::trim).collect()
            } else {
                trimmed.split_whitespace().collect()
            };

            let (id, form, lemma, upos, head, deprel) = match columns.len() {
                10 => (
                    columns[0], columns[1], columns[2], columns[3], columns[6], columns[7],
                ),
                6 => (
                    columns[0], columns[1], columns[2], columns[3], columns[4], columns[5],
                ),
                n => {
                    return Err(SlotError::MalformedInput {
                        line: line_no,
                        message: format!("expected 6 or 10 columns, found {}", n),
                    })
                }
            };

            if id.contains('-') || id.contains('.') {
                continue;
            }

            let id: usize = id.parse().map_err(|_| SlotError::MalformedInput {
                line: line_no,
                message: format!("token id `{}` is not a number", id),
            })?;
            let head: usize = head.parse().map_err(|_| SlotError::MalformedInput {
                line: line_no,
                message: format!("head `{}` is not a number", head),
            })?;

            let index = tokens.len();
            if id != index + 1 {
                return Err(SlotError::MalformedInput {
                    line: line_no,
                    message: format!("expected token id {}, found {}", index + 1, id),
                });
            }

            let head_index = if head == 0 { index } else { head - 1 };
            let relation = if head == 0 {
                Relation::Root
            } else {
                Relation::from_label(deprel)
            };

            tokens.push(Token::new(
                index,
                form,
                lemma,
                Pos::from_tag(upos),
                relation,
                head_index,
            ));
        }

        Ok(tokens)
    }
}
