use crate::{ParsedSentence, SpanRef};
use std::collections::BTreeSet;

/// The clause currently under analysis.
///
/// One context is created per decomposition call. Nested calls derive a
/// fresh context with [`ClauseContext::nested`]; a context is never shared
/// between sentences or between sibling calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClauseContext {
    range: SpanRef,
    head: usize,
    /// Tokens already accounted for by an enclosing pass
    consumed: BTreeSet<usize>,
    depth: usize,
}

impl ClauseContext {
    /// Context covering the whole sentence, headed by its root.
    pub fn sentence_level(sentence: &ParsedSentence) -> Self {
        Self {
            range: sentence.full_range(),
            head: sentence.root(),
            consumed: BTreeSet::new(),
            depth: 0,
        }
    }

    /// Derive the context of an embedded clause one level deeper.
    pub fn nested(
        &self,
        range: SpanRef,
        head: usize,
        consumed: impl IntoIterator<Item = usize>,
    ) -> Self {
        let mut all_consumed = self.consumed.clone();
        all_consumed.extend(consumed);
        Self {
            range,
            head,
            consumed: all_consumed,
            depth: self.depth + 1,
        }
    }

    pub fn range(&self) -> SpanRef {
        self.range
    }

    pub fn head(&self) -> usize {
        self.head
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn consumed(&self) -> &BTreeSet<usize> {
        &self.consumed
    }

    /// In range and not consumed by an enclosing pass.
    pub fn is_available(&self, index: usize) -> bool {
        self.range.contains(index) && !self.consumed.contains(&index)
    }

    /// Direct dependents of the clause head that belong to this clause.
    pub fn core_children(&self, sentence: &ParsedSentence) -> Vec<usize> {
        sentence
            .children(self.head)
            .iter()
            .copied()
            .filter(|&child| self.is_available(child))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_context_accumulates_consumed_tokens() {
        let sentence = ParsedSentence::from_conll(
            "1 She she PRON 2 nsubj
             2 read read VERB 0 ROOT
             3 the the DET 4 det
             4 book book NOUN 2 dobj
             5 that that PRON 7 dobj
             6 he he PRON 7 nsubj
             7 wrote write VERB 4 relcl",
        )
        .unwrap();

        let top = ClauseContext::sentence_level(&sentence);
        assert_eq!(top.depth(), 0);
        assert_eq!(top.head(), 1);
        assert_eq!(top.core_children(&sentence), vec![0, 3]);

        let inner = top.nested(SpanRef::new(4, 6), 6, [2, 3]);
        assert_eq!(inner.depth(), 1);
        assert!(inner.is_available(4));
        assert!(!inner.is_available(3));
        assert!(!inner.is_available(1));
        assert_eq!(inner.core_children(&sentence), vec![4, 5]);
    }
}
