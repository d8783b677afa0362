use crate::{ParsedSentence, SlotAssignment, SpanRef};
use std::fmt::Write;
use unicode_width::UnicodeWidthStr;

/// Internal representation of an included slot for display.
struct IncludedSlot {
    range: SpanRef,
    label: String,
    text: String,
}

/// Renders a sentence with one marker row per slot.
///
/// ```text
/// She  wrote  books
/// ╰─╯S: "She"
///      ╰───╯V: "wrote"
///             ╰───╯O1: "books"
/// ```
///
/// Nested slots follow their parent, labelled with the flattened key path
/// (`sub-o1.S`).
pub struct SlotLineDisplay<'a> {
    sentence: &'a ParsedSentence,
    include_slots: Vec<IncludedSlot>,
}

impl<'a> std::fmt::Display for SlotLineDisplay<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        const SPACE_PADDING: usize = 2;
        let mut token_idx_to_start_display_char_idx = Vec::new();
        let mut token_idx_to_end_display_char_idx = Vec::new();

        let mut opening_line = String::new();
        for (idx, token) in self.sentence.tokens().iter().enumerate() {
            if idx > 0 {
                opening_line.extend(std::iter::repeat(' ').take(SPACE_PADDING));
            }
            token_idx_to_start_display_char_idx.push(UnicodeWidthStr::width(&*opening_line));
            opening_line.push_str(&token.text);
            token_idx_to_end_display_char_idx.push(UnicodeWidthStr::width(&*opening_line));
        }

        f.write_str(&opening_line)?;

        let last_idx = self.sentence.len().saturating_sub(1);
        for slot in self.include_slots.iter() {
            if slot.range.start_idx > last_idx {
                continue;
            }
            f.write_char('\n')?;

            let start_char_idx = token_idx_to_start_display_char_idx[slot.range.start_idx];
            for _ in 0..start_char_idx {
                f.write_char(' ')?;
            }

            f.write_char('╰')?;

            let end_char_idx = token_idx_to_end_display_char_idx[slot.range.end_idx.min(last_idx)];
            let char_len = end_char_idx - start_char_idx;
            for _ in (start_char_idx + 1)..end_char_idx.saturating_sub(1) {
                f.write_char('─')?;
            }

            if char_len > 1 {
                f.write_char('╯')?;
            }

            write!(f, "{}: {:?}", slot.label, slot.text)?;
        }

        Ok(())
    }
}

impl<'a> SlotLineDisplay<'a> {
    pub fn new(sentence: &'a ParsedSentence) -> Self {
        SlotLineDisplay {
            sentence,
            include_slots: Vec::new(),
        }
    }

    /// Include every slot of `assignment`, nested ones included.
    pub fn include(&mut self, assignment: &SlotAssignment) {
        self.include_nested(assignment, "");
    }

    fn include_nested(&mut self, assignment: &SlotAssignment, prefix: &str) {
        for (key, slot) in assignment.iter() {
            self.include_slots.push(IncludedSlot {
                range: slot.span(),
                label: format!("{}{}", prefix, key.label()),
                text: slot.text().to_string(),
            });
            if let Some(sub) = slot.sub_slots() {
                let prefix = format!("{}{}.", prefix, key.sub_label());
                self.include_nested(sub, &prefix);
            }
        }
    }

    /// Include an arbitrary labelled range.
    pub fn include_span(&mut self, range: SpanRef, label: impl Into<String>) {
        self.include_slots.push(IncludedSlot {
            range,
            label: label.into(),
            text: self.sentence.render(range),
        });
    }

    /// Takes self
    pub fn with(mut self, assignment: &SlotAssignment) -> Self {
        self.include(assignment);
        self
    }
}
