//! The slot vocabulary and the assignments built from it.

use crate::{Span, SpanRef};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// One of the ten grammatical roles.
///
/// `Aux` and `V` are terminal; every other slot may hold a nested
/// decomposition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SlotKey {
    /// Subject
    S,
    /// Auxiliary group
    Aux,
    /// Main verb
    V,
    /// First object
    O1,
    /// Second object
    O2,
    /// Subject complement
    C1,
    /// Object complement
    C2,
    /// Pre-subject modifier
    M1,
    /// Mid modifier
    M2,
    /// Final modifier
    M3,
}

impl SlotKey {
    pub const ALL: [SlotKey; 10] = [
        SlotKey::S,
        SlotKey::Aux,
        SlotKey::V,
        SlotKey::O1,
        SlotKey::O2,
        SlotKey::C1,
        SlotKey::C2,
        SlotKey::M1,
        SlotKey::M2,
        SlotKey::M3,
    ];

    pub fn is_terminal(&self) -> bool {
        matches!(self, SlotKey::Aux | SlotKey::V)
    }

    pub fn is_recursible(&self) -> bool {
        !self.is_terminal()
    }

    pub fn is_modifier(&self) -> bool {
        matches!(self, SlotKey::M1 | SlotKey::M2 | SlotKey::M3)
    }

    pub fn label(&self) -> &'static str {
        match self {
            SlotKey::S => "S",
            SlotKey::Aux => "Aux",
            SlotKey::V => "V",
            SlotKey::O1 => "O1",
            SlotKey::O2 => "O2",
            SlotKey::C1 => "C1",
            SlotKey::C2 => "C2",
            SlotKey::M1 => "M1",
            SlotKey::M2 => "M2",
            SlotKey::M3 => "M3",
        }
    }

    /// Key under which a nested decomposition of this slot is emitted.
    pub fn sub_label(&self) -> &'static str {
        match self {
            SlotKey::S => "sub-s",
            SlotKey::Aux => "sub-aux",
            SlotKey::V => "sub-v",
            SlotKey::O1 => "sub-o1",
            SlotKey::O2 => "sub-o2",
            SlotKey::C1 => "sub-c1",
            SlotKey::C2 => "sub-c2",
            SlotKey::M1 => "sub-m1",
            SlotKey::M2 => "sub-m2",
            SlotKey::M3 => "sub-m3",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        SlotKey::ALL.into_iter().find(|key| key.label() == label)
    }
}

impl fmt::Display for SlotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The final content of a slot: either leaf text or a nested decomposition.
///
/// The two cases are only constructible through [`FilledSlot::leaf`] and
/// [`FilledSlot::nested`], so a slot never carries both.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilledSlot {
    text: String,
    span: SpanRef,
    rule_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    sub_slots: Option<Box<SlotAssignment>>,
}

impl FilledSlot {
    pub fn leaf(text: impl Into<String>, span: SpanRef, rule_id: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            span,
            rule_id: rule_id.into(),
            sub_slots: None,
        }
    }

    /// Blank the slot and hold `sub_slots` instead.
    pub fn nested(span: SpanRef, rule_id: impl Into<String>, sub_slots: SlotAssignment) -> Self {
        Self {
            text: String::new(),
            span,
            rule_id: rule_id.into(),
            sub_slots: Some(Box::new(sub_slots)),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn span(&self) -> SpanRef {
        self.span
    }

    pub fn rule_id(&self) -> &str {
        &self.rule_id
    }

    pub fn sub_slots(&self) -> Option<&SlotAssignment> {
        self.sub_slots.as_deref()
    }

    pub fn sub_slots_mut(&mut self) -> Option<&mut SlotAssignment> {
        self.sub_slots.as_deref_mut()
    }

    pub fn is_nested(&self) -> bool {
        self.sub_slots.is_some()
    }

    /// Prepend an antecedent phrase to a leaf ("the book" + "that").
    ///
    /// Nested slots are left untouched and `false` is returned.
    pub fn prefix_antecedent(&mut self, antecedent: &Span) -> bool {
        if self.is_nested() {
            return false;
        }
        self.text = format!("{} {}", antecedent.text, self.text);
        self.span = self.span.hull(&antecedent.range);
        true
    }
}

/// Mapping from slot to its filler. Unfilled slots are absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SlotAssignment {
    slots: BTreeMap<SlotKey, FilledSlot>,
}

impl SlotAssignment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: SlotKey) -> Option<&FilledSlot> {
        self.slots.get(&key)
    }

    pub fn get_mut(&mut self, key: SlotKey) -> Option<&mut FilledSlot> {
        self.slots.get_mut(&key)
    }

    /// Leaf text of a slot, `""` for nested slots.
    pub fn text(&self, key: SlotKey) -> Option<&str> {
        self.get(key).map(FilledSlot::text)
    }

    pub fn insert(&mut self, key: SlotKey, slot: FilledSlot) -> Option<FilledSlot> {
        self.slots.insert(key, slot)
    }

    pub fn remove(&mut self, key: SlotKey) -> Option<FilledSlot> {
        self.slots.remove(&key)
    }

    pub fn contains(&self, key: SlotKey) -> bool {
        self.slots.contains_key(&key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (SlotKey, &FilledSlot)> {
        self.slots.iter().map(|(key, slot)| (*key, slot))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (SlotKey, &mut FilledSlot)> {
        self.slots.iter_mut().map(|(key, slot)| (*key, slot))
    }

    pub fn keys(&self) -> impl Iterator<Item = SlotKey> + '_ {
        self.slots.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// The slot whose span covers token `index`, if any.
    pub fn slot_containing(&self, index: usize) -> Option<SlotKey> {
        self.iter()
            .find(|(_, slot)| slot.span.contains(index))
            .map(|(key, _)| key)
    }

    /// Number of nested levels below this assignment.
    pub fn nesting_depth(&self) -> usize {
        self.slots
            .values()
            .filter_map(FilledSlot::sub_slots)
            .map(|sub| sub.nesting_depth() + 1)
            .max()
            .unwrap_or(0)
    }

    /// Flatten into label-keyed output.
    ///
    /// A nested slot is emitted as `"O1": ""` next to `"sub-o1": {...}`.
    pub fn flatten(&self) -> BTreeMap<String, FlatSlot> {
        let mut flat = BTreeMap::new();
        for (key, slot) in self.iter() {
            flat.insert(key.label().to_string(), FlatSlot::Text(slot.text.clone()));
            if let Some(sub) = slot.sub_slots() {
                flat.insert(key.sub_label().to_string(), FlatSlot::Nested(sub.flatten()));
            }
        }
        flat
    }

    pub fn to_json(&self) -> serde_json::Value {
        FlatSlot::Nested(self.flatten()).to_json()
    }
}

/// One value of the flattened output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FlatSlot {
    Text(String),
    Nested(BTreeMap<String, FlatSlot>),
}

impl FlatSlot {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FlatSlot::Text(text) => Some(text),
            FlatSlot::Nested(_) => None,
        }
    }

    pub fn as_nested(&self) -> Option<&BTreeMap<String, FlatSlot>> {
        match self {
            FlatSlot::Text(_) => None,
            FlatSlot::Nested(map) => Some(map),
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            FlatSlot::Text(text) => serde_json::Value::String(text.clone()),
            FlatSlot::Nested(map) => serde_json::Value::Object(
                map.iter()
                    .map(|(key, value)| (key.clone(), value.to_json()))
                    .collect(),
            ),
        }
    }
}
