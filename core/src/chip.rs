use serde::Deserialize;
use serde::Serialize;
use std::fmt;
use uuid::Uuid;

/// Opaque identifier for a chip. Unique within a chip sequence.
///
/// Identity is the id, not the value: two chips may carry equal values (the
/// duplicate policy normally prevents that, but nothing in the data model
/// forbids it) and are still distinct chips.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChipId(Uuid);

impl ChipId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ChipId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ChipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A committed token in the input.
///
/// * `value` – the semantic payload; the type parameter is fixed per input
///   instance and defaults to `String`.
/// * `label` – optional display text (e.g. the name part of `Name <addr>`).
/// * `is_valid` – `None` when no validator is configured for the input;
///   `Some(false)` marks a soft, user-visible failure rather than an error.
///
/// Chips are immutable once created. "Mutating" the store means replacing
/// the whole ordered sequence; order is display order and also the order
/// new chips are spliced into.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chip<T = String> {
    pub id: ChipId,
    pub value: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_valid: Option<bool>,
}

impl<T> Chip<T> {
    /// Create a chip with a freshly generated id and no label or validity.
    pub fn new(value: T) -> Self {
        Self {
            id: ChipId::new(),
            value,
            label: None,
            is_valid: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_validity(mut self, is_valid: Option<bool>) -> Self {
        self.is_valid = is_valid;
        self
    }
}

/// A single autocomplete candidate produced by an external search.
///
/// Suggestions are ephemeral: they are never persisted and their `id` is not
/// related to chip identity. Selecting a suggestion mints a brand-new
/// [`Chip`] with a fresh [`ChipId`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion<T = String> {
    pub id: String,
    pub value: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl<T> Suggestion<T> {
    pub fn new(id: impl Into<String>, value: T) -> Self {
        Self {
            id: id.into(),
            value,
            label: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used)]

    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn fresh_ids_are_unique() {
        let a = Chip::new("x".to_string());
        let b = Chip::new("x".to_string());
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn chip_serializes_without_absent_optionals() {
        let chip = Chip::new("a@b.com".to_string());
        let json = serde_json::to_value(&chip).expect("serialize chip");
        let obj = json.as_object().expect("chip json object");
        assert!(!obj.contains_key("label"));
        assert!(!obj.contains_key("is_valid"));
        assert_eq!(obj["value"], "a@b.com");
    }

    #[test]
    fn selecting_a_suggestion_is_a_new_identity() {
        let suggestion = Suggestion::new("s-1", "ada@ok.com".to_string()).with_label("Ada");
        let chip = Chip::new(suggestion.value.clone()).with_label(
            suggestion.label.clone().expect("label"),
        );
        assert_eq!(chip.value, "ada@ok.com");
        assert_eq!(chip.label.as_deref(), Some("Ada"));
    }
}
