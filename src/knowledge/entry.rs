//! A single learned lesson.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Where a knowledge entry came from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EntrySource {
    /// Raw text submitted by the admin.
    Text,
    /// Model-generated summary of an uploaded image.
    Image,
}

/// A learned lesson. Immutable once stored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KnowledgeEntry {
    /// Unique identifier.
    pub id: Uuid,
    /// The learned content, already prefixed with its origin.
    pub text: String,
    /// When the entry was learned.
    pub learned_at: DateTime<Utc>,
    /// Origin of the entry.
    pub source: EntrySource,
}

impl KnowledgeEntry {
    /// Create an entry from arbitrary, already formatted text.
    #[must_use]
    pub fn new(text: impl Into<String>, source: EntrySource) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            learned_at: Utc::now(),
            source,
        }
    }

    /// Create an entry from text submitted by the admin.
    #[must_use]
    pub fn from_text(input: &str) -> Self {
        Self::new(format!("Learned from text: {input}"), EntrySource::Text)
    }

    /// Create an entry from a model summary of an uploaded image.
    #[must_use]
    pub fn from_image_summary(summary: &str) -> Self {
        Self::new(
            format!("Learned from image summary: {summary}"),
            EntrySource::Image,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_text_prefix() {
        let entry = KnowledgeEntry::from_text("Ohm's law: V = IR");
        assert_eq!(entry.text, "Learned from text: Ohm's law: V = IR");
        assert_eq!(entry.source, EntrySource::Text);
    }

    #[test]
    fn test_from_image_summary_prefix() {
        let entry = KnowledgeEntry::from_image_summary("Projectile range formula");
        assert_eq!(
            entry.text,
            "Learned from image summary: Projectile range formula"
        );
        assert_eq!(entry.source, EntrySource::Image);
    }

    #[test]
    fn test_entries_get_distinct_ids() {
        let a = KnowledgeEntry::from_text("a");
        let b = KnowledgeEntry::from_text("a");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_source_serializes_snake_case() {
        let json = serde_json::to_string(&EntrySource::Image).unwrap();
        assert_eq!(json, "\"image\"");
    }
}
