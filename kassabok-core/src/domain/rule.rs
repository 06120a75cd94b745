//! Category rule domain entity

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::result::{Error, Result};
use crate::domain::transaction::OwnerId;

/// One categorization rule row: a category name plus at most one
/// identifying text.
///
/// A category with several identifying texts is stored as several rows
/// sharing the same `name` (one row per text), in insertion order. A row
/// with no text is a manually-assigned category: valid, but excluded
/// from automatic classification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryRule {
    pub id: Uuid,
    pub owner_id: OwnerId,
    /// Category name, unique per owner (case-insensitive)
    pub name: String,
    /// Lowercase substring or pattern matched against transaction
    /// descriptions
    pub matching_text: Option<String>,
}

impl CategoryRule {
    /// Create a rule row, validating and normalizing the fields.
    ///
    /// The name is trimmed; the matching text is trimmed and lowercased,
    /// and an empty text collapses to `None`.
    pub fn new(
        owner_id: OwnerId,
        name: impl Into<String>,
        matching_text: Option<&str>,
    ) -> Result<Self> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(Error::validation("category name must not be empty"));
        }

        let matching_text = matching_text
            .map(|t| t.trim().to_lowercase())
            .filter(|t| !t.is_empty());

        Ok(Self {
            id: Uuid::new_v4(),
            owner_id,
            name,
            matching_text,
        })
    }

    /// Case-insensitive name comparison, the uniqueness scope for rules
    pub fn name_matches(&self, other: &str) -> bool {
        self.name.eq_ignore_ascii_case(other.trim())
    }
}
