//! Rule service - category rule management
//!
//! Add / identify-by-text / delete, with the retroactive cascades the
//! store applies atomically: a new identifying text re-tags historical
//! matches, deleting a category moves its transactions to "Other".

use std::sync::Arc;

use serde::Serialize;

use crate::domain::result::{Error, Result};
use crate::domain::{CategoryRule, OwnerId};
use crate::ports::LedgerStore;

/// Rule service for category rule management
pub struct RuleService {
    store: Arc<dyn LedgerStore>,
}

/// Result of attaching an identifying text to a category
#[derive(Debug, Serialize)]
pub struct IdentifyResult {
    pub category: String,
    pub matching_text: String,
    /// Historical transactions re-tagged because their description
    /// already contained the text
    pub retagged: u64,
}

/// Result of deleting a category
#[derive(Debug, Serialize)]
pub struct DeleteResult {
    pub category: String,
    /// Transactions moved to "Other"
    pub retagged: u64,
}

impl RuleService {
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self { store }
    }

    /// The owner's rules in insertion order
    pub fn list(&self, owner_id: OwnerId) -> Result<Vec<CategoryRule>> {
        self.store.get_rules(owner_id)
    }

    /// Create a new category, optionally with a first identifying text.
    ///
    /// The name must be non-empty and not already taken for this owner
    /// (case-insensitive) - use [`identify`] to attach more texts to an
    /// existing category.
    ///
    /// [`identify`]: RuleService::identify
    pub fn add(
        &self,
        owner_id: OwnerId,
        name: &str,
        matching_text: Option<&str>,
    ) -> Result<CategoryRule> {
        let rule = CategoryRule::new(owner_id, name, matching_text)?;

        let existing = self.store.get_rules(owner_id)?;
        if existing.iter().any(|r| r.name_matches(&rule.name)) {
            return Err(Error::DuplicateRuleName(rule.name));
        }

        self.store.add_rule(&rule)?;
        Ok(rule)
    }

    /// Attach another identifying text to an existing category and
    /// re-tag historical expenses whose description already contains it.
    pub fn identify(&self, owner_id: OwnerId, name: &str, text: &str) -> Result<IdentifyResult> {
        let rule = CategoryRule::new(owner_id, name, Some(text))?;
        let Some(matching_text) = rule.matching_text.clone() else {
            return Err(Error::validation("identifying text must not be empty"));
        };

        let existing = self.store.get_rules(owner_id)?;
        if !existing.iter().any(|r| r.name_matches(&rule.name)) {
            return Err(Error::Validation(format!(
                "no category named '{}'",
                rule.name
            )));
        }
        if existing
            .iter()
            .any(|r| r.name_matches(&rule.name) && r.matching_text.as_deref() == Some(&*matching_text))
        {
            return Err(Error::Validation(format!(
                "category '{}' already matches on '{}'",
                rule.name, matching_text
            )));
        }

        self.store.add_rule(&rule)?;
        let retagged = self
            .store
            .recategorize(owner_id, &matching_text, &rule.name)?;

        Ok(IdentifyResult {
            category: rule.name,
            matching_text,
            retagged,
        })
    }

    /// Delete a category; its transactions cascade to "Other".
    pub fn delete(&self, owner_id: OwnerId, name: &str) -> Result<DeleteResult> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::validation("category name must not be empty"));
        }

        let existing = self.store.get_rules(owner_id)?;
        let Some(rule) = existing.iter().find(|r| r.name_matches(name)) else {
            return Err(Error::Validation(format!("no category named '{name}'")));
        };
        let category = rule.name.clone();

        let retagged = self.store.delete_rule_cascade(owner_id, &category)?;
        Ok(DeleteResult { category, retagged })
    }
}
