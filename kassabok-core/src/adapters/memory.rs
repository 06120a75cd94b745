//! In-memory ledger store
//!
//! The reference [`LedgerStore`] implementation: per-owner state behind
//! a single mutex, with an optional JSON snapshot on disk so the CLI
//! keeps its ledger between runs. The one mutex is what gives the port
//! its atomicity contract - each call, including the cascades, runs
//! under the same lock.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::result::{Error, Result};
use crate::domain::{CategoryRule, OwnerId, Transaction, OTHER_CATEGORY};
use crate::ports::LedgerStore;

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
struct OwnerLedger {
    /// Rule rows in insertion order - the classification tie-break
    rules: Vec<CategoryRule>,
    transactions: Vec<Transaction>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Snapshot {
    owners: HashMap<OwnerId, OwnerLedger>,
}

/// In-memory store with optional file-backed snapshots
pub struct MemoryStore {
    inner: Mutex<Snapshot>,
    path: Option<PathBuf>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Purely in-memory store (tests, previews)
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Snapshot::default()),
            path: None,
        }
    }

    /// Open a file-backed store; a missing file starts empty
    pub fn open(path: &Path) -> Result<Self> {
        let snapshot = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            serde_json::from_str(&content)?
        } else {
            Snapshot::default()
        };

        Ok(Self {
            inner: Mutex::new(snapshot),
            path: Some(path.to_path_buf()),
        })
    }

    /// Write the snapshot back to disk. No-op for purely in-memory
    /// stores.
    pub fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let inner = self.lock()?;
        let content = serde_json::to_string_pretty(&*inner)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Snapshot>> {
        self.inner
            .lock()
            .map_err(|_| Error::store("ledger store mutex poisoned"))
    }
}

impl LedgerStore for MemoryStore {
    fn get_rules(&self, owner_id: OwnerId) -> Result<Vec<CategoryRule>> {
        let inner = self.lock()?;
        Ok(inner
            .owners
            .get(&owner_id)
            .map(|o| o.rules.clone())
            .unwrap_or_default())
    }

    fn add_rule(&self, rule: &CategoryRule) -> Result<()> {
        let mut inner = self.lock()?;
        inner
            .owners
            .entry(rule.owner_id)
            .or_default()
            .rules
            .push(rule.clone());
        Ok(())
    }

    fn get_watermark(&self, owner_id: OwnerId) -> Result<NaiveDate> {
        let inner = self.lock()?;
        Ok(inner
            .owners
            .get(&owner_id)
            .and_then(|o| o.transactions.iter().map(|t| t.date).max())
            .unwrap_or(NaiveDate::MIN))
    }

    fn persist_transactions(&self, owner_id: OwnerId, batch: &[Transaction]) -> Result<()> {
        let mut inner = self.lock()?;
        inner
            .owners
            .entry(owner_id)
            .or_default()
            .transactions
            .extend_from_slice(batch);
        Ok(())
    }

    fn get_transactions(
        &self,
        owner_id: OwnerId,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<Transaction>> {
        let inner = self.lock()?;
        let mut txs: Vec<Transaction> = inner
            .owners
            .get(&owner_id)
            .map(|o| {
                o.transactions
                    .iter()
                    .filter(|t| start.map_or(true, |s| t.date >= s))
                    .filter(|t| end.map_or(true, |e| t.date <= e))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        // Stable sort keeps insertion order within a day
        txs.sort_by_key(|t| t.date);
        Ok(txs)
    }

    fn recategorize(
        &self,
        owner_id: OwnerId,
        matched_text: &str,
        new_category: &str,
    ) -> Result<u64> {
        let needle = matched_text.to_lowercase();
        let mut inner = self.lock()?;
        let Some(owner) = inner.owners.get_mut(&owner_id) else {
            return Ok(0);
        };

        let mut affected = 0;
        for tx in owner.transactions.iter_mut() {
            if !tx.is_expense() || !tx.description.to_lowercase().contains(&needle) {
                continue;
            }
            if tx.category.as_deref() != Some(new_category) {
                tx.category = Some(new_category.to_string());
                affected += 1;
            }
        }
        Ok(affected)
    }

    fn delete_rule_cascade(&self, owner_id: OwnerId, category_name: &str) -> Result<u64> {
        let mut inner = self.lock()?;
        let Some(owner) = inner.owners.get_mut(&owner_id) else {
            return Ok(0);
        };

        owner.rules.retain(|r| !r.name_matches(category_name));

        let mut affected = 0;
        for tx in owner.transactions.iter_mut() {
            let matches = tx
                .category
                .as_deref()
                .is_some_and(|c| c.eq_ignore_ascii_case(category_name.trim()));
            if matches {
                tx.category = Some(OTHER_CATEGORY.to_string());
                affected += 1;
            }
        }
        Ok(affected)
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use tempfile::TempDir;

    use super::*;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 5, day).unwrap()
    }

    fn expense(day: u32, description: &str, category: &str) -> Transaction {
        let mut tx = Transaction::new(1, date(day), description, Decimal::new(-10_000, 2));
        tx.category = Some(category.to_string());
        tx
    }

    #[test]
    fn test_watermark_is_min_without_history() {
        let store = MemoryStore::new();
        assert_eq!(store.get_watermark(1).unwrap(), NaiveDate::MIN);
    }

    #[test]
    fn test_watermark_tracks_latest_date() {
        let store = MemoryStore::new();
        store
            .persist_transactions(1, &[expense(3, "ICA", "Food"), expense(9, "COOP", "Food")])
            .unwrap();
        assert_eq!(store.get_watermark(1).unwrap(), date(9));
        // Other owners are unaffected
        assert_eq!(store.get_watermark(2).unwrap(), NaiveDate::MIN);
    }

    #[test]
    fn test_rules_keep_insertion_order() {
        let store = MemoryStore::new();
        for name in ["Rent", "Food", "Travel"] {
            store
                .add_rule(&CategoryRule::new(1, name, Some(name)).unwrap())
                .unwrap();
        }
        let names: Vec<String> = store
            .get_rules(1)
            .unwrap()
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, ["Rent", "Food", "Travel"]);
    }

    #[test]
    fn test_get_transactions_bounds_are_inclusive() {
        let store = MemoryStore::new();
        store
            .persist_transactions(
                1,
                &[
                    expense(1, "A", "Food"),
                    expense(5, "B", "Food"),
                    expense(9, "C", "Food"),
                ],
            )
            .unwrap();
        let txs = store
            .get_transactions(1, Some(date(1)), Some(date(5)))
            .unwrap();
        assert_eq!(txs.len(), 2);
    }

    #[test]
    fn test_recategorize_matches_substring_case_insensitive() {
        let store = MemoryStore::new();
        store
            .persist_transactions(
                1,
                &[
                    expense(1, "NETFLIX SE", "Other"),
                    expense(2, "Netflix.com", "Other"),
                    expense(3, "SPOTIFY", "Other"),
                ],
            )
            .unwrap();

        let affected = store.recategorize(1, "netflix", "Subscriptions").unwrap();
        assert_eq!(affected, 2);

        let txs = store.get_transactions(1, None, None).unwrap();
        assert_eq!(txs[0].category.as_deref(), Some("Subscriptions"));
        assert_eq!(txs[2].category.as_deref(), Some("Other"));
    }

    #[test]
    fn test_recategorize_skips_income_and_counts_changes_only() {
        let store = MemoryStore::new();
        let salary = Transaction::new(1, date(25), "NETFLIX REFUND", Decimal::new(9_900, 2));
        store.persist_transactions(1, &[salary]).unwrap();
        store
            .persist_transactions(1, &[expense(1, "NETFLIX SE", "Subscriptions")])
            .unwrap();

        // Income row never matches; expense already in the category does
        // not count as affected
        let affected = store.recategorize(1, "netflix", "Subscriptions").unwrap();
        assert_eq!(affected, 0);
    }

    #[test]
    fn test_delete_rule_cascade_retags_to_other() {
        let store = MemoryStore::new();
        store
            .add_rule(&CategoryRule::new(1, "Subscriptions", Some("netflix")).unwrap())
            .unwrap();
        store
            .persist_transactions(
                1,
                &[
                    expense(1, "NETFLIX SE", "Subscriptions"),
                    expense(2, "ICA", "Food"),
                ],
            )
            .unwrap();

        let affected = store.delete_rule_cascade(1, "subscriptions").unwrap();
        assert_eq!(affected, 1);
        assert!(store.get_rules(1).unwrap().is_empty());

        let txs = store.get_transactions(1, None, None).unwrap();
        assert_eq!(txs[0].category.as_deref(), Some("Other"));
        assert_eq!(txs[1].category.as_deref(), Some("Food"));
    }

    #[test]
    fn test_snapshot_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ledger.json");

        let store = MemoryStore::open(&path).unwrap();
        store
            .add_rule(&CategoryRule::new(1, "Food", Some("ica")).unwrap())
            .unwrap();
        store
            .persist_transactions(1, &[expense(3, "ICA", "Food")])
            .unwrap();
        store.save().unwrap();

        let reopened = MemoryStore::open(&path).unwrap();
        assert_eq!(reopened.get_rules(1).unwrap().len(), 1);
        assert_eq!(reopened.get_transactions(1, None, None).unwrap().len(), 1);
        assert_eq!(reopened.get_watermark(1).unwrap(), date(3));
    }
}
