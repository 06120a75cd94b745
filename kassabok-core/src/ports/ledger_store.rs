//! Ledger store port - persistence abstraction

use chrono::NaiveDate;

use crate::domain::result::Result;
use crate::domain::{CategoryRule, OwnerId, Transaction};

/// Persistence abstraction for transactions and category rules
///
/// This trait defines all store operations the engine needs.
/// Implementations (adapters) provide the actual persistence logic;
/// the engine never touches storage directly.
///
/// Two contracts the engine relies on but cannot enforce itself:
///
/// - the watermark check-then-insert sequence (`get_watermark` followed
///   by `persist_transactions`) must be serialized per owner, or two
///   concurrent imports could both pass the check against a stale read
///   and double-import rows;
/// - `recategorize` and `delete_rule_cascade` must be atomic with
///   respect to reads of the same owner's ledger, so observers never see
///   a half-recategorized state.
pub trait LedgerStore: Send + Sync {
    // === Rules ===

    /// Get the owner's rules in insertion order. Insertion order is the
    /// classification tie-break, so it must be stable.
    fn get_rules(&self, owner_id: OwnerId) -> Result<Vec<CategoryRule>>;

    /// Append a rule row
    fn add_rule(&self, rule: &CategoryRule) -> Result<()>;

    // === Transactions ===

    /// Latest already-ingested transaction date for the owner; the
    /// earliest representable date when there is no history yet.
    fn get_watermark(&self, owner_id: OwnerId) -> Result<NaiveDate>;

    /// Persist a batch of transactions, all-or-nothing
    fn persist_transactions(&self, owner_id: OwnerId, batch: &[Transaction]) -> Result<()>;

    /// Date-bounded snapshot of the owner's ledger, ordered by date then
    /// insertion. Both bounds are inclusive; `None` means unbounded.
    fn get_transactions(
        &self,
        owner_id: OwnerId,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<Transaction>>;

    // === Cascades ===

    /// Re-tag historical expense transactions whose description contains
    /// `matched_text` (case-insensitive). Returns the affected count.
    fn recategorize(
        &self,
        owner_id: OwnerId,
        matched_text: &str,
        new_category: &str,
    ) -> Result<u64>;

    /// Delete all rule rows for a category and move its transactions to
    /// "Other". Returns the number of transactions re-tagged.
    fn delete_rule_cascade(&self, owner_id: OwnerId, category_name: &str) -> Result<u64>;
}
