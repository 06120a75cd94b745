//! Import service - statement ingestion pipeline
//!
//! One synchronous pipeline per user action: parse the raw rows,
//! categorize against the owner's current rules, drop everything at or
//! before the watermark, persist. All-or-nothing at every step.

use std::path::Path;
use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::result::{Error, Result};
use crate::domain::{OwnerId, Transaction, TxKind, OTHER_CATEGORY};
use crate::ports::LedgerStore;
use crate::services::categorize::categorize;
use crate::services::statement::parse_statement;

/// Import service for statement uploads and manual entries
pub struct ImportService {
    store: Arc<dyn LedgerStore>,
    /// Dedup acceptance threshold: a batch is rejected unless strictly
    /// more rows than this survive the watermark cut. The historical
    /// default is 1.
    min_new_rows: usize,
}

/// Result of an import run
#[derive(Debug, Serialize)]
pub struct ImportSummary {
    /// Rows parsed out of the upload
    pub parsed: usize,
    /// Rows persisted after deduplication
    pub imported: usize,
    /// Rows dropped because they were at or before the watermark
    pub skipped_at_watermark: usize,
    /// The watermark the batch was cut against
    pub watermark: NaiveDate,
}

impl ImportService {
    pub fn new(store: Arc<dyn LedgerStore>, min_new_rows: usize) -> Self {
        Self {
            store,
            min_new_rows,
        }
    }

    /// Import a statement file. The file is read as a loose
    /// delimiter-separated table (no header handling here - the parser
    /// finds the real header itself) and handed to [`import_rows`].
    ///
    /// [`import_rows`]: ImportService::import_rows
    pub fn import_file(
        &self,
        owner_id: OwnerId,
        path: &Path,
        delimiter: u8,
    ) -> Result<ImportSummary> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(delimiter)
            .from_path(path)?;

        let mut rows: Vec<Vec<String>> = Vec::new();
        for record in reader.records() {
            rows.push(record?.iter().map(|c| c.to_string()).collect());
        }

        self.import_rows(owner_id, &rows)
    }

    /// Run the full pipeline on raw uploaded rows.
    ///
    /// Rejects the whole batch on the first malformed row and again if
    /// deduplication leaves nothing worth importing; nothing is persisted
    /// on either path.
    pub fn import_rows(&self, owner_id: OwnerId, rows: &[Vec<String>]) -> Result<ImportSummary> {
        let parsed = parse_statement(rows)?;
        let parsed_count = parsed.len();

        let mut batch: Vec<Transaction> = parsed
            .into_iter()
            .map(|row| {
                let mut tx = Transaction::new(owner_id, row.date, row.description, row.amount);
                tx.running_balance = row.running_balance;
                tx
            })
            .collect();

        let rules = self.store.get_rules(owner_id)?;
        categorize(&mut batch, &rules);

        let watermark = self.store.get_watermark(owner_id)?;
        let retained = retain_after_watermark(batch, watermark, self.min_new_rows)?;
        let imported = retained.len();

        self.store.persist_transactions(owner_id, &retained)?;

        Ok(ImportSummary {
            parsed: parsed_count,
            imported,
            skipped_at_watermark: parsed_count - imported,
            watermark,
        })
    }

    /// Record a single manually-entered transaction.
    ///
    /// Manual entries bypass the watermark (the user typed it in on
    /// purpose) and carry no running balance. Income ignores the
    /// category; an uncategorized expense lands in "Other".
    pub fn add_manual(
        &self,
        owner_id: OwnerId,
        date: NaiveDate,
        amount: Decimal,
        category: Option<&str>,
        description: &str,
    ) -> Result<Transaction> {
        let mut tx = Transaction::new(owner_id, date, description, amount);
        tx.category = match tx.kind() {
            TxKind::Income => None,
            TxKind::Expense => {
                let name = category.map(str::trim).filter(|c| !c.is_empty());
                Some(name.unwrap_or(OTHER_CATEGORY).to_string())
            }
        };

        self.store
            .persist_transactions(owner_id, std::slice::from_ref(&tx))?;
        Ok(tx)
    }
}

/// Keep only transactions dated strictly after the watermark.
///
/// Fails closed: when the retained set is no bigger than `min_new_rows`
/// the whole batch is rejected as nothing-new - overlap around the
/// watermark's own day makes a near-empty remainder a poor signal of
/// genuinely new data.
pub fn retain_after_watermark(
    batch: Vec<Transaction>,
    watermark: NaiveDate,
    min_new_rows: usize,
) -> Result<Vec<Transaction>> {
    let retained: Vec<Transaction> = batch.into_iter().filter(|tx| tx.date > watermark).collect();

    if retained.len() <= min_new_rows {
        return Err(Error::NoNewData {
            retained: retained.len(),
            watermark,
        });
    }
    Ok(retained)
}
