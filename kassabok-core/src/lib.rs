//! Kassabok Core - bank statement categorization and spend analysis
//!
//! This crate implements the core engine following hexagonal architecture:
//!
//! - **domain**: Core business entities (Transaction, CategoryRule)
//! - **ports**: Trait definitions for external dependencies (LedgerStore)
//! - **services**: Business logic orchestration (parse, categorize,
//!   import, rules, report)
//! - **adapters**: Concrete implementations (in-memory/JSON-file store)
//!
//! The pipeline per user action: raw statement rows are parsed into
//! typed rows, classified against the owner's rules (first-defined rule
//! wins, unmatched expenses land in "Other"), cut at the owner's
//! watermark date, and persisted. Aggregation reads the ledger back
//! through the same port and never does I/O of its own.

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod services;

use std::sync::Arc;

use config::Config;
use ports::LedgerStore;
use services::{ImportService, ReportService, RuleService};

// Re-export commonly used types at crate root
pub use domain::result::{Error, Result};
pub use domain::{CategoryRule, OwnerId, Transaction, TxKind, OTHER_CATEGORY};

/// Main context for Kassabok operations
///
/// This is the primary entry point for front-ends. It holds the shared
/// store handle and all services; the owner id stays an explicit
/// argument on every call rather than ambient context state.
pub struct KassabokContext {
    pub config: Config,
    pub import_service: ImportService,
    pub rule_service: RuleService,
    pub report_service: ReportService,
}

impl KassabokContext {
    /// Create a new context over any store implementation
    pub fn new(store: Arc<dyn LedgerStore>, config: Config) -> Self {
        let import_service = ImportService::new(Arc::clone(&store), config.min_new_rows);
        let rule_service = RuleService::new(Arc::clone(&store));
        let report_service = ReportService::new(store);

        Self {
            config,
            import_service,
            rule_service,
            report_service,
        }
    }
}
