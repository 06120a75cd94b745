//! Service layer - business logic orchestration
//!
//! Services coordinate domain logic and port interactions. Each service
//! focuses on a specific use case or feature area.

pub mod categorize;
pub mod import;
pub mod logging;
pub mod report;
pub mod rules;
pub mod statement;

pub use categorize::{categorize, RuleMatcher};
pub use import::{retain_after_watermark, ImportService, ImportSummary};
pub use logging::{EntryPoint, LogEntry, LogEvent, LoggingService};
pub use report::{
    CategoryCostClass, CategorySeries, CategorySpend, ClassQuarterly, CostClass, LedgerStatus,
    MonthlyBalance, MonthlyFlow, PeriodAmount, ReportService, TextSummary,
};
pub use rules::{DeleteResult, IdentifyResult, RuleService};
pub use statement::{parse_locale_amount, parse_statement, StatementRow};
