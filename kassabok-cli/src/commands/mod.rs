//! CLI command implementations

pub mod add;
pub mod import;
pub mod logs;
pub mod report;
pub mod rules;
pub mod status;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::NaiveDate;

use kassabok_core::adapters::MemoryStore;
use kassabok_core::config::Config;
use kassabok_core::services::{EntryPoint, LogEvent, LoggingService};
use kassabok_core::{KassabokContext, OwnerId};

/// Get the kassabok directory from environment or default
pub fn get_app_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("KASSABOK_DIR") {
        PathBuf::from(dir)
    } else {
        dirs::home_dir()
            .expect("Could not find home directory")
            .join(".kassabok")
    }
}

/// One CLI invocation's handle on the engine.
///
/// Keeps the concrete store alongside the context so mutating commands
/// can write the snapshot back to disk when they are done.
pub struct Session {
    pub store: Arc<MemoryStore>,
    pub ctx: KassabokContext,
}

impl Session {
    /// Resolve the owner for this invocation: explicit flag, else the
    /// configured default
    pub fn owner(&self, flag: Option<OwnerId>) -> OwnerId {
        flag.unwrap_or(self.ctx.config.default_owner)
    }

    /// Persist the ledger snapshot after a mutating command
    pub fn commit(&self) -> Result<()> {
        self.store.save().context("Failed to save ledger snapshot")
    }
}

/// Get or create the kassabok session
pub fn get_session() -> Result<Session> {
    let app_dir = get_app_dir();

    std::fs::create_dir_all(&app_dir)
        .with_context(|| format!("Failed to create kassabok directory: {:?}", app_dir))?;

    let config = Config::load(&app_dir)?;
    let store = Arc::new(MemoryStore::open(&app_dir.join("ledger.json"))?);
    let ctx = KassabokContext::new(store.clone(), config);

    Ok(Session { store, ctx })
}

/// Get the logging service for CLI operations
///
/// Returns None if logging fails to initialize (shouldn't block operations)
pub fn get_logger() -> Option<LoggingService> {
    let app_dir = get_app_dir();
    std::fs::create_dir_all(&app_dir).ok()?;
    LoggingService::new(&app_dir, EntryPoint::Cli, env!("CARGO_PKG_VERSION")).ok()
}

/// Log an event, ignoring any errors (logging should never break the app)
pub fn log_event(logger: &Option<LoggingService>, event: LogEvent) {
    if let Some(l) = logger {
        let _ = l.log(event);
    }
}

/// Parse a YYYY-MM-DD argument
pub fn parse_date_arg(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", s))
}

/// Parse a YYYY-MM argument to the first day of that month
pub fn parse_month_arg(s: &str) -> Result<NaiveDate> {
    let parts: Vec<&str> = s.split('-').collect();
    let parsed = match parts.as_slice() {
        [year, month] => {
            let year: i32 = year.parse().ok().unwrap_or(0);
            let month: u32 = month.parse().ok().unwrap_or(0);
            NaiveDate::from_ymd_opt(year, month, 1)
        }
        _ => None,
    };
    parsed.with_context(|| format!("Invalid month '{}', expected YYYY-MM", s))
}
