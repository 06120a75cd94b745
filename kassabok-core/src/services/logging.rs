//! Logging service - structured event logging to an append-only file
//!
//! Privacy-safe event logging shared by the CLI and any other front-end.
//! No user data (descriptions, amounts, balances, category names typed
//! by the user) is ever logged - only event names, command context and
//! error messages.
//!
//! Events are appended as one JSON object per line to `events.jsonl` in
//! the app directory.

use std::fs::OpenOptions;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::domain::result::Result;

/// Current unix timestamp in milliseconds
fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

fn detect_platform() -> &'static str {
    if cfg!(target_os = "macos") {
        "macos"
    } else if cfg!(target_os = "windows") {
        "windows"
    } else if cfg!(target_os = "linux") {
        "linux"
    } else {
        "unknown"
    }
}

/// Entry point for the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryPoint {
    Cli,
    Desktop,
}

impl EntryPoint {
    fn as_str(&self) -> &'static str {
        match self {
            EntryPoint::Cli => "cli",
            EntryPoint::Desktop => "desktop",
        }
    }
}

/// A log event to be recorded
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEvent {
    pub event: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl LogEvent {
    /// Create a new log event with just an event name
    pub fn new(event: impl Into<String>) -> Self {
        Self {
            event: event.into(),
            command: None,
            error_message: None,
        }
    }

    /// Set the command context (for CLI events)
    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = Some(command.into());
        self
    }

    /// Set error information
    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.error_message = Some(message.into());
        self
    }
}

/// A log entry as written to the file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: i64,
    pub entry_point: String,
    pub app_version: String,
    pub platform: String,
    pub event: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

/// Service for structured event logging
pub struct LoggingService {
    log_path: PathBuf,
    // One writer per process; appends stay line-atomic
    write_lock: Mutex<()>,
    entry_point: EntryPoint,
    app_version: String,
    platform: &'static str,
}

impl LoggingService {
    /// Create a new logging service writing to `events.jsonl` in the
    /// app directory
    pub fn new(
        app_dir: &Path,
        entry_point: EntryPoint,
        app_version: impl Into<String>,
    ) -> Result<Self> {
        std::fs::create_dir_all(app_dir)?;
        Ok(Self {
            log_path: app_dir.join("events.jsonl"),
            write_lock: Mutex::new(()),
            entry_point,
            app_version: app_version.into(),
            platform: detect_platform(),
        })
    }

    /// Append one event. Callers treat failures as best-effort: logging
    /// never blocks the operation being logged.
    pub fn log(&self, event: LogEvent) -> Result<()> {
        let entry = LogEntry {
            timestamp: now_ms(),
            entry_point: self.entry_point.as_str().to_string(),
            app_version: self.app_version.clone(),
            platform: self.platform.to_string(),
            event: event.event,
            command: event.command,
            error_message: event.error_message,
        };

        let line = serde_json::to_string(&entry)?;
        let _guard = self.write_lock.lock().map_err(|_| {
            crate::domain::result::Error::store("logging mutex poisoned")
        })?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)?;
        writeln!(file, "{line}")?;
        Ok(())
    }

    /// Read back the most recent `limit` entries, newest last.
    /// Unparseable lines are skipped.
    pub fn recent(&self, limit: usize) -> Result<Vec<LogEntry>> {
        if !self.log_path.exists() {
            return Ok(Vec::new());
        }

        let reader = BufReader::new(std::fs::File::open(&self.log_path)?);
        let entries: Vec<LogEntry> = reader
            .lines()
            .map_while(|l| l.ok())
            .filter_map(|l| serde_json::from_str(&l).ok())
            .collect();

        let skip = entries.len().saturating_sub(limit);
        Ok(entries.into_iter().skip(skip).collect())
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_log_and_read_back() {
        let dir = TempDir::new().unwrap();
        let service = LoggingService::new(dir.path(), EntryPoint::Cli, "0.1.0").unwrap();

        service
            .log(LogEvent::new("import_completed").with_command("import"))
            .unwrap();
        service
            .log(LogEvent::new("import_failed").with_error("nothing new to import"))
            .unwrap();

        let entries = service.recent(10).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].event, "import_completed");
        assert_eq!(entries[0].command.as_deref(), Some("import"));
        assert_eq!(entries[1].error_message.as_deref(), Some("nothing new to import"));
        assert_eq!(entries[1].entry_point, "cli");
    }

    #[test]
    fn test_recent_respects_limit_and_bad_lines() {
        let dir = TempDir::new().unwrap();
        let service = LoggingService::new(dir.path(), EntryPoint::Cli, "0.1.0").unwrap();

        for i in 0..5 {
            service.log(LogEvent::new(format!("event_{i}"))).unwrap();
        }
        // A corrupt line must not break reads
        let mut file = OpenOptions::new()
            .append(true)
            .open(dir.path().join("events.jsonl"))
            .unwrap();
        writeln!(file, "not json").unwrap();

        let entries = service.recent(2).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].event, "event_4");
    }
}
