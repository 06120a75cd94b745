//! Result and error types for the core library

use chrono::NaiveDate;
use thiserror::Error;

/// Core library error type
///
/// Every variant is recoverable at the caller boundary: mutating
/// operations are all-or-nothing, so an error never leaves a
/// half-applied batch or rule set behind.
#[derive(Error, Debug)]
pub enum Error {
    /// A statement row whose amount or date could not be parsed.
    /// Carries the original row text so the operator can see what the
    /// bank actually sent. Rejects the whole batch, not just the row.
    #[error("malformed statement row {row:?}: {reason}")]
    MalformedInput { row: String, reason: String },

    /// Deduplication against the watermark left too few rows to import.
    #[error("nothing new to import: {retained} row(s) after watermark {watermark}")]
    NoNewData { retained: usize, watermark: NaiveDate },

    /// A category with this name already exists for the owner.
    #[error("category '{0}' already exists")]
    DuplicateRuleName(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("store error: {0}")]
    Store(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a store error
    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    /// Create a malformed-input error for one raw row
    pub fn malformed(row: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedInput {
            row: row.into(),
            reason: reason.into(),
        }
    }
}

/// Core library result type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_input_keeps_row_text() {
        let err = Error::malformed("2023-01-15;GYM;abc", "bad amount 'abc'");
        let msg = err.to_string();
        assert!(msg.contains("2023-01-15;GYM;abc"));
        assert!(msg.contains("bad amount"));
    }

    #[test]
    fn test_no_new_data_message() {
        let err = Error::NoNewData {
            retained: 1,
            watermark: NaiveDate::from_ymd_opt(2023, 5, 31).unwrap(),
        };
        assert!(err.to_string().contains("2023-05-31"));
    }
}
