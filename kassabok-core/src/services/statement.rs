//! Statement parsing - raw upload rows to normalized rows
//!
//! Bank exports arrive as a loose table: placeholder rows before the
//! real header, locale-formatted numbers (decimal comma, space or NBSP
//! thousands separators, and a bare minor-unit integer encoding), and
//! columns we do not care about. This module turns that into typed rows
//! or rejects the whole batch with the offending row preserved.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::result::{Error, Result};

/// One normalized statement row, ready to become a transaction
#[derive(Debug, Clone, Serialize)]
pub struct StatementRow {
    pub date: NaiveDate,
    pub description: String,
    /// Signed amount: negative = expense, positive = income
    pub amount: Decimal,
    /// Balance after the transaction, when the export carries it
    pub running_balance: Option<Decimal>,
}

/// Header vocabulary. Swedish names first (the Handelsbanken export this
/// was built for), common English equivalents after.
const DATE_PATTERNS: &[&str] = &["transaktionsdatum", "transaction date", "datum", "date"];
const DESC_PATTERNS: &[&str] = &["text", "description", "beskrivning", "memo", "payee"];
const AMOUNT_PATTERNS: &[&str] = &["belopp", "amount", "amt"];
const BALANCE_PATTERNS: &[&str] = &["saldo", "balance"];
/// Secondary booking-date columns, dropped outright
const BOOKING_PATTERNS: &[&str] = &["reskontradatum", "bokföringsdatum", "booking"];

#[derive(Debug)]
struct ColumnLayout {
    date: usize,
    amount: usize,
    description: Option<usize>,
    balance: Option<usize>,
}

/// Parse a raw uploaded table into normalized rows.
///
/// The header is located by name (placeholder rows above it are
/// skipped), booking-date columns and columns that are empty across all
/// data rows are dropped, and every data row is decoded. A row whose
/// date or amount does not parse fails the whole batch: partial imports
/// would leave silent gaps in the ledger.
pub fn parse_statement(rows: &[Vec<String>]) -> Result<Vec<StatementRow>> {
    let header_idx = find_header(rows)?;
    let header = &rows[header_idx];
    let data = &rows[header_idx + 1..];

    let populated = populated_columns(header.len(), data);
    let layout = detect_columns(header, &populated)?;

    let mut out = Vec::with_capacity(data.len());
    for row in data {
        if row.iter().all(|c| c.trim().is_empty()) {
            continue;
        }
        out.push(parse_row(row, &layout)?);
    }
    Ok(out)
}

/// Locate the real header row: the first row naming both a date column
/// and an amount column. Uploads put a sentinel/placeholder in row 0, so
/// position cannot be trusted.
fn find_header(rows: &[Vec<String>]) -> Result<usize> {
    for (idx, row) in rows.iter().enumerate() {
        let has_date = row.iter().any(|c| {
            let c = c.trim().to_lowercase();
            DATE_PATTERNS.iter().any(|p| c.contains(p))
                && !BOOKING_PATTERNS.iter().any(|p| c.contains(p))
        });
        let has_amount = row
            .iter()
            .any(|c| matches_any(&c.trim().to_lowercase(), AMOUNT_PATTERNS));
        if has_date && has_amount {
            return Ok(idx);
        }
    }
    Err(Error::malformed(
        rows.first().map(|r| r.join(";")).unwrap_or_default(),
        "no header row naming date and amount columns",
    ))
}

fn matches_any(cell: &str, patterns: &[&str]) -> bool {
    patterns.iter().any(|p| cell.contains(p))
}

/// Column indices with at least one non-empty cell in the data rows.
/// Entirely-empty columns are dropped from detection.
fn populated_columns(width: usize, data: &[Vec<String>]) -> Vec<bool> {
    let mut populated = vec![false; width];
    for row in data {
        for (idx, cell) in row.iter().enumerate().take(width) {
            if !cell.trim().is_empty() {
                populated[idx] = true;
            }
        }
    }
    populated
}

fn detect_columns(header: &[String], populated: &[bool]) -> Result<ColumnLayout> {
    let find = |patterns: &[&str], exclude_booking: bool| -> Option<usize> {
        header.iter().enumerate().position(|(idx, cell)| {
            let cell = cell.trim().to_lowercase();
            populated.get(idx).copied().unwrap_or(false)
                && matches_any(&cell, patterns)
                && !(exclude_booking && matches_any(&cell, BOOKING_PATTERNS))
        })
    };

    let date = find(DATE_PATTERNS, true).ok_or_else(|| {
        Error::malformed(header.join(";"), "no transaction date column")
    })?;
    let amount = find(AMOUNT_PATTERNS, false)
        .ok_or_else(|| Error::malformed(header.join(";"), "no amount column"))?;

    Ok(ColumnLayout {
        date,
        amount,
        description: find(DESC_PATTERNS, true).filter(|&i| i != date),
        balance: find(BALANCE_PATTERNS, false).filter(|&i| i != amount),
    })
}

fn parse_row(row: &[String], layout: &ColumnLayout) -> Result<StatementRow> {
    let cell = |idx: usize| row.get(idx).map(|s| s.trim()).unwrap_or("");

    let date_str = cell(layout.date);
    let date = parse_statement_date(date_str).ok_or_else(|| {
        Error::malformed(row.join(";"), format!("unparseable date {:?}", date_str))
    })?;

    let amount_str = cell(layout.amount);
    let amount = parse_locale_amount(amount_str).ok_or_else(|| {
        Error::malformed(row.join(";"), format!("unparseable amount {:?}", amount_str))
    })?;

    let description = layout
        .description
        .map(|i| cell(i).to_string())
        .unwrap_or_default();

    // Balance is optional source data; a cell that does not parse
    // degrades to absent rather than failing the batch.
    let running_balance = layout.balance.and_then(|i| parse_locale_amount(cell(i)));

    Ok(StatementRow {
        date,
        description,
        amount,
        running_balance,
    })
}

/// Decode one locale-formatted amount field.
///
/// Three encodings appear in the wild:
/// - decimal comma, spaces (or NBSP) as thousands separators:
///   `"1 234,50"` -> 1234.50
/// - thousands separators but whole units: `"1 234"` -> 1234
/// - no separator at all: a minor-unit integer, `"500"` -> 5.00
pub fn parse_locale_amount(raw: &str) -> Option<Decimal> {
    let s = raw.trim().replace('\u{a0}', " ");
    if s.is_empty() {
        return None;
    }

    if s.contains(',') {
        let cleaned: String = s
            .chars()
            .filter(|c| *c != ' ')
            .map(|c| if c == ',' { '.' } else { c })
            .collect();
        cleaned.parse().ok()
    } else if s.contains(' ') {
        s.replace(' ', "").parse().ok()
    } else {
        let minor_units: i64 = s.parse().ok()?;
        Some(Decimal::new(minor_units, 2))
    }
}

fn parse_statement_date(s: &str) -> Option<NaiveDate> {
    let formats = ["%Y-%m-%d", "%Y/%m/%d", "%d.%m.%Y", "%d/%m/%Y"];

    for fmt in &formats {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Some(date);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(rows: &[&[&str]]) -> Vec<Vec<String>> {
        rows.iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    fn sample() -> Vec<Vec<String>> {
        raw(&[
            &["Kontoutdrag", "", "", "", ""],
            &["Reskontradatum", "Transaktionsdatum", "Text", "Belopp", "Saldo"],
            &["2023-05-02", "2023-05-01", "ICA SUPERMARKET", "-350,20", "12 649,80"],
            &["2023-05-03", "2023-05-02", "NETFLIX SE", "-99", "12 550,80"],
            &["2023-05-26", "2023-05-25", "LÖN MAJ", "25 000,00", "37 550,80"],
        ])
    }

    #[test]
    fn test_locale_amount_decimal_comma() {
        assert_eq!(
            parse_locale_amount("1 234,50"),
            Some(Decimal::new(123_450, 2))
        );
    }

    #[test]
    fn test_locale_amount_minor_unit_integer() {
        assert_eq!(parse_locale_amount("500"), Some(Decimal::new(500, 2)));
        assert_eq!(parse_locale_amount("-99"), Some(Decimal::new(-99, 2)));
    }

    #[test]
    fn test_locale_amount_thousands_only() {
        assert_eq!(parse_locale_amount("25 000"), Some(Decimal::from(25_000)));
    }

    #[test]
    fn test_locale_amount_nbsp_separator() {
        assert_eq!(
            parse_locale_amount("1\u{a0}234,50"),
            Some(Decimal::new(123_450, 2))
        );
    }

    #[test]
    fn test_locale_amount_garbage_is_none() {
        assert_eq!(parse_locale_amount("abc"), None);
        assert_eq!(parse_locale_amount(""), None);
    }

    #[test]
    fn test_parse_statement_skips_sentinel_and_booking_column() {
        let rows = parse_statement(&sample()).unwrap();
        assert_eq!(rows.len(), 3);
        // Transaction date, not the booking date one column over
        assert_eq!(rows[0].date, NaiveDate::from_ymd_opt(2023, 5, 1).unwrap());
        assert_eq!(rows[0].description, "ICA SUPERMARKET");
        assert_eq!(rows[0].amount, Decimal::new(-35_020, 2));
        assert_eq!(rows[0].running_balance, Some(Decimal::new(1_264_980, 2)));
    }

    #[test]
    fn test_minor_unit_row_decodes() {
        let rows = parse_statement(&sample()).unwrap();
        assert_eq!(rows[1].amount, Decimal::new(-99, 2)); // -0.99
    }

    #[test]
    fn test_malformed_amount_rejects_whole_batch_with_row_text() {
        let mut table = sample();
        table[3][3] = "N/A".to_string();
        let err = parse_statement(&table).unwrap_err();
        match err {
            Error::MalformedInput { row, reason } => {
                assert!(row.contains("NETFLIX SE"));
                assert!(reason.contains("N/A"));
            }
            other => panic!("expected MalformedInput, got {other:?}"),
        }
    }

    #[test]
    fn test_malformed_date_rejects_whole_batch() {
        let mut table = sample();
        table[2][1] = "sista april".to_string();
        assert!(matches!(
            parse_statement(&table),
            Err(Error::MalformedInput { .. })
        ));
    }

    #[test]
    fn test_missing_header_is_malformed() {
        let table = raw(&[&["a", "b"], &["1", "2"]]);
        assert!(matches!(
            parse_statement(&table),
            Err(Error::MalformedInput { .. })
        ));
    }

    #[test]
    fn test_empty_rows_skipped_and_sparse_balance_tolerated() {
        let table = raw(&[
            &["Transaktionsdatum", "Text", "Belopp", "Saldo"],
            &["2023-05-01", "COOP", "-120,00", ""],
            &["", "", "", ""],
            &["2023-05-02", "WILLYS", "-80,50", "ej tillgängligt"],
        ]);
        let rows = parse_statement(&table).unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.running_balance.is_none()));
    }

    #[test]
    fn test_entirely_empty_column_is_dropped() {
        // "Text" column empty throughout: description detection must not
        // pick it, and the row still parses.
        let table = raw(&[
            &["Transaktionsdatum", "Text", "Belopp"],
            &["2023-05-01", "", "-120,00"],
            &["2023-05-02", "", "-80,50"],
        ]);
        let rows = parse_statement(&table).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].description, "");
    }
}
