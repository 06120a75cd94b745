//! Output formatting utilities

use chrono::{Datelike, NaiveDate};
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL_CONDENSED, ContentArrangement, Table};
use rust_decimal::Decimal;

/// Print a success message
pub fn success(msg: &str) {
    println!("{}", msg.green());
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{}", msg.red());
}

/// Print a warning message
pub fn warning(msg: &str) {
    println!("{}", msg.yellow());
}

/// Create a styled table
pub fn create_table() -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Format an amount the way the statements print them
pub fn format_amount(amount: Decimal) -> String {
    format!("{:.2} kr", amount)
}

/// Signed amount with red/green coloring for terminals
pub fn format_signed(amount: Decimal) -> String {
    let text = format_amount(amount);
    if amount < Decimal::ZERO {
        text.red().to_string()
    } else {
        text.green().to_string()
    }
}

/// Month bucket label, e.g. "May 2023"
pub fn format_month(date: NaiveDate) -> String {
    format!("{} {}", month_name(date.month()), date.year())
}

/// Quarter bucket label, e.g. "Q2 2023"
pub fn format_quarter(date: NaiveDate) -> String {
    format!("Q{} {}", (date.month() - 1) / 3 + 1, date.year())
}

fn month_name(month: u32) -> &'static str {
    match month {
        1 => "Jan",
        2 => "Feb",
        3 => "Mar",
        4 => "Apr",
        5 => "May",
        6 => "Jun",
        7 => "Jul",
        8 => "Aug",
        9 => "Sep",
        10 => "Oct",
        11 => "Nov",
        _ => "Dec",
    }
}
