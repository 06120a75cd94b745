//! Add command - manual transaction entry

use anyhow::{anyhow, Result};
use rust_decimal::Decimal;

use kassabok_core::services::parse_locale_amount;
use kassabok_core::OwnerId;

use super::{get_session, parse_date_arg};
use crate::output;

pub fn run(
    date: &str,
    amount: &str,
    category: Option<&str>,
    text: &str,
    owner: Option<OwnerId>,
    json: bool,
) -> Result<()> {
    let session = get_session()?;
    let owner_id = session.owner(owner);

    let date = parse_date_arg(date)?;
    let amount = parse_amount_arg(amount)?;

    let tx = session
        .ctx
        .import_service
        .add_manual(owner_id, date, amount, category, text)?;
    session.commit()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&tx)?);
        return Ok(());
    }

    output::success(&format!(
        "Recorded {} on {} ({})",
        output::format_amount(tx.amount),
        tx.date,
        tx.category.as_deref().unwrap_or("income"),
    ));
    Ok(())
}

/// Manual amounts are typed by a human: plain decimal point first, the
/// statement's comma style as a fallback. The file-only minor-unit
/// convention does not apply here.
fn parse_amount_arg(s: &str) -> Result<Decimal> {
    let trimmed = s.trim();
    if let Ok(amount) = trimmed.parse::<Decimal>() {
        return Ok(amount);
    }
    if trimmed.contains(',') {
        if let Some(amount) = parse_locale_amount(trimmed) {
            return Ok(amount);
        }
    }
    Err(anyhow!("Invalid amount '{}'", s))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_amount_arg_plain_decimal() {
        assert_eq!(parse_amount_arg("-350.20").unwrap(), Decimal::new(-35_020, 2));
        // A typed integer is whole units, not minor units
        assert_eq!(parse_amount_arg("500").unwrap(), Decimal::from(500));
    }

    #[test]
    fn test_parse_amount_arg_comma_style() {
        assert_eq!(parse_amount_arg("-350,20").unwrap(), Decimal::new(-35_020, 2));
    }

    #[test]
    fn test_parse_amount_arg_rejects_garbage() {
        assert!(parse_amount_arg("abc").is_err());
    }
}
