//! Status command - ledger overview

use anyhow::Result;
use colored::Colorize;

use kassabok_core::OwnerId;

use super::get_session;
use crate::output;

pub fn run(owner: Option<OwnerId>, json: bool) -> Result<()> {
    let session = get_session()?;
    let owner_id = session.owner(owner);
    let status = session.ctx.report_service.status(owner_id)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    println!("{}", "Ledger Status".bold());
    println!();

    let mut table = output::create_table();
    table.add_row(vec!["Owner", &owner_id.to_string()]);
    table.add_row(vec!["Transactions", &status.transactions.to_string()]);
    table.add_row(vec!["Categories", &status.rules.to_string()]);
    println!("{table}");

    if let (Some(earliest), Some(latest)) = (status.earliest, status.latest) {
        println!();
        println!("Date range: {} to {}", earliest, latest);
    }

    Ok(())
}
