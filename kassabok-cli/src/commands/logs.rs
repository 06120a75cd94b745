//! Logs command - view recent application events

use anyhow::{anyhow, Result};

use super::get_logger;
use crate::output;

pub fn run(limit: usize, json: bool) -> Result<()> {
    let logger = get_logger().ok_or_else(|| anyhow!("Failed to open the event log"))?;
    let entries = logger.recent(limit)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        output::warning("No events logged yet");
        return Ok(());
    }

    let mut table = output::create_table();
    table.set_header(vec!["Timestamp (ms)", "Event", "Command", "Error"]);
    for entry in &entries {
        table.add_row(vec![
            entry.timestamp.to_string(),
            entry.event.clone(),
            entry.command.clone().unwrap_or_else(|| "-".to_string()),
            entry.error_message.clone().unwrap_or_else(|| "-".to_string()),
        ]);
    }
    println!("{table}");

    Ok(())
}
