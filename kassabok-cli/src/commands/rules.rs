//! Rules command - category rule management

use anyhow::Result;
use clap::Subcommand;

use kassabok_core::services::LogEvent;
use kassabok_core::OwnerId;

use super::{get_logger, get_session, log_event};
use crate::output;

#[derive(Subcommand)]
pub enum RulesCommands {
    /// List categories and their identifying texts
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Add a new category, optionally with a first identifying text
    Add {
        /// Category name
        name: String,
        /// Text that identifies the category in statement descriptions
        #[arg(long)]
        text: Option<String>,
    },

    /// Attach another identifying text to an existing category and
    /// re-tag matching historical transactions
    Identify {
        /// Category name
        name: String,
        /// Identifying text
        text: String,
    },

    /// Delete a category; its transactions move to "Other"
    Delete {
        /// Category name
        name: String,
    },
}

pub fn run(command: RulesCommands, owner: Option<OwnerId>) -> Result<()> {
    let session = get_session()?;
    let owner_id = session.owner(owner);
    let logger = get_logger();

    match command {
        RulesCommands::List { json } => {
            let rules = session.ctx.rule_service.list(owner_id)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&rules)?);
                return Ok(());
            }

            if rules.is_empty() {
                output::warning("No categories yet - add one with `kb rules add`");
                return Ok(());
            }

            let mut table = output::create_table();
            table.set_header(vec!["Category", "Identifying text"]);
            for rule in &rules {
                table.add_row(vec![
                    rule.name.as_str(),
                    rule.matching_text.as_deref().unwrap_or("-"),
                ]);
            }
            println!("{table}");
        }

        RulesCommands::Add { name, text } => {
            let rule = session
                .ctx
                .rule_service
                .add(owner_id, &name, text.as_deref())?;
            session.commit()?;
            log_event(&logger, LogEvent::new("rule_added").with_command("rules add"));

            match rule.matching_text {
                Some(text) => output::success(&format!(
                    "Added category '{}' matching on '{}'",
                    rule.name, text
                )),
                None => output::success(&format!("Added category '{}'", rule.name)),
            }
        }

        RulesCommands::Identify { name, text } => {
            let result = session.ctx.rule_service.identify(owner_id, &name, &text)?;
            session.commit()?;
            log_event(
                &logger,
                LogEvent::new("rule_text_added").with_command("rules identify"),
            );

            output::success(&format!(
                "'{}' now also matches on '{}' - {} existing transaction(s) re-tagged",
                result.category, result.matching_text, result.retagged
            ));
        }

        RulesCommands::Delete { name } => {
            let result = session.ctx.rule_service.delete(owner_id, &name)?;
            session.commit()?;
            log_event(
                &logger,
                LogEvent::new("rule_deleted").with_command("rules delete"),
            );

            output::success(&format!(
                "Deleted '{}' - {} transaction(s) moved to Other",
                result.category, result.retagged
            ));
        }
    }

    Ok(())
}
