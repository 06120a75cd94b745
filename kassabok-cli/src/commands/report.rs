//! Report command - aggregate views over the ledger

use anyhow::Result;
use chrono::NaiveDate;
use clap::Subcommand;

use kassabok_core::OwnerId;

use super::{get_session, parse_date_arg, parse_month_arg};
use crate::output;

#[derive(Subcommand)]
pub enum ReportCommands {
    /// Profit/loss per month
    Monthly {
        #[command(flatten)]
        range: RangeArgs,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// End-of-month account balance over time (file imports only)
    Balance {
        #[command(flatten)]
        range: RangeArgs,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Spending per category for one month (YYYY-MM)
    Month {
        /// Month to analyze, e.g. 2023-05
        month: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Monthly spending over time for chosen categories
    Categories {
        /// Category names
        #[arg(required = true)]
        names: Vec<String>,
        #[command(flatten)]
        range: RangeArgs,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// High/Medium/Low cost classes over categories
    Classes {
        /// Show per-quarter spending within each class
        #[arg(long)]
        quarterly: bool,
        #[command(flatten)]
        range: RangeArgs,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Per-description breakdown within one category
    Category {
        /// Category name
        name: String,
        #[command(flatten)]
        range: RangeArgs,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(clap::Args)]
pub struct RangeArgs {
    /// Start date (YYYY-MM-DD, inclusive)
    #[arg(long)]
    from: Option<String>,
    /// End date (YYYY-MM-DD, inclusive)
    #[arg(long)]
    to: Option<String>,
}

impl RangeArgs {
    fn resolve(&self) -> Result<(Option<NaiveDate>, Option<NaiveDate>)> {
        let from = self.from.as_deref().map(parse_date_arg).transpose()?;
        let to = self.to.as_deref().map(parse_date_arg).transpose()?;
        Ok((from, to))
    }
}

pub fn run(command: ReportCommands, owner: Option<OwnerId>) -> Result<()> {
    let session = get_session()?;
    let owner_id = session.owner(owner);
    let reports = &session.ctx.report_service;

    match command {
        ReportCommands::Monthly { range, json } => {
            let (from, to) = range.resolve()?;
            let flows = reports.monthly_flow(owner_id, from, to)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&flows)?);
                return Ok(());
            }

            let mut table = output::create_table();
            table.set_header(vec!["Month", "Income", "Expenses", "Net"]);
            for flow in &flows {
                table.add_row(vec![
                    output::format_month(flow.month),
                    output::format_amount(flow.income),
                    output::format_amount(flow.expense),
                    output::format_signed(flow.net),
                ]);
            }
            println!("{table}");
        }

        ReportCommands::Balance { range, json } => {
            let (from, to) = range.resolve()?;
            let series = reports.balance_series(owner_id, from, to)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&series)?);
                return Ok(());
            }

            if series.is_empty() {
                output::warning(
                    "No balance data - balances come from file imports, not manual entries",
                );
                return Ok(());
            }

            let mut table = output::create_table();
            table.set_header(vec!["Month", "Balance"]);
            for point in &series {
                table.add_row(vec![
                    output::format_month(point.month),
                    output::format_amount(point.balance),
                ]);
            }
            println!("{table}");
        }

        ReportCommands::Month { month, json } => {
            let month = parse_month_arg(&month)?;
            let snapshot = reports.month_snapshot(owner_id, month)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&snapshot)?);
                return Ok(());
            }

            let mut table = output::create_table();
            table.set_header(vec!["Category", "Spent"]);
            for entry in &snapshot {
                table.add_row(vec![
                    entry.category.clone(),
                    output::format_amount(entry.total),
                ]);
            }
            println!("{table}");
        }

        ReportCommands::Categories { names, range, json } => {
            let (from, to) = range.resolve()?;
            let series = reports.category_series(owner_id, &names, from, to)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&series)?);
                return Ok(());
            }

            let mut table = output::create_table();
            table.set_header(vec!["Category", "Month", "Spent"]);
            for category in &series {
                for point in &category.points {
                    table.add_row(vec![
                        category.category.clone(),
                        output::format_month(point.period),
                        output::format_amount(point.total),
                    ]);
                }
            }
            println!("{table}");
        }

        ReportCommands::Classes {
            quarterly,
            range,
            json,
        } => {
            let (from, to) = range.resolve()?;

            if quarterly {
                let grouped = reports.class_quarterly(owner_id, from, to)?;

                if json {
                    println!("{}", serde_json::to_string_pretty(&grouped)?);
                    return Ok(());
                }

                let mut table = output::create_table();
                table.set_header(vec!["Class", "Category", "Quarter", "Spent"]);
                for class in &grouped {
                    for category in &class.categories {
                        for point in &category.points {
                            table.add_row(vec![
                                class.class.as_str().to_string(),
                                category.category.clone(),
                                output::format_quarter(point.period),
                                output::format_amount(point.total),
                            ]);
                        }
                    }
                }
                println!("{table}");
            } else {
                let classes = reports.cost_classes(owner_id, from, to)?;

                if json {
                    println!("{}", serde_json::to_string_pretty(&classes)?);
                    return Ok(());
                }

                let mut table = output::create_table();
                table.set_header(vec!["Class", "Category", "Total spent"]);
                for entry in &classes {
                    table.add_row(vec![
                        entry.class.as_str().to_string(),
                        entry.category.clone(),
                        output::format_amount(entry.total),
                    ]);
                }
                println!("{table}");
            }
        }

        ReportCommands::Category { name, range, json } => {
            let (from, to) = range.resolve()?;
            let details = reports.category_details(owner_id, &name, from, to)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&details)?);
                return Ok(());
            }

            if details.is_empty() {
                output::warning(&format!("No expenses recorded under '{name}'"));
                return Ok(());
            }

            let mut table = output::create_table();
            table.set_header(vec!["Text", "Occurrences", "Total"]);
            for entry in &details {
                table.add_row(vec![
                    entry.text.clone(),
                    entry.occurrences.to_string(),
                    output::format_amount(entry.total),
                ]);
            }
            println!("{table}");
        }
    }

    Ok(())
}
