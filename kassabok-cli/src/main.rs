//! Kassabok CLI - spend analysis in your terminal

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod output;

use commands::{add, import, logs, report, rules, status};
use kassabok_core::OwnerId;

/// Kassabok - bank statement categorization and spend analysis
#[derive(Parser)]
#[command(name = "kb", version, about, long_about = None)]
struct Cli {
    /// Owner id to operate on (defaults to the configured owner)
    #[arg(long, global = true)]
    owner: Option<OwnerId>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show ledger status and summary
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Import a statement file
    Import {
        /// Path to the exported statement (CSV)
        file: PathBuf,
        /// Field delimiter used by the export
        #[arg(long, default_value = ";")]
        delimiter: char,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Record a transaction manually
    Add {
        /// Transaction date (YYYY-MM-DD)
        #[arg(long)]
        date: String,
        /// Signed amount: negative = expense, positive = income
        #[arg(long, allow_hyphen_values = true)]
        amount: String,
        /// Category for an expense (defaults to "Other")
        #[arg(long)]
        category: Option<String>,
        /// Free-text description
        #[arg(long, default_value = "")]
        text: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage category rules
    Rules {
        #[command(subcommand)]
        command: rules::RulesCommands,
    },

    /// Aggregate views over the ledger
    Report {
        #[command(subcommand)]
        command: report::ReportCommands,
    },

    /// View recent application events
    Logs {
        /// Number of entries to show
        #[arg(long, default_value_t = 20)]
        limit: usize,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::error(&e.to_string());
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let owner = cli.owner;
    match cli.command {
        Commands::Status { json } => status::run(owner, json),
        Commands::Import {
            file,
            delimiter,
            json,
        } => import::run(&file, owner, delimiter, json),
        Commands::Add {
            date,
            amount,
            category,
            text,
            json,
        } => add::run(&date, &amount, category.as_deref(), &text, owner, json),
        Commands::Rules { command } => rules::run(command, owner),
        Commands::Report { command } => report::run(command, owner),
        Commands::Logs { limit, json } => logs::run(limit, json),
    }
}
