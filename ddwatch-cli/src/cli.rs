//! CLI argument parsing types using `clap`.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};

/// Storage appliance capacity monitor
#[derive(Parser)]
#[command(name = "ddwatch")]
#[command(author, version, about = "Poll Data Domain capacity and mail an alert when it runs high")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the settings file
    #[arg(short, long, global = true, env = "DDWATCH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Command to run; defaults to `run`
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Run one monitoring cycle
    #[command(about = "Poll every target, store the readings and notify if warranted")]
    Run {
        /// Log the report instead of mailing it
        #[arg(long)]
        dry_run: bool,

        /// Output format for the cycle summary
        #[arg(short, long, default_value = "table", value_enum)]
        format: OutputFormat,
    },

    /// List the inventory
    #[command(about = "List monitored targets (passwords are never shown)")]
    Targets {
        /// Output format for the target list
        #[arg(short, long, default_value = "table", value_enum)]
        format: OutputFormat,
    },

    /// Parse a captured report
    #[command(about = "Parse a captured df report from a file or stdin")]
    Parse {
        /// Report file; reads stdin when omitted or `-`
        file: Option<PathBuf>,

        /// Fail on non-numeric fields instead of coercing them to 0
        #[arg(long)]
        strict: bool,

        /// Output format for the parsed reading
        #[arg(short, long, default_value = "table", value_enum)]
        format: OutputFormat,
    },

    /// Show the alert threshold
    #[command(about = "Show the alert threshold for a date (today by default)")]
    Threshold {
        /// Date as YYYY-MM-DD
        #[arg(short, long)]
        date: Option<NaiveDate>,
    },

    /// Show stored readings of one server
    #[command(about = "Show stored readings of one server")]
    History {
        /// Server identifier
        server_id: i64,

        /// Days to look back
        #[arg(short, long, default_value_t = 7)]
        days: u32,

        /// Output format for the readings
        #[arg(short, long, default_value = "table", value_enum)]
        format: OutputFormat,
    },

    /// Create the metrics database
    #[command(about = "Create the database schema and load [[targets]] into it")]
    InitDb,
}

/// Output format options
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Display as formatted table
    #[default]
    Table,
    /// Output as JSON
    Json,
}
