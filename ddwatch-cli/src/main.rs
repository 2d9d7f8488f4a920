//! `ddwatch` - capacity monitor for storage appliances
//!
//! Runs one monitoring cycle per invocation (meant to be scheduled by cron
//! or a systemd timer) and offers commands to inspect the inventory, test
//! the report parser, show thresholds and query stored readings.

mod cli;
mod commands;
mod error;
mod util;

use clap::Parser;
use cli::Cli;

fn main() {
    let cli = Cli::parse();

    let result = commands::dispatch(&cli);

    if let Err(e) = result {
        if !cli.quiet {
            eprintln!("Error: {e}");
        }
        std::process::exit(e.exit_code());
    }
}
