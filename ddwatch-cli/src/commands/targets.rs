//! Inventory listing.

use std::sync::Arc;

use ddwatch_core::config::Settings;
use ddwatch_core::models::ServerTarget;
use ddwatch_core::store::Inventory;

use crate::cli::OutputFormat;
use crate::error::CliError;
use crate::util::{open_store, static_inventory, truncate};

/// Lists the targets the next cycle would poll.
///
/// The store is only opened when the settings file lists no targets.
pub fn cmd_targets(settings: &Settings, format: OutputFormat) -> Result<(), CliError> {
    let inventory = match static_inventory(settings) {
        Some(inventory) => inventory,
        None => open_store(settings)? as Arc<dyn Inventory>,
    };
    let runtime = tokio::runtime::Runtime::new()?;
    let targets = runtime.block_on(inventory.list_targets())?;

    match format {
        OutputFormat::Table => print_table(&targets),
        OutputFormat::Json => {
            let entries: Vec<_> = targets.iter().map(target_json).collect();
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
    }
    Ok(())
}

fn target_json(target: &ServerTarget) -> serde_json::Value {
    serde_json::json!({
        "id": target.id,
        "hostname": target.hostname,
        "address": target.address,
        "username": target.username,
        "port": target.port,
        "has_password": target.has_password(),
    })
}

fn print_table(targets: &[ServerTarget]) {
    if targets.is_empty() {
        println!("No targets configured.");
        return;
    }

    println!(
        "{:>6}  {:<24} {:<16} {:<12} {:>5}  AUTH",
        "ID", "HOSTNAME", "ADDRESS", "USER", "PORT"
    );
    for target in targets {
        let auth = if target.has_password() {
            "password"
        } else {
            "key"
        };
        println!(
            "{:>6}  {:<24} {:<16} {:<12} {:>5}  {auth}",
            target.id,
            truncate(&target.hostname, 24),
            truncate(&target.address, 16),
            truncate(&target.username, 12),
            target.port
        );
    }
    println!("\n{} target(s)", targets.len());
}
