//! Stored readings of one server.

use ddwatch_core::config::Settings;
use ddwatch_core::models::ServerId;
use ddwatch_core::store::MetricsStore;

use crate::cli::OutputFormat;
use crate::error::CliError;
use crate::util::open_store;

/// Prints the readings of `server_id` from the last `days` days
pub fn cmd_history(
    settings: &Settings,
    server_id: i64,
    days: u32,
    format: OutputFormat,
) -> Result<(), CliError> {
    let store = open_store(settings)?;
    let runtime = tokio::runtime::Runtime::new()?;
    let readings = runtime.block_on(store.history(ServerId(server_id), days))?;

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&readings)?);
        return Ok(());
    }

    if readings.is_empty() {
        println!("No readings for server {server_id} in the last {days} day(s).");
        return Ok(());
    }

    println!(
        "{:<20} {:>10} {:>10} {:>10} {:>5} {:>10}",
        "RECORDED (UTC)", "SIZE GB", "USED GB", "AVAIL GB", "USE%", "CLEAN GB"
    );
    for stored in &readings {
        let figures = &stored.reading.figures;
        println!(
            "{:<20} {:>10.2} {:>10.2} {:>10.2} {:>4}% {:>10.2}",
            stored.recorded_at.format("%Y-%m-%d %H:%M:%S"),
            figures.total_gb,
            figures.used_gb,
            figures.available_gb,
            figures.use_percent,
            figures.reclaimable_gb
        );
    }
    Ok(())
}
