//! One monitoring cycle.

use std::sync::Arc;

use ddwatch_core::config::Settings;
use ddwatch_core::cycle::{CycleOptions, CycleReport, MonitoringCycle, NotificationStatus};
use ddwatch_core::remote::SshExecutor;

use crate::cli::OutputFormat;
use crate::error::CliError;
use crate::util::{build_inventory, build_notifier, open_store, truncate};

/// Validates the settings, runs one cycle and prints its summary.
///
/// Target and notification failures are reported but do not fail the
/// command; only an unreachable store or inventory does.
pub fn cmd_run(
    mut settings: Settings,
    dry_run: bool,
    format: OutputFormat,
) -> Result<(), CliError> {
    settings.notify.dry_run |= dry_run;
    settings.validate()?;

    let store = open_store(&settings)?;
    let inventory = build_inventory(&settings, &store);
    let notifier = build_notifier(&settings, settings.notify.dry_run)?;
    let executor = SshExecutor::new()
        .connect_timeout(settings.monitor.connect_timeout())
        .command_timeout(settings.monitor.command_timeout());

    let cycle = MonitoringCycle::new(inventory, Arc::new(executor), store, notifier)
        .with_parser(settings.monitor.parser())
        .with_policy(settings.monitor.threshold_policy())
        .with_options(CycleOptions::from_settings(&settings));

    let runtime = tokio::runtime::Runtime::new()?;
    let report = runtime.block_on(cycle.run())?;

    match format {
        OutputFormat::Table => print_summary(&report),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }
    Ok(())
}

fn print_summary(report: &CycleReport) {
    println!(
        "Cycle {} (threshold {}): {} targets, {} stored, {} failed, {} not stored",
        report.local_date,
        report.threshold,
        report.targets,
        report.readings.len(),
        report.failures.len(),
        report.persistence_failures.len()
    );

    if !report.readings.is_empty() {
        println!();
        println!(
            "{:<24} {:<16} {:>10} {:>10} {:>10} {:>5}",
            "HOST", "ADDRESS", "SIZE GB", "USED GB", "AVAIL GB", "USE%"
        );
        for entry in &report.readings {
            let figures = &entry.reading.figures;
            let flag = if report.threshold.is_met_by(figures.use_percent) {
                " !"
            } else {
                ""
            };
            println!(
                "{:<24} {:<16} {:>10.2} {:>10.2} {:>10.2} {:>4}%{flag}",
                truncate(&entry.host.hostname, 24),
                truncate(&entry.host.address, 16),
                figures.total_gb,
                figures.used_gb,
                figures.available_gb,
                figures.use_percent
            );
        }
    }

    for failure in &report.failures {
        println!(
            "FAILED  {} ({}) at {}: {}",
            failure.host.hostname, failure.host.address, failure.stage, failure.error
        );
    }
    for failure in &report.persistence_failures {
        println!("NOT STORED  {}: {}", failure.host.hostname, failure.error);
    }

    let notification = match &report.notification {
        NotificationStatus::NoReadings => "skipped, no readings".to_string(),
        NotificationStatus::NotWarranted => "skipped, below threshold".to_string(),
        NotificationStatus::Sent => "sent".to_string(),
        NotificationStatus::Failed(e) => format!("failed: {e}"),
    };
    println!("Notification: {notification}");
}
