//! Offline parsing of a captured capacity report.

use std::io::Read;
use std::path::Path;

use ddwatch_core::config::Settings;
use ddwatch_core::report::{CapacityReportParser, ParseMode, ParsedReport};

use crate::cli::OutputFormat;
use crate::error::CliError;

/// Parses a report from `file` (stdin when absent or `-`) with the
/// configured marker.
pub fn cmd_parse(
    settings: &Settings,
    file: Option<&Path>,
    strict: bool,
    format: OutputFormat,
) -> Result<(), CliError> {
    settings.monitor.validate()?;
    let text = read_input(file)?;
    let mode = if strict {
        ParseMode::Strict
    } else {
        settings.monitor.parse_mode
    };
    let parser = CapacityReportParser::new(settings.monitor.marker.clone(), mode);
    let parsed = parser
        .parse(&text)
        .map_err(|e| CliError::Parse(e.to_string()))?;

    match format {
        OutputFormat::Table => print_parsed(&parsed),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&parsed)?),
    }
    Ok(())
}

fn read_input(file: Option<&Path>) -> Result<String, CliError> {
    match file {
        Some(path) if path != Path::new("-") => Ok(std::fs::read_to_string(path)?),
        _ => {
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text)?;
            Ok(text)
        }
    }
}

fn print_parsed(parsed: &ParsedReport) {
    let figures = &parsed.figures;
    println!("Line:         {}", parsed.line.trim());
    println!("Size (GB):    {:.2}", figures.total_gb);
    println!("Used (GB):    {:.2}", figures.used_gb);
    println!("Avail (GB):   {:.2}", figures.available_gb);
    println!("Use%:         {}", figures.use_percent);
    println!("Cleanable:    {:.2}", figures.reclaimable_gb);
    for anomaly in &parsed.anomalies {
        println!(
            "Warning: {} '{}' is not a number, coerced to 0",
            anomaly.field, anomaly.token
        );
    }
}
