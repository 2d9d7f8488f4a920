//! Threshold lookup.

use chrono::{NaiveDate, Utc};
use ddwatch_core::config::Settings;

/// Prints the threshold percentage for `date`, or for today in the
/// operational locale.
pub fn cmd_threshold(settings: &Settings, date: Option<NaiveDate>) {
    let policy = settings.monitor.threshold_policy();
    let date = date.unwrap_or_else(|| policy.local_date(Utc::now()));
    println!("{}", policy.for_date(date).percent());
}
