//! Alerting policies
//!
//! [`ThresholdPolicy`] maps a calendar date to the utilization percentage
//! that warrants an alert. [`NotifyTrigger`] and [`ReportPayload`] select,
//! independently of each other, when a report is sent and what it contains.

mod threshold;
mod trigger;

pub use threshold::{
    AlertThreshold, DEFAULT_THRESHOLD, FRIDAY_THRESHOLD, OPERATIONAL_UTC_OFFSET_HOURS,
    ThresholdPolicy, threshold_for_date,
};
pub use trigger::{NotifyTrigger, ReportPayload};
