//! Alert reports and their delivery
//!
//! A cycle that decides to notify builds one [`AlertReport`] and hands it to
//! a [`Notifier`]. Rendering lives in [`render`]; [`SmtpNotifier`] mails the
//! report and [`LogNotifier`] writes it to the log instead.

mod log;
pub mod render;
mod smtp;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

use crate::models::{HostReading, StoredReading, TargetIdentity};
use crate::policy::AlertThreshold;

pub use log::LogNotifier;
pub use smtp::{SmtpNotifier, SmtpTls};

/// Errors raised while building or delivering a report
#[derive(Debug, Clone, Error)]
pub enum NotifyError {
    /// A sender or recipient address is not a valid mailbox
    #[error("Invalid mail address '{address}': {reason}")]
    InvalidAddress {
        /// Address as configured
        address: String,
        /// Parser diagnostic
        reason: String,
    },

    /// Required mail settings are missing
    #[error("Mail delivery not configured: {0}")]
    NotConfigured(String),

    /// The message could not be assembled
    #[error("Failed to build message: {0}")]
    Message(String),

    /// The relay rejected the message or could not be reached
    #[error("Mail transport error: {0}")]
    Transport(String),
}

/// Result type for notification operations
pub type NotifyResult<T> = Result<T, NotifyError>;

/// Usage trend of one host over the history window
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostHistory {
    /// Host the trend belongs to
    pub host: TargetIdentity,
    /// Number of stored readings in the window
    pub samples: usize,
    /// Lowest use percentage in the window
    pub min_percent: i64,
    /// Highest use percentage in the window
    pub max_percent: i64,
    /// Most recent use percentage
    pub latest_percent: i64,
}

impl HostHistory {
    /// Summarizes stored readings, oldest first.
    ///
    /// Returns `None` when there is nothing to summarize.
    #[must_use]
    pub fn summarize(host: TargetIdentity, readings: &[StoredReading]) -> Option<Self> {
        let latest = readings.last()?.reading.use_percent();
        let (min_percent, max_percent) = readings.iter().map(|r| r.reading.use_percent()).fold(
            (i64::MAX, i64::MIN),
            |(lo, hi), p| (lo.min(p), hi.max(p)),
        );
        Some(Self {
            host,
            samples: readings.len(),
            min_percent,
            max_percent,
            latest_percent: latest,
        })
    }
}

/// Fleet-wide report sent when a cycle notifies
#[derive(Debug, Clone, Serialize)]
pub struct AlertReport {
    /// Cycle date in the operational locale
    pub generated_on: NaiveDate,
    /// Threshold the cycle was judged against
    pub threshold: AlertThreshold,
    /// Every reading obtained in the cycle, sorted by hostname then id
    pub readings: Vec<HostReading>,
    /// Per-host trends; empty unless the payload includes history
    pub history: Vec<HostHistory>,
    /// Days covered by `history`
    pub history_days: u32,
}

impl AlertReport {
    /// Hosts whose reading meets the threshold
    pub fn offenders(&self) -> impl Iterator<Item = &HostReading> {
        self.readings
            .iter()
            .filter(|r| self.threshold.is_met_by(r.reading.use_percent()))
    }
}

/// Delivery channel for alert reports
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Delivers one report.
    ///
    /// # Errors
    ///
    /// Returns a [`NotifyError`] if the report could not be delivered. The
    /// cycle logs it and still completes.
    async fn send(&self, report: &AlertReport) -> NotifyResult<()>;
}
