//! Per-target outcomes and their reduction into a cycle result.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::models::{CapacityReading, HostReading, TargetIdentity};
use crate::policy::AlertThreshold;

/// Stage of the per-target pipeline that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureStage {
    /// Session or remote command
    Execute,
    /// Report parsing
    Parse,
}

impl fmt::Display for FailureStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Execute => write!(f, "execute"),
            Self::Parse => write!(f, "parse"),
        }
    }
}

/// A target that yielded no reading this cycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetFailure {
    /// Target that failed
    pub host: TargetIdentity,
    /// Where it failed
    pub stage: FailureStage,
    /// Error text
    pub error: String,
}

/// A reading that was obtained but could not be stored
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PersistenceFailure {
    /// Target the reading belongs to
    pub host: TargetIdentity,
    /// The full rejected record
    pub reading: CapacityReading,
    /// Store error text
    pub error: String,
}

/// What polling one target produced
#[derive(Debug, Clone, PartialEq)]
pub enum TargetOutcome {
    /// A reading was parsed and stored
    Recorded(HostReading),
    /// A reading was parsed but the store rejected it
    Unpersisted(PersistenceFailure),
    /// No reading
    Failed(TargetFailure),
}

/// Readings and failures of one cycle, built by folding target outcomes
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CycleResult {
    readings: Vec<HostReading>,
    failures: Vec<TargetFailure>,
    persistence_failures: Vec<PersistenceFailure>,
}

impl CycleResult {
    /// Folds outcomes in any order into a result sorted by hostname, then id.
    ///
    /// Only stored readings count as readings; a rejected one is kept in
    /// [`Self::persistence_failures`] alone.
    #[must_use]
    pub fn from_outcomes(outcomes: impl IntoIterator<Item = TargetOutcome>) -> Self {
        let mut result = outcomes
            .into_iter()
            .fold(Self::default(), |mut acc, outcome| {
                match outcome {
                    TargetOutcome::Recorded(reading) => acc.readings.push(reading),
                    TargetOutcome::Unpersisted(failure) => acc.persistence_failures.push(failure),
                    TargetOutcome::Failed(failure) => acc.failures.push(failure),
                }
                acc
            });

        result
            .readings
            .sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
        result
            .failures
            .sort_by(|a, b| (&a.host.hostname, a.host.id).cmp(&(&b.host.hostname, b.host.id)));
        result
            .persistence_failures
            .sort_by(|a, b| (&a.host.hostname, a.host.id).cmp(&(&b.host.hostname, b.host.id)));
        result
    }

    /// Every stored reading, sorted by hostname then id
    #[must_use]
    pub fn readings(&self) -> &[HostReading] {
        &self.readings
    }

    /// Targets that yielded no reading
    #[must_use]
    pub fn failures(&self) -> &[TargetFailure] {
        &self.failures
    }

    /// Readings that could not be stored
    #[must_use]
    pub fn persistence_failures(&self) -> &[PersistenceFailure] {
        &self.persistence_failures
    }

    /// True if any stored reading meets the threshold
    #[must_use]
    pub fn alert_warranted(&self, threshold: AlertThreshold) -> bool {
        self.readings
            .iter()
            .any(|r| threshold.is_met_by(r.reading.use_percent()))
    }

    /// Splits the result into its parts
    #[must_use]
    pub fn into_parts(
        self,
    ) -> (
        Vec<HostReading>,
        Vec<TargetFailure>,
        Vec<PersistenceFailure>,
    ) {
        (self.readings, self.failures, self.persistence_failures)
    }
}

/// Steps of one cycle, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CyclePhase {
    /// Loading targets from the inventory
    FetchingInventory,
    /// Polling targets
    IteratingTargets,
    /// Folding outcomes
    Aggregating,
    /// Applying the notification trigger
    Deciding,
    /// Delivering the report
    Notifying,
    /// Finished
    Done,
}

impl fmt::Display for CyclePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::FetchingInventory => "fetching_inventory",
            Self::IteratingTargets => "iterating_targets",
            Self::Aggregating => "aggregating",
            Self::Deciding => "deciding",
            Self::Notifying => "notifying",
            Self::Done => "done",
        };
        f.write_str(name)
    }
}

/// What happened to the notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status", content = "error")]
pub enum NotificationStatus {
    /// No reading was obtained
    NoReadings,
    /// The trigger did not fire
    NotWarranted,
    /// The report was delivered
    Sent,
    /// Delivery failed
    Failed(String),
}

impl NotificationStatus {
    /// True if a delivery was attempted
    #[must_use]
    pub const fn attempted(&self) -> bool {
        matches!(self, Self::Sent | Self::Failed(_))
    }
}

/// Summary of one completed cycle
#[derive(Debug, Clone, Serialize)]
pub struct CycleReport {
    /// When the cycle started
    pub started_at: DateTime<Utc>,
    /// Cycle date in the operational locale
    pub local_date: NaiveDate,
    /// Threshold the cycle was judged against
    pub threshold: AlertThreshold,
    /// Number of targets in the inventory
    pub targets: usize,
    /// Stored readings, sorted by hostname then id
    pub readings: Vec<HostReading>,
    /// Targets that yielded no reading
    pub failures: Vec<TargetFailure>,
    /// Readings the store rejected; excluded from `readings`
    pub persistence_failures: Vec<PersistenceFailure>,
    /// Notification decision and delivery
    pub notification: NotificationStatus,
    /// Wall time of the cycle
    pub elapsed_ms: u64,
}
