//! Notification trigger and payload selection.

use serde::{Deserialize, Serialize};

/// When a cycle sends its report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotifyTrigger {
    /// Only when at least one reading meets the threshold
    #[default]
    Threshold,
    /// After every cycle that obtained at least one reading
    Always,
}

impl NotifyTrigger {
    /// Decides whether a cycle sends its report, given how many readings it
    /// obtained and whether any of them meets the threshold.
    ///
    /// A cycle without readings never notifies.
    #[must_use]
    pub const fn should_notify(self, readings: usize, alert_warranted: bool) -> bool {
        if readings == 0 {
            return false;
        }
        match self {
            Self::Always => true,
            Self::Threshold => alert_warranted,
        }
    }
}

/// What the report contains
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportPayload {
    /// The current readings table
    #[default]
    Table,
    /// The table followed by a per-host usage trend from the metrics store
    TableWithHistory,
}

impl ReportPayload {
    /// Returns true if the payload needs stored history
    #[must_use]
    pub const fn includes_history(self) -> bool {
        matches!(self, Self::TableWithHistory)
    }
}
