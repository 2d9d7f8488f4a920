//! Capacity reading models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::target::{ServerId, TargetIdentity};

/// The five figures extracted from one data-volume report line.
///
/// Capacities are in GB as printed by the appliance. `use_percent` is not
/// range-checked here; out-of-range values are surfaced by the cycle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CapacityFigures {
    /// Total capacity (GB)
    pub total_gb: f64,
    /// Used capacity (GB)
    pub used_gb: f64,
    /// Available capacity (GB)
    pub available_gb: f64,
    /// Utilization percentage
    pub use_percent: i64,
    /// Capacity recoverable by the appliance's cleaning process (GB)
    pub reclaimable_gb: f64,
}

impl CapacityFigures {
    /// Returns true if every capacity figure is a finite number
    #[must_use]
    pub fn is_finite(&self) -> bool {
        [
            self.total_gb,
            self.used_gb,
            self.available_gb,
            self.reclaimable_gb,
        ]
        .iter()
        .all(|v| v.is_finite())
    }

    /// Returns true if the percentage lies in the conventional 0–100 range
    #[must_use]
    pub const fn percent_in_range(&self) -> bool {
        self.use_percent >= 0 && self.use_percent <= 100
    }
}

/// One measurement for one server at one point in time
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CapacityReading {
    /// Server the figures belong to
    pub server_id: ServerId,
    /// Parsed figures
    #[serde(flatten)]
    pub figures: CapacityFigures,
}

impl CapacityReading {
    /// Attaches parsed figures to a server
    #[must_use]
    pub const fn new(server_id: ServerId, figures: CapacityFigures) -> Self {
        Self { server_id, figures }
    }

    /// Utilization percentage of this reading
    #[must_use]
    pub const fn use_percent(&self) -> i64 {
        self.figures.use_percent
    }
}

/// A reading paired with the host it came from, as carried into reports
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostReading {
    /// Host identity (no secrets)
    pub host: TargetIdentity,
    /// The reading
    pub reading: CapacityReading,
}

impl HostReading {
    /// Ordering key used for reproducible reports: hostname, then id
    #[must_use]
    pub fn sort_key(&self) -> (&str, ServerId) {
        (self.host.hostname.as_str(), self.host.id)
    }
}

/// A reading loaded back from the metrics store
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StoredReading {
    /// When the reading was recorded
    pub recorded_at: DateTime<Utc>,
    /// The reading itself
    pub reading: CapacityReading,
}
