//! Inventory and metrics persistence
//!
//! The cycle only depends on the [`Inventory`] and [`MetricsStore`] traits.
//! [`SqliteStore`] implements both on a single SQLite file;
//! [`StaticInventory`] serves targets listed in the settings file.

mod limits;
mod sqlite;
mod static_inventory;

use async_trait::async_trait;

use crate::models::{CapacityReading, ServerId, ServerTarget, StoredReading};

pub use limits::{CAPACITY_COLUMN_LIMIT, check_column_limits};
pub use sqlite::SqliteStore;
pub use static_inventory::StaticInventory;

/// Errors raised by inventory and metrics persistence
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    /// The store could not be opened or reached at all
    #[error("Metrics store unavailable: {0}")]
    Unavailable(String),

    /// The target list could not be fetched
    #[error("Inventory unavailable: {0}")]
    Inventory(String),

    /// Writing a reading failed
    #[error("Failed to record reading for server {}: {reason}", .reading.server_id)]
    Persistence {
        /// The full record that was being written
        reading: CapacityReading,
        /// Store diagnostic
        reason: String,
    },

    /// A reading does not fit the store's numeric columns
    #[error(
        "Reading for server {} violates column limits: {}",
        .reading.server_id,
        .violations.join(", ")
    )]
    RangeViolation {
        /// The full record that was rejected
        reading: CapacityReading,
        /// One entry per offending field
        violations: Vec<String>,
    },

    /// A read query failed
    #[error("Query failed: {0}")]
    Query(String),
}

impl StoreError {
    /// The rejected record, for write failures
    #[must_use]
    pub const fn reading(&self) -> Option<&CapacityReading> {
        match self {
            Self::Persistence { reading, .. } | Self::RangeViolation { reading, .. } => {
                Some(reading)
            }
            _ => None,
        }
    }
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Source of the monitored fleet
#[async_trait]
pub trait Inventory: Send + Sync {
    /// Returns every target to poll, in inventory order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Inventory`] or [`StoreError::Unavailable`] when
    /// the list cannot be produced; the cycle aborts in that case.
    async fn list_targets(&self) -> StoreResult<Vec<ServerTarget>>;
}

/// Time series of capacity readings
#[async_trait]
pub trait MetricsStore: Send + Sync {
    /// Persists one reading as its own atomic unit.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::RangeViolation`] or [`StoreError::Persistence`]
    /// carrying the full record.
    async fn record(&self, reading: &CapacityReading) -> StoreResult<()>;

    /// Readings of `server_id` from the last `window_days`, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Query`] if the history cannot be read.
    async fn history(&self, server_id: ServerId, window_days: u32)
    -> StoreResult<Vec<StoredReading>>;
}
