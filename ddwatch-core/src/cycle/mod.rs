//! Monitoring cycle orchestration
//!
//! A cycle moves through [`CyclePhase`]s: the inventory is fetched, every
//! target is polled with bounded concurrency, the per-target outcomes are
//! folded into a [`CycleResult`], the notification trigger is applied and
//! the report is delivered. Only an unavailable inventory aborts a cycle;
//! every per-target failure is logged and skipped.

mod orchestrator;
mod outcome;

use thiserror::Error;

use crate::store::StoreError;

pub use orchestrator::{CycleOptions, MonitoringCycle};
pub use outcome::{
    CyclePhase, CycleReport, CycleResult, FailureStage, NotificationStatus, PersistenceFailure,
    TargetFailure, TargetOutcome,
};

/// Errors that prevent a cycle from running
#[derive(Debug, Clone, Error)]
pub enum CycleError {
    /// The target list could not be fetched; no target was attempted
    #[error("Inventory unavailable: {0}")]
    InventoryUnavailable(#[source] StoreError),
}
