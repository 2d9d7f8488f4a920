//! Core data models for ddwatch
//!
//! Targets come from the inventory, readings come from the report parser.
//! Both are immutable value objects that can be moved freely between the
//! concurrent per-target workers of a cycle.

mod reading;
mod target;

pub use reading::{CapacityFigures, CapacityReading, HostReading, StoredReading};
pub use target::{DEFAULT_SSH_PORT, ServerId, ServerTarget, TargetIdentity};
