//! ddwatch Core Library
//!
//! Polls a fleet of storage appliances over SSH, extracts data-volume
//! capacity figures from their disk usage report, stores a time series per
//! host and mails a fleet-wide report when a day-dependent threshold is met.
//!
//! # Crate Structure
//!
//! - [`models`] - Targets and capacity readings
//! - [`remote`] - Remote command execution over the system `ssh` client
//! - [`report`] - Capacity report parser and its column schema
//! - [`policy`] - Alert threshold, notification trigger and payload
//! - [`cycle`] - The monitoring cycle
//! - [`store`] - Inventory and metrics store contracts, SQLite adapter
//! - [`notify`] - Alert report rendering and delivery
//! - [`config`] - Settings file
//! - [`tracing`] - Logging bootstrap

#![warn(missing_docs)]

pub mod config;
pub mod cycle;
pub mod error;
pub mod models;
pub mod notify;
pub mod policy;
pub mod remote;
pub mod report;
pub mod store;
pub mod tracing;

pub use config::{ConfigManager, Settings};
pub use cycle::{
    CycleError, CycleOptions, CycleReport, CycleResult, MonitoringCycle, NotificationStatus,
};
pub use error::{ConfigError, ConfigResult, DdwatchError, DdwatchResult};
pub use models::{CapacityFigures, CapacityReading, HostReading, ServerId, ServerTarget};
pub use notify::{AlertReport, LogNotifier, Notifier, NotifyError, SmtpNotifier};
pub use policy::{AlertThreshold, NotifyTrigger, ReportPayload, ThresholdPolicy};
pub use remote::{ExecError, RemoteExecutor, SshExecutor};
pub use report::{CapacityReportParser, ParseError, ParseMode, ParsedReport};
pub use store::{Inventory, MetricsStore, SqliteStore, StaticInventory, StoreError};
pub use tracing::{TracingConfig, TracingError, TracingLevel, TracingOutput, init_tracing};
