//! Configuration management for ddwatch
//!
//! This module provides the `ConfigManager` for locating and loading the
//! TOML settings file.

mod manager;
pub mod settings;

pub use manager::{CONFIG_FILE_NAME, ConfigManager};
pub use settings::{
    DEFAULT_CONCURRENCY, DEFAULT_HISTORY_DAYS, LoggingSettings, MAX_COMMAND_TIMEOUT_SECS,
    MAX_CONCURRENCY, MAX_HISTORY_DAYS, MonitorSettings, NotifySettings, Settings, SmtpSettings,
    StoreSettings,
};
