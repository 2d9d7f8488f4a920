//! Crate-level error types

use std::path::PathBuf;

use thiserror::Error;

use crate::cycle::CycleError;
use crate::notify::NotifyError;
use crate::remote::ExecError;
use crate::report::ParseError;
use crate::store::StoreError;
use crate::tracing::TracingError;

/// Errors raised while loading or validating the settings file
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// An explicitly requested settings file does not exist
    #[error("Configuration file not found: {0}")]
    NotFound(PathBuf),

    /// The settings file could not be read
    #[error("Failed to read {path}: {reason}")]
    Read {
        /// File path
        path: PathBuf,
        /// I/O diagnostic
        reason: String,
    },

    /// The settings file is not valid TOML for the settings schema
    #[error("Failed to parse configuration: {0}")]
    Parse(String),

    /// A value is out of its allowed range
    #[error("Invalid configuration value for {field}: {reason}")]
    Validation {
        /// Dotted key of the offending setting
        field: String,
        /// What is wrong with it
        reason: String,
    },

    /// No platform directory could be resolved for a default path
    #[error("Cannot determine the {0} directory")]
    NoDirectory(&'static str),
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Top-level error for ddwatch operations
#[derive(Debug, Error)]
pub enum DdwatchError {
    /// Settings error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Store or inventory error
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The cycle could not start
    #[error(transparent)]
    Cycle(#[from] CycleError),

    /// Remote execution error
    #[error(transparent)]
    Exec(#[from] ExecError),

    /// Report parsing error
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Notification error
    #[error(transparent)]
    Notify(#[from] NotifyError),

    /// Logging bootstrap error
    #[error(transparent)]
    Tracing(#[from] TracingError),
}

/// Result type for top-level operations
pub type DdwatchResult<T> = Result<T, DdwatchError>;
