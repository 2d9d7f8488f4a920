//! CLI error types and exit codes.

use ddwatch_core::cycle::CycleError;
use ddwatch_core::error::ConfigError;
use ddwatch_core::store::StoreError;

/// Exit codes for CLI operations
pub mod exit_codes {
    /// General error - configuration, validation, parsing or I/O
    pub const GENERAL_ERROR: i32 = 1;
    /// The cycle could not start: inventory or metrics store unreachable
    pub const CYCLE_UNAVAILABLE: i32 = 2;
}

/// CLI error type
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Inventory or metrics store could not be reached
    #[error("{0}")]
    Unavailable(String),

    /// Store query error
    #[error("Store error: {0}")]
    Store(String),

    /// Report parsing error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Notifier setup error
    #[error("Notification error: {0}")]
    Notify(String),

    /// Output serialization error
    #[error("Output error: {0}")]
    Output(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<CycleError> for CliError {
    fn from(err: CycleError) -> Self {
        Self::Unavailable(err.to_string())
    }
}

impl From<StoreError> for CliError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable(_) | StoreError::Inventory(_) => {
                Self::Unavailable(err.to_string())
            }
            StoreError::Persistence { .. }
            | StoreError::RangeViolation { .. }
            | StoreError::Query(_) => Self::Store(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        Self::Output(err.to_string())
    }
}

impl CliError {
    /// Returns the appropriate exit code for this error type.
    ///
    /// Exit codes:
    /// - 0: Success, including cycles where some or all targets failed
    /// - 1: General error (configuration, parsing, store query, IO)
    /// - 2: The cycle could not start (inventory or store unreachable)
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Unavailable(_) => exit_codes::CYCLE_UNAVAILABLE,
            Self::Config(_)
            | Self::Store(_)
            | Self::Parse(_)
            | Self::Notify(_)
            | Self::Output(_)
            | Self::Io(_) => exit_codes::GENERAL_ERROR,
        }
    }
}
