//! Remote command execution
//!
//! One call opens one fresh session to one host, runs one command and
//! returns its buffered standard output. There is no pooling and no retry:
//! a failed attempt is final for that host in the current cycle.

mod ssh;

use async_trait::async_trait;

use crate::models::ServerTarget;

pub use ssh::{
    DEFAULT_COMMAND_TIMEOUT_SECS, DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_SSH_PROGRAM,
    SSH_SESSION_FAILURE_EXIT, SshExecutor, classify_exit,
};

/// Errors that can occur while running a remote command
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExecError {
    /// The session could not be established (unreachable host, transport error)
    #[error("Failed to open session to {host} ({address}): {reason}")]
    Session {
        /// Target hostname
        host: String,
        /// Target address
        address: String,
        /// Transport diagnostic
        reason: String,
    },

    /// The remote side rejected the credentials
    #[error("Authentication rejected by {host} ({address})")]
    AuthenticationRejected {
        /// Target hostname
        host: String,
        /// Target address
        address: String,
    },

    /// The session or command did not finish in time
    #[error("Session to {host} ({address}) timed out after {secs}s")]
    Timeout {
        /// Target hostname
        host: String,
        /// Target address
        address: String,
        /// Configured limit in seconds
        secs: u64,
    },

    /// The command ran and exited with a non-zero status
    #[error("Command failed on {host} ({address}) with exit code {code}: {stderr}")]
    CommandFailed {
        /// Target hostname
        host: String,
        /// Target address
        address: String,
        /// Remote exit status
        code: i32,
        /// Captured standard error
        stderr: String,
    },

    /// The command succeeded but printed nothing
    #[error("Command produced no output on {host} ({address})")]
    NoOutput {
        /// Target hostname
        host: String,
        /// Target address
        address: String,
    },
}

impl ExecError {
    /// Returns true for session-level failures (as opposed to command failures)
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Session { .. } | Self::AuthenticationRejected { .. } | Self::Timeout { .. }
        )
    }

    /// Hostname the error refers to
    #[must_use]
    pub fn host(&self) -> &str {
        match self {
            Self::Session { host, .. }
            | Self::AuthenticationRejected { host, .. }
            | Self::Timeout { host, .. }
            | Self::CommandFailed { host, .. }
            | Self::NoOutput { host, .. } => host,
        }
    }
}

/// Result type for remote execution
pub type ExecResult<T> = Result<T, ExecError>;

/// Runs a command on a remote host.
///
/// Implementations must bound the call in time: a stalled remote command
/// has to surface as [`ExecError::Timeout`] rather than block the cycle.
#[async_trait]
pub trait RemoteExecutor: Send + Sync {
    /// Opens a session to `target`, runs `command` and returns its stdout.
    ///
    /// # Errors
    ///
    /// Returns an [`ExecError`] describing the session or command failure.
    async fn execute(&self, target: &ServerTarget, command: &str) -> ExecResult<String>;
}
