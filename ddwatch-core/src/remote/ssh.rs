//! SSH command execution
//!
//! Runs commands through the system `ssh` client (or `sshpass -e ssh` for
//! password-authenticated targets). Every call spawns its own process, so
//! every call is its own session; the child is killed if the call times out
//! or its future is dropped.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use tokio::process::Command;

use super::{ExecError, ExecResult, RemoteExecutor};
use crate::models::ServerTarget;

/// Default TCP/SSH handshake timeout (seconds)
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Default limit for a whole remote call, handshake included (seconds)
pub const DEFAULT_COMMAND_TIMEOUT_SECS: u64 = 30;

/// Exit status `ssh` uses for its own errors
pub const SSH_SESSION_FAILURE_EXIT: i32 = 255;

/// Client program run for every session
pub const DEFAULT_SSH_PROGRAM: &str = "ssh";

/// `sshpass` exit status for a rejected password
const SSHPASS_BAD_PASSWORD_EXIT: i32 = 5;

/// `sshpass` exit status for an unknown host key
const SSHPASS_HOST_KEY_UNKNOWN_EXIT: i32 = 6;

/// [`RemoteExecutor`] backed by the system OpenSSH client
#[derive(Debug, Clone)]
pub struct SshExecutor {
    program: PathBuf,
    connect_timeout: Duration,
    command_timeout: Duration,
    sshpass_available: bool,
}

impl SshExecutor {
    /// Creates an executor with default timeouts.
    ///
    /// Checks once whether `sshpass` is installed.
    #[must_use]
    pub fn new() -> Self {
        let sshpass_available = std::process::Command::new("sshpass")
            .arg("-V")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .is_ok();

        if !sshpass_available {
            tracing::debug!("sshpass not found, password targets will fail to authenticate");
        }

        Self {
            program: PathBuf::from(DEFAULT_SSH_PROGRAM),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            command_timeout: Duration::from_secs(DEFAULT_COMMAND_TIMEOUT_SECS),
            sshpass_available,
        }
    }

    /// Uses another OpenSSH-compatible client instead of `ssh` from `PATH`
    #[must_use]
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    /// Sets the handshake timeout
    #[must_use]
    pub const fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets the limit for a whole call
    #[must_use]
    pub const fn command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = timeout;
        self
    }

    /// Overrides `sshpass` detection
    #[must_use]
    pub const fn with_sshpass(mut self, available: bool) -> Self {
        self.sshpass_available = available;
        self
    }

    /// Gets the handshake timeout
    #[must_use]
    pub const fn get_connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    /// Gets the call timeout
    #[must_use]
    pub const fn get_command_timeout(&self) -> Duration {
        self.command_timeout
    }

    fn uses_sshpass(&self, target: &ServerTarget) -> bool {
        self.sshpass_available && target.has_password()
    }

    /// Builds the `ssh` invocation for `command` on `target`
    #[must_use]
    pub fn build_command(&self, target: &ServerTarget, command: &str) -> Command {
        let mut cmd;

        if self.uses_sshpass(target) {
            cmd = Command::new("sshpass");
            cmd.arg("-e").arg(&self.program);
            // sshpass -e reads the password from SSHPASS
            if let Some(ref password) = target.password {
                cmd.env("SSHPASS", password.expose_secret());
            }
            cmd.arg("-o").arg("NumberOfPasswordPrompts=1");
        } else {
            cmd = Command::new(&self.program);
            cmd.arg("-o").arg("BatchMode=yes");
        }

        cmd.arg("-o").arg("StrictHostKeyChecking=no");
        cmd.arg("-o").arg("LogLevel=ERROR");
        cmd.arg("-o")
            .arg(format!("ConnectTimeout={}", self.connect_timeout.as_secs().max(1)));
        cmd.arg("-p").arg(target.port.to_string());
        cmd.arg("-l").arg(&target.username);
        cmd.arg(&target.address);
        cmd.arg(command);

        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        cmd.kill_on_drop(true);
        cmd
    }
}

impl Default for SshExecutor {
    fn default() -> Self {
        Self::new()
    }
}

/// Maps a non-zero exit of the `ssh` process to an [`ExecError`].
///
/// `ssh` reserves 255 for its own failures; `sshpass` adds 5 (bad password)
/// and 6 (unknown host key). Any other status belongs to the remote command.
#[must_use]
pub fn classify_exit(
    target: &ServerTarget,
    code: Option<i32>,
    stderr: &str,
    via_sshpass: bool,
) -> ExecError {
    let host = target.hostname.clone();
    let address = target.address.clone();

    match code {
        None => ExecError::Session {
            host,
            address,
            reason: "ssh terminated by signal".to_string(),
        },
        Some(SSHPASS_BAD_PASSWORD_EXIT) if via_sshpass => {
            ExecError::AuthenticationRejected { host, address }
        }
        Some(SSHPASS_HOST_KEY_UNKNOWN_EXIT) if via_sshpass => ExecError::Session {
            host,
            address,
            reason: "host public key is unknown".to_string(),
        },
        Some(SSH_SESSION_FAILURE_EXIT) => {
            if stderr.contains("Permission denied") {
                ExecError::AuthenticationRejected { host, address }
            } else {
                let reason = if stderr.is_empty() {
                    format!("ssh exited with status {SSH_SESSION_FAILURE_EXIT}")
                } else {
                    stderr.to_string()
                };
                ExecError::Session {
                    host,
                    address,
                    reason,
                }
            }
        }
        Some(code) => ExecError::CommandFailed {
            host,
            address,
            code,
            stderr: stderr.to_string(),
        },
    }
}

#[async_trait]
impl RemoteExecutor for SshExecutor {
    async fn execute(&self, target: &ServerTarget, command: &str) -> ExecResult<String> {
        let via_sshpass = self.uses_sshpass(target);
        if target.has_password() && !via_sshpass {
            tracing::warn!(
                host = %target.hostname,
                "Password configured but sshpass is unavailable, trying key authentication"
            );
        }

        let mut cmd = self.build_command(target, command);
        tracing::debug!(
            host = %target.hostname,
            address = %target.address,
            port = target.port,
            command,
            "Opening SSH session"
        );

        let output = match tokio::time::timeout(self.command_timeout, cmd.output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                return Err(ExecError::Session {
                    host: target.hostname.clone(),
                    address: target.address.clone(),
                    reason: format!("failed to spawn ssh: {e}"),
                });
            }
            Err(_) => {
                return Err(ExecError::Timeout {
                    host: target.hostname.clone(),
                    address: target.address.clone(),
                    secs: self.command_timeout.as_secs(),
                });
            }
        };

        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        if !output.status.success() {
            return Err(classify_exit(
                target,
                output.status.code(),
                &stderr,
                via_sshpass,
            ));
        }

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        if stdout.trim().is_empty() {
            return Err(ExecError::NoOutput {
                host: target.hostname.clone(),
                address: target.address.clone(),
            });
        }

        tracing::debug!(host = %target.hostname, bytes = stdout.len(), "Remote command finished");
        Ok(stdout)
    }
}
