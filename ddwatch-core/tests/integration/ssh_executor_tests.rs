//! `SshExecutor` against stand-in client scripts
//!
//! Each script receives the same arguments `ssh` would and plays one
//! behaviour of a remote session.

use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use ddwatch_core::remote::{ExecError, RemoteExecutor, SshExecutor};
use tempfile::TempDir;

use super::support::target;

/// Writes an executable shell script and returns its path
fn client(dir: &TempDir, body: &str) -> PathBuf {
    let path = dir.path().join("ssh");
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

fn executor(program: PathBuf) -> SshExecutor {
    SshExecutor::new()
        .with_sshpass(false)
        .with_program(program)
        .command_timeout(Duration::from_secs(1))
}

#[tokio::test]
async fn test_stdout_returned_and_command_is_last_argument() {
    let dir = TempDir::new().unwrap();
    let program = client(&dir, "for last; do :; done\necho \"ran: $last\"");

    let output = executor(program)
        .execute(&target(1, "dd-a"), "df -h")
        .await
        .unwrap();
    assert_eq!(output.trim(), "ran: df -h");
}

#[tokio::test]
async fn test_stalled_command_times_out() {
    let dir = TempDir::new().unwrap();
    let program = client(&dir, "sleep 20");

    let started = Instant::now();
    let err = executor(program)
        .execute(&target(1, "dd-a"), "df -h")
        .await
        .unwrap_err();

    assert!(started.elapsed() < Duration::from_secs(10));
    match err {
        ExecError::Timeout { host, address, secs } => {
            assert_eq!(host, "dd-a");
            assert_eq!(address, "10.20.0.1");
            assert_eq!(secs, 1);
        }
        other => panic!("expected timeout, got {other:?}"),
    }
}

#[tokio::test]
async fn test_empty_output_is_no_output() {
    let dir = TempDir::new().unwrap();
    let program = client(&dir, "printf '  \\n'\nexit 0");

    let err = executor(program)
        .execute(&target(2, "dd-b"), "df -h")
        .await
        .unwrap_err();
    assert!(matches!(err, ExecError::NoOutput { ref host, .. } if host == "dd-b"));
}

#[tokio::test]
async fn test_remote_exit_status_is_command_failure() {
    let dir = TempDir::new().unwrap();
    let program = client(&dir, "echo 'df: /data: not mounted' >&2\nexit 3");

    let err = executor(program)
        .execute(&target(3, "dd-c"), "df -h")
        .await
        .unwrap_err();
    assert_eq!(
        err,
        ExecError::CommandFailed {
            host: "dd-c".to_string(),
            address: "10.20.0.3".to_string(),
            code: 3,
            stderr: "df: /data: not mounted".to_string(),
        }
    );
    assert!(!err.is_transport());
}

#[tokio::test]
async fn test_permission_denied_is_authentication_rejected() {
    let dir = TempDir::new().unwrap();
    let denied = client(
        &dir,
        "echo 'sysadmin@10.20.0.4: Permission denied (publickey).' >&2\nexit 255",
    );

    let err = executor(denied)
        .execute(&target(4, "dd-d"), "df -h")
        .await
        .unwrap_err();
    assert!(matches!(err, ExecError::AuthenticationRejected { .. }));
    assert!(err.is_transport());
}

#[tokio::test]
async fn test_missing_client_is_session_error() {
    let dir = TempDir::new().unwrap();

    let err = executor(dir.path().join("no-such-ssh"))
        .execute(&target(5, "dd-e"), "df -h")
        .await
        .unwrap_err();
    assert!(matches!(err, ExecError::Session { ref reason, .. } if reason.contains("spawn")));
}
