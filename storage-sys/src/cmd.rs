// SPDX-License-Identifier: GPL-3.0-only

use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tokio::time::timeout;
use tracing::debug;

use crate::{InquiryError, Result};

pub fn render(command: &str, args: &[&str]) -> String {
    if args.is_empty() {
        command.to_string()
    } else {
        format!("{} {}", command, args.join(" "))
    }
}

/// Whether the current process runs with root privileges.
pub fn is_privileged() -> bool {
    unsafe { libc::geteuid() == 0 }
}

/// Run a read-only command to completion on a current-thread runtime.
///
/// See [`output`] for the error mapping.
pub fn run(command: &str, args: &[&str], limit: Option<Duration>) -> Result<String> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|error| InquiryError::CommandFailed {
            command: render(command, args),
            stderr: format!("failed to start probe runtime: {error}"),
        })?;

    runtime.block_on(output(command, args, limit))
}

/// Run a read-only command and return its stdout.
///
/// Output is collected while the command runs, so a large report never
/// stalls on a full pipe. When `limit` expires the child is killed. A zero
/// exit status with whitespace-only output is an `EmptyResult`.
pub async fn output(command: &str, args: &[&str], limit: Option<Duration>) -> Result<String> {
    let rendered = render(command, args);

    let program = which::which(command).map_err(|_| InquiryError::CommandFailed {
        command: rendered.clone(),
        stderr: format!("{command} not found in PATH"),
    })?;

    let mut probe = Command::new(program);
    probe.args(args).stdin(Stdio::null()).kill_on_drop(true);

    let result = match limit {
        Some(limit) => timeout(limit, probe.output())
            .await
            .map_err(|_| InquiryError::Timeout {
                command: rendered.clone(),
                seconds: limit.as_secs(),
            })?,
        None => probe.output().await,
    };

    let output = result.map_err(|error| InquiryError::CommandFailed {
        command: rendered.clone(),
        stderr: error.to_string(),
    })?;

    if !output.status.success() {
        return Err(InquiryError::CommandFailed {
            command: rendered,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    debug!(command = %rendered, bytes = stdout.len(), "probe completed");

    if stdout.trim().is_empty() {
        return Err(InquiryError::EmptyResult { command: rendered });
    }

    Ok(stdout)
}
