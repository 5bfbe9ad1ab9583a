// SPDX-License-Identifier: GPL-3.0-only

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::{Duration, SystemTime};

use anyhow::Context;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::VerifierConfig;

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

const LOG_PREFIX: &str = "storage-verify.log";
const LOG_DIR_ENV: &str = "STORAGE_VERIFY_LOG_DIR";

/// Install the global subscriber. Stdout is left to the report, so console
/// logs go to stderr; daily files are added when a log directory is set.
pub fn init(config: &VerifierConfig) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.as_directive()));

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true);

    let file = resolve_log_dir(config).and_then(|dir| {
        daily_log_writer(&dir, config.log_retention())
            .inspect_err(|e| eprintln!("storage-verify: file logging disabled: {e:#}"))
            .ok()
    });

    let (file_layer, pruned) = match file {
        Some((writer, guard, pruned)) => {
            // Flushes on drop, so it lives as long as the process.
            let _ = LOG_GUARD.set(guard);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_target(true)
                .with_ansi(false);
            (Some(layer), pruned)
        }
        None => (None, 0),
    };

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init();

    if pruned > 0 {
        tracing::debug!(pruned, "removed expired log files");
    }
}

fn resolve_log_dir(config: &VerifierConfig) -> Option<PathBuf> {
    config
        .log_dir
        .clone()
        .or_else(|| std::env::var_os(LOG_DIR_ENV).map(PathBuf::from))
}

/// Daily rolling writer in `dir`, after pruning files past `retention`.
fn daily_log_writer(
    dir: &Path,
    retention: Option<Duration>,
) -> anyhow::Result<(NonBlocking, WorkerGuard, usize)> {
    fs::create_dir_all(dir)
        .with_context(|| format!("create log directory {}", dir.display()))?;

    let pruned = retention.map_or(0, |age| prune_logs(dir, age, SystemTime::now()));
    let (writer, guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::daily(dir, LOG_PREFIX));

    Ok((writer, guard, pruned))
}

/// Remove our own log files last modified more than `retention` before `now`.
/// Returns how many were removed.
fn prune_logs(dir: &Path, retention: Duration, now: SystemTime) -> usize {
    let Some(cutoff) = now.checked_sub(retention) else {
        return 0;
    };
    let Ok(entries) = fs::read_dir(dir) else {
        return 0;
    };

    entries
        .flatten()
        .filter(|entry| entry.file_name().to_string_lossy().starts_with(LOG_PREFIX))
        .filter(|entry| {
            entry
                .metadata()
                .ok()
                .filter(fs::Metadata::is_file)
                .and_then(|metadata| metadata.modified().ok())
                .is_some_and(|modified| modified < cutoff)
        })
        .filter(|entry| fs::remove_file(entry.path()).is_ok())
        .count()
}
