use std::{
    fs,
    path::{Path, PathBuf},
    time::{Duration, SystemTime},
};

use anyhow::{Context, Result, bail};
use tracing_appender::{
    non_blocking::WorkerGuard,
    rolling::{RollingFileAppender, Rotation},
};
use tracing_error::ErrorLayer;
use tracing_subscriber::{
    EnvFilter, Layer,
    filter::LevelFilter,
    fmt::{self, time::UtcTime},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};
use uuid::Uuid;

use crate::config::{LoggingConfig, LoggingRotation};

/// Overrides `logging.filter` for one run, e.g. `FOLIO_LOG=profile=debug`.
pub const LOG_FILTER_ENV: &str = "FOLIO_LOG";

const LOG_FILE_PREFIX: &str = "folio";
const LOG_FILE_SUFFIX: &str = "log";
const SECONDS_PER_DAY: u64 = 24 * 60 * 60;

/// Flushes the background log writer when dropped; keep it alive for the whole run.
pub struct LoggingGuard {
    _flush: WorkerGuard,
    run_id: String,
}

impl LoggingGuard {
    pub fn run_id(&self) -> &str {
        &self.run_id
    }
}

pub fn init_tracing(config: &LoggingConfig) -> Result<LoggingGuard> {
    let filter = effective_filter(&config.filter, std::env::var(LOG_FILTER_ENV).ok())?;
    if config.dir.as_os_str().is_empty() {
        bail!("logging.dir cannot be empty");
    }

    let log_dir = absolute_log_dir(&config.dir)?;
    fs::create_dir_all(&log_dir)
        .with_context(|| format!("failed to create log directory {}", log_dir.display()))?;
    let retention = LogRetention::days(config.retention_days).purge(&log_dir, SystemTime::now());

    let appender = RollingFileAppender::builder()
        .rotation(rotation_of(&config.rotation))
        .filename_prefix(LOG_FILE_PREFIX)
        .filename_suffix(LOG_FILE_SUFFIX)
        .build(&log_dir)
        .with_context(|| format!("failed to open log files under {}", log_dir.display()))?;
    let (writer, flush) = tracing_appender::non_blocking(appender);

    let json_file = fmt::layer()
        .json()
        .with_timer(UtcTime::rfc_3339())
        .with_target(true)
        .with_current_span(true)
        .with_span_list(false)
        .with_ansi(false)
        .with_writer(writer)
        .with_filter(parse_filter(&filter)?);
    let warnings_to_stderr = config.stderr_warn_enabled.then(|| {
        fmt::layer()
            .compact()
            .without_time()
            .with_writer(std::io::stderr)
            .with_filter(LevelFilter::WARN)
    });

    tracing_subscriber::registry()
        .with(ErrorLayer::default())
        .with(json_file)
        .with(warnings_to_stderr)
        .try_init()
        .context("failed to install tracing subscriber")?;

    let run_id = Uuid::now_v7().to_string();
    tracing::info!(
        target: "logging",
        run_id = %run_id,
        dir = %log_dir.display(),
        filter = %filter,
        rotation = ?config.rotation,
        removed_files = retention.removed,
        "logging_initialized"
    );
    for warning in &retention.warnings {
        tracing::warn!(target: "logging", warning = %warning, "log_retention_failed");
    }

    Ok(LoggingGuard {
        _flush: flush,
        run_id,
    })
}

/// A non-blank env override wins over the configured filter.
fn effective_filter(configured: &str, env_override: Option<String>) -> Result<String> {
    let chosen = env_override
        .map(|raw| raw.trim().to_string())
        .filter(|raw| !raw.is_empty())
        .unwrap_or_else(|| configured.trim().to_string());
    if chosen.is_empty() {
        bail!("logging.filter cannot be empty");
    }
    Ok(chosen)
}

fn parse_filter(filter: &str) -> Result<EnvFilter> {
    EnvFilter::try_new(filter).with_context(|| format!("invalid logging.filter '{filter}'"))
}

fn rotation_of(rotation: &LoggingRotation) -> Rotation {
    match rotation {
        LoggingRotation::Daily => Rotation::DAILY,
        LoggingRotation::Hourly => Rotation::HOURLY,
    }
}

fn absolute_log_dir(dir: &Path) -> Result<PathBuf> {
    if dir.is_absolute() {
        return Ok(dir.to_path_buf());
    }
    let cwd = std::env::current_dir().context("failed to resolve relative logging.dir")?;
    Ok(cwd.join(dir))
}

#[derive(Debug, Clone, Copy)]
struct LogRetention {
    max_age: Duration,
}

#[derive(Debug, Default)]
struct RetentionReport {
    removed: usize,
    warnings: Vec<String>,
}

impl LogRetention {
    fn days(days: usize) -> Self {
        let days = u64::try_from(days).unwrap_or(u64::MAX);
        Self {
            max_age: Duration::from_secs(days.saturating_mul(SECONDS_PER_DAY)),
        }
    }

    /// Rotated files look like `folio.2026-10-19.log` or `folio.2026-10-19-13.log`.
    fn owns(file_name: &str) -> bool {
        file_name
            .strip_prefix(LOG_FILE_PREFIX)
            .and_then(|rest| rest.strip_prefix('.'))
            .is_some_and(|rest| rest.ends_with(&format!(".{LOG_FILE_SUFFIX}")))
    }

    /// Deletes our log files last modified at or before `now - max_age`.
    /// Never fails; problems come back as warnings.
    fn purge(&self, dir: &Path, now: SystemTime) -> RetentionReport {
        let cutoff = now.checked_sub(self.max_age).unwrap_or(SystemTime::UNIX_EPOCH);
        let mut report = RetentionReport::default();

        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(err) => {
                report
                    .warnings
                    .push(format!("cannot list {}: {err}", dir.display()));
                return report;
            }
        };

        for entry in entries {
            let outcome = entry
                .map_err(|err| format!("cannot read entry in {}: {err}", dir.display()))
                .and_then(|entry| expire(&entry, cutoff));
            match outcome {
                Ok(true) => report.removed += 1,
                Ok(false) => {}
                Err(warning) => report.warnings.push(warning),
            }
        }
        report
    }
}

fn expire(entry: &fs::DirEntry, cutoff: SystemTime) -> Result<bool, String> {
    if !LogRetention::owns(&entry.file_name().to_string_lossy()) {
        return Ok(false);
    }

    let path = entry.path();
    let metadata = entry
        .metadata()
        .map_err(|err| format!("cannot stat {}: {err}", path.display()))?;
    if !metadata.is_file() {
        return Ok(false);
    }
    let modified = metadata
        .modified()
        .map_err(|err| format!("no mtime for {}: {err}", path.display()))?;
    if modified > cutoff {
        return Ok(false);
    }

    fs::remove_file(&path).map_err(|err| format!("cannot remove {}: {err}", path.display()))?;
    Ok(true)
}
