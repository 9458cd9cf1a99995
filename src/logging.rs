//! Logging setup.
//!
//! The terminal belongs to the UI, so nothing is written to stdout/stderr.
//! On Linux events go to systemd-journald; elsewhere, or when the journal
//! is unreachable, they go to a daily rolling file.

use anyhow::Result;
use std::path::PathBuf;
use std::sync::OnceLock;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log filter, e.g. `CAMLABEL_LOG=camlabel=debug`.
pub const LOG_ENV: &str = "CAMLABEL_LOG";

static GUARD: OnceLock<WorkerGuard> = OnceLock::new();

pub fn init(log_dir: Option<PathBuf>) -> Result<()> {
    let env_filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));

    #[cfg(target_os = "linux")]
    {
        if let Ok(journald_layer) = tracing_journald::layer() {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(journald_layer.with_syslog_identifier("camlabel".to_string()))
                .try_init()?;

            tracing::info!("Logging to journald");
            return Ok(());
        }
    }

    let log_dir = log_dir.unwrap_or_else(default_log_dir);
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = tracing_appender::rolling::daily(&log_dir, "camlabel.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    // Dropping the guard stops the writer thread.
    let _ = GUARD.set(guard);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .try_init()?;

    tracing::info!(dir = %log_dir.display(), "Logging to file");
    Ok(())
}

pub fn default_log_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("camlabel")
        .join("logs")
}
