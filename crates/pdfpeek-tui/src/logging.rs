use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// Log directory: `<cache_dir>/pdfpeek/logs`.
pub fn log_dir() -> Option<PathBuf> {
    dirs::cache_dir().map(|d| d.join("pdfpeek").join("logs"))
}

/// Install a file-backed subscriber. The terminal belongs to the UI, so
/// nothing is written to stdout/stderr.
///
/// Returns the writer guard; dropping it flushes pending lines. `None` means
/// logging is disabled (no cache dir, or a subscriber was already set).
pub fn init() -> Option<WorkerGuard> {
    let dir = log_dir()?;
    std::fs::create_dir_all(&dir).ok()?;

    let appender = tracing_appender::rolling::daily(&dir, "pdfpeek.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("warn,pdfpeek_core=info,pdfpeek_mupdf=info,pdfpeek_tui=info")
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true),
        )
        .try_init()
        .ok()?;

    tracing::info!(dir = %dir.display(), "logging initialized");
    Some(guard)
}
