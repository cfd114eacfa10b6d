//! File logging for the `svcwatch` binary.
//!
//! The dashboard owns the terminal, so log records go to
//! `<tmp>/svcwatch/svcwatch.log` instead. Level comes from `RUST_LOG`
//! (default: warn).

use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;

const LOG_FILE: &str = "svcwatch.log";


/// Directory that receives the log file.
pub fn log_dir() -> PathBuf {
    std::env::temp_dir().join("svcwatch")
}


/// Install the global subscriber. Keep the returned guard alive until exit
/// so buffered records are flushed.
pub fn init(dir: &Path) -> Result<WorkerGuard, String> {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    std::fs::create_dir_all(dir)
        .map_err(|e| format!("cannot create log directory {}: {}", dir.display(), e))?;

    let file_appender = tracing_appender::rolling::never(dir, LOG_FILE);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .compact(),
        )
        .try_init()
        .map_err(|e| format!("cannot install logger: {}", e))?;

    Ok(guard)
}
