use std::fs;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initializes the logging system with both console and file output.
///
/// The returned guard flushes the file writer when dropped, so the caller
/// keeps it alive for the lifetime of the process.
pub fn init_logging(log_dir: &Path) -> Option<WorkerGuard> {
    // File logging is best-effort; console logging always works
    let file = match fs::create_dir_all(log_dir) {
        Ok(()) => {
            let file_appender = tracing_appender::rolling::daily(log_dir, "monitor.log");
            Some(tracing_appender::non_blocking(file_appender))
        }
        Err(e) => {
            eprintln!("Could not create log directory {}: {}", log_dir.display(), e);
            None
        }
    };

    let (file_layer, guard) = match file {
        Some((writer, guard)) => (Some(fmt::layer().json().with_writer(writer)), Some(guard)),
        None => (None, None),
    };

    let console_layer = fmt::layer().with_target(false).with_writer(std::io::stderr);

    // Respect RUST_LOG if set; otherwise info for our crate
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("social_monitor=info,warn"));

    // try_init so tests or embedding callers that already installed a subscriber are left alone
    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(console_layer)
        .try_init();

    guard
}
