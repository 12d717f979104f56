use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Keeps the non-blocking file writer flushing until dropped at shutdown.
pub struct LogGuard {
    _worker: WorkerGuard,
}

fn file_logging_enabled() -> bool {
    std::env::var("ENABLE_FILE_LOGS")
        .map(|value| value == "true" || value == "1")
        .unwrap_or(false)
}

pub fn init_tracing(log_level: &str) -> Option<LogGuard> {
    let env_filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    let stdout_layer = fmt::layer().with_target(true);

    if file_logging_enabled() {
        let log_dir = std::env::var("LOG_DIR").unwrap_or_else(|_| "./logs".to_string());
        match std::fs::create_dir_all(&log_dir) {
            Err(err) => eprintln!("failed to create log directory {log_dir}: {err}"),
            Ok(()) => {
                let appender = RollingFileAppender::new(Rotation::DAILY, &log_dir, "typer-api.log");
                let (file_writer, worker) = tracing_appender::non_blocking(appender);
                let file_layer = fmt::layer()
                    .with_writer(file_writer)
                    .with_ansi(false)
                    .with_target(true);

                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(stdout_layer)
                    .with(file_layer)
                    .init();

                return Some(LogGuard { _worker: worker });
            }
        }
    }

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .init();

    None
}
