use std::{fs, path::Path};

use tracing::{Level, subscriber::set_global_default};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{filter::Targets, fmt::format::FmtSpan, layer::SubscriberExt};

const LOG_FILE: &str = "log.txt";

/// Install the global subscriber, writing to stdout and, if `log_dir` is usable, a log file.
///
/// The returned guards flush the writers when dropped and must be held until exit.
pub fn setup_logger(debug: bool, log_dir: Option<&Path>) -> Vec<WorkerGuard> {
    let level = if debug { Level::DEBUG } else { Level::INFO };
    let filter = Targets::new()
        .with_default(level)
        .with_target("winit", Level::WARN);

    let mut guards = Vec::with_capacity(2);

    // stdout logger
    let (std_writer, std_guard) = tracing_appender::non_blocking(std::io::stdout());
    let std_logger = tracing_subscriber::fmt::layer()
        .with_writer(std_writer)
        .with_target(false)
        .with_span_events(FmtSpan::CLOSE);
    guards.push(std_guard);

    // file logger
    let file_logger = log_dir
        .and_then(|dir| {
            fs::create_dir_all(dir).ok()?;
            fs::File::create(dir.join(LOG_FILE)).ok()
        })
        .map(|file| {
            let (file_writer, file_guard) = tracing_appender::non_blocking(file);
            guards.push(file_guard);

            tracing_subscriber::fmt::layer()
                .with_writer(file_writer)
                .with_ansi(false)
                .with_target(false)
                .with_span_events(FmtSpan::CLOSE)
        });

    let collector = tracing_subscriber::registry()
        .with(std_logger)
        .with(file_logger)
        .with(filter);

    if let Err(error) = set_global_default(collector) {
        eprintln!("Could not install the logger: {error}");
    }

    guards
}
