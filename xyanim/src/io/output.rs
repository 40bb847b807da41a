//! Logging setup

use std::fmt;
use std::fs::File;
use std::time::SystemTime as StdSystemTime;
use tracing::info;
use tracing_subscriber::{
    fmt::format::Writer, fmt::layer, fmt::time::FormatTime, layer::SubscriberExt,
    util::SubscriberInitExt, Registry,
};

/// Wall-clock timestamps at whole-second resolution
struct SecondPrecisionTimer;

impl FormatTime for SecondPrecisionTimer {
    fn format_time(&self, w: &mut Writer<'_>) -> fmt::Result {
        let total_seconds = StdSystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();

        let hours = (total_seconds / 3600) % 24;
        let minutes = (total_seconds / 60) % 60;
        let seconds = total_seconds % 60;

        write!(w, "{:02}:{:02}:{:02}", hours, minutes, seconds)
    }
}

/// Send the log to `log_path`, or to stdout when no path is given or the
/// file cannot be created.
pub fn setup_output(log_path: Option<&String>) {
    match log_path.and_then(|path| open_log_file(path).map(|log| (path, log))) {
        Some((path, log)) => {
            let file_layer = layer()
                .with_writer(log)
                .with_timer(SecondPrecisionTimer)
                .with_ansi(false);
            Registry::default().with(file_layer).init();
            info!("Log will be written to: {}", path);
        }
        None => {
            let stdout_layer = layer()
                .with_writer(std::io::stdout)
                .with_timer(SecondPrecisionTimer)
                .with_ansi(true);
            Registry::default().with(stdout_layer).init();
            info!("Log will be printed to stdout");
        }
    }
}

fn open_log_file(path: &str) -> Option<File> {
    match File::create(path) {
        Ok(log) => Some(log),
        Err(e) => {
            eprintln!("Could not create log file {}: {}; logging to stdout", path, e);
            None
        }
    }
}
