use anyhow::Result;
use std::io;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::{self, time::ChronoUtc};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Verbosity filter for the console: 0 = info, 1 = debug, 2+ = trace
fn console_filter(verbose_level: u8, quiet: bool) -> EnvFilter {
    if quiet {
        return EnvFilter::new("error");
    }
    let default = match verbose_level {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// The run log keeps at least INFO whatever the console shows
fn run_log_level(verbose_level: u8) -> LevelFilter {
    match verbose_level {
        0 => LevelFilter::INFO,
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

fn console_layer(filter: EnvFilter, json: bool) -> BoxedLayer {
    if json {
        fmt::layer()
            .json()
            .with_timer(ChronoUtc::rfc_3339())
            .with_writer(io::stderr)
            .with_filter(filter)
            .boxed()
    } else {
        fmt::layer()
            .with_timer(ChronoUtc::rfc_3339())
            .with_writer(io::stderr)
            .with_filter(filter)
            .boxed()
    }
}

fn run_log_layer(log_path: &Path, json: bool, level: LevelFilter) -> Result<BoxedLayer> {
    let log_dir = log_path
        .parent()
        .ok_or_else(|| anyhow::anyhow!("Log file path has no parent directory"))?;
    std::fs::create_dir_all(log_dir)?;
    let log_filename = log_path
        .file_name()
        .ok_or_else(|| anyhow::anyhow!("Invalid log filename"))?;

    let file_appender = RollingFileAppender::new(Rotation::NEVER, log_dir, log_filename);

    let layer = if json {
        fmt::layer()
            .json()
            .with_timer(ChronoUtc::rfc_3339())
            .with_writer(file_appender)
            .with_filter(level)
            .boxed()
    } else {
        fmt::layer()
            .with_timer(ChronoUtc::rfc_3339())
            .with_ansi(false)
            .with_writer(file_appender)
            .with_filter(level)
            .boxed()
    };
    Ok(layer)
}

/// Install the global subscriber
///
/// Events go to stderr and, when `log_file` is given, also to that file.
/// The run log is a single file per run, never rotated and never colored,
/// so a later `retry` can read it back. `quiet` only silences the console.
pub fn init_logging(verbose_level: u8, quiet: bool, log_file: Option<PathBuf>) -> Result<()> {
    let json = std::env::var("RUST_LOG_JSON")
        .map(|v| v == "true")
        .unwrap_or_else(|_| !io::stdout().is_terminal());

    let mut layers: Vec<BoxedLayer> = vec![console_layer(console_filter(verbose_level, quiet), json)];

    if let Some(log_path) = log_file {
        layers.push(run_log_layer(&log_path, json, run_log_level(verbose_level))?);
    }

    Registry::default().with(layers).init();

    Ok(())
}
