//! Logging setup
//!
//! Nothing is installed globally. [`build_subscriber`] returns a subscriber
//! that the binary runs the check under with
//! [`tracing::subscriber::with_default`]; library components log to the span
//! they were handed.

use std::fs::{self, OpenOptions};
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing::Subscriber;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt};

use crate::error::{CheckError, Result};

/// How much the console shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Verbosity {
    /// Warnings and errors.
    #[default]
    Quiet,
    Verbose,
    Debug,
}

impl Verbosity {
    pub fn level(&self) -> LevelFilter {
        match self {
            Verbosity::Quiet => LevelFilter::WARN,
            Verbosity::Verbose => LevelFilter::INFO,
            Verbosity::Debug => LevelFilter::DEBUG,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LogOptions {
    pub verbosity: Verbosity,
    pub ansi: bool,
    /// Optional log file, written without color codes.
    pub file: Option<PathBuf>,
    pub file_level: LevelFilter,
}

impl Default for LogOptions {
    fn default() -> Self {
        Self {
            verbosity: Verbosity::default(),
            ansi: false,
            file: None,
            file_level: LevelFilter::INFO,
        }
    }
}

/// Build the console layer (stderr) and, when requested, the file layer.
///
/// `RUST_LOG` replaces the console level when set.
pub fn build_subscriber(options: &LogOptions) -> Result<impl Subscriber + Send + Sync> {
    let console_filter = EnvFilter::builder()
        .with_default_directive(options.verbosity.level().into())
        .from_env_lossy();
    let console = fmt::layer()
        .with_target(false)
        .with_ansi(options.ansi)
        .with_writer(io::stderr)
        .with_filter(console_filter);

    let file = match &options.file {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            let handle = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| {
                    CheckError::Config(format!("cannot open log file '{}': {}", path.display(), e))
                })?;
            Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_timer(ChronoLocal::rfc_3339())
                    .with_writer(Mutex::new(handle))
                    .with_filter(options.file_level),
            )
        }
        None => None,
    };

    Ok(Registry::default().with(console).with(file))
}
