//! Tracing subscriber setup.
//!
//! Logs go to stderr so stdout carries only reports.

use clap::ValueEnum;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Crate log level accepted by `--log-level`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn directive(self) -> &'static str {
        match self {
            LogLevel::Error => "aerodromes=error",
            LogLevel::Warn => "aerodromes=warn",
            LogLevel::Info => "aerodromes=info",
            LogLevel::Debug => "aerodromes=debug",
            LogLevel::Trace => "aerodromes=trace",
        }
    }
}

/// Install the global subscriber. `RUST_LOG` wins over `level` when set.
///
/// Calling this twice is harmless; the second install is ignored.
pub fn init_logging(level: LogLevel, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.directive()));

    let registry = tracing_subscriber::registry().with(filter);
    let result = match format {
        LogFormat::Text => registry
            .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
            .try_init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init(),
    };
    // A subscriber is already installed (tests, embedding); keep it.
    let _ = result;
}
