//! Tracing setup.
//!
//! Logs go to stderr so stdout only ever carries the rendered response.
//!
//! - `LOG_LEVEL`: ERROR, WARN, INFO, DEBUG, TRACE (default WARN)
//! - `LOG_FORMAT`: compact, pretty, json (default compact)
//! - `RUST_LOG`: overrides the filter entirely

use std::env;

use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
    Compact,
}

impl LogFormat {
    /// Unknown values fall back to compact.
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => LogFormat::Json,
            "pretty" => LogFormat::Pretty,
            _ => LogFormat::Compact,
        }
    }
}

/// Unknown values fall back to WARN.
pub fn parse_level(s: &str) -> Level {
    s.parse().unwrap_or(Level::WARN)
}

pub fn init_logging(level: Level, format: LogFormat) {
    let filter = env::var("RUST_LOG")
        .ok()
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(level.to_string()));

    let registry = tracing_subscriber::registry().with(filter);
    let result = match format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init(),
        LogFormat::Pretty => registry
            .with(fmt::layer().pretty().with_writer(std::io::stderr))
            .try_init(),
        LogFormat::Compact => registry
            .with(fmt::layer().compact().with_target(false).with_writer(std::io::stderr))
            .try_init(),
    };
    if let Err(e) = result {
        eprintln!("logging already initialized: {e}");
    }
}

/// Configure from `LOG_LEVEL` / `LOG_FORMAT`.
pub fn init_from_env() {
    let level = env::var("LOG_LEVEL")
        .map(|s| parse_level(&s))
        .unwrap_or(Level::WARN);
    let format = env::var("LOG_FORMAT")
        .map(|s| LogFormat::parse(&s))
        .unwrap_or(LogFormat::Compact);
    init_logging(level, format);
}
