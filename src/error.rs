//! Error types for config loading and specialist dispatch.
//!
//! Neither type ever escapes [`Orchestrator::handle`](crate::orchestrator::Orchestrator::handle):
//! config errors are recovered by falling back to the built-in profile, and
//! dispatch errors are rendered into the response text.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// The config document couldn't be turned into a profile.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid specialist `{label}`: {message}")]
    Invalid { label: String, message: String },
}

impl ConfigError {
    pub fn invalid(label: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Invalid {
            label: label.into(),
            message: message.into(),
        }
    }
}

/// Which branch a failed dispatch took. Stable across messages so callers
/// can match on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Timeout,
    NonZeroExit,
    TransportFailure,
    NotFound,
}

/// A dispatch that didn't produce a result.
#[derive(Debug, Clone, Error)]
pub enum DispatchError {
    #[error("timed out after {}s", .after.as_secs_f64())]
    Timeout { after: Duration },

    /// `code` is `None` when the process died from a signal or a channel
    /// session rejected the task. `stderr` carries whatever explanation the
    /// specialist gave.
    #[error("{}", exit_summary(.code))]
    NonZeroExit { code: Option<i32>, stderr: String },

    #[error("transport failure: {0}")]
    TransportFailure(String),

    #[error("no specialist available")]
    NotFound,
}

fn exit_summary(code: &Option<i32>) -> String {
    match code {
        Some(c) => format!("exited with status {c}"),
        None => "failed without an exit status".to_string(),
    }
}

impl DispatchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DispatchError::Timeout { .. } => ErrorKind::Timeout,
            DispatchError::NonZeroExit { .. } => ErrorKind::NonZeroExit,
            DispatchError::TransportFailure(_) => ErrorKind::TransportFailure,
            DispatchError::NotFound => ErrorKind::NotFound,
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::TransportFailure(message.into())
    }
}
