//! Running a specialist as a child process.
//!
//! Command templates may use these placeholders, expanded in a single pass
//! so text inside the task is never re-expanded:
//!
//! | placeholder  | value                                      |
//! |--------------|--------------------------------------------|
//! | `{task}`     | the raw task text                          |
//! | `{limit}`    | [`extract_limit`]                          |
//! | `{coverage}` | [`extract_coverage`]                       |
//! | `{tier}`     | [`extract_tier`]                           |
//! | `{dir}`      | the installation directory                 |
//!
//! A relative program path containing a separator (`bin/scanner`) is
//! resolved against the installation directory; a bare name (`python3`) is
//! looked up on `PATH`.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::LazyLock;

use async_trait::async_trait;
use regex::{Captures, Regex};
use tokio::process::Command;
use tracing::debug;

use super::{Delivery, DispatchResult, Transport, Via, tail};
use crate::consts::DEFAULT_OUTPUT_TAIL_CHARS;
use crate::error::DispatchError;
use crate::params::{extract_coverage, extract_limit, extract_tier};
use crate::registry::{Specialist, TransportKind};
use crate::task::Task;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{(task|limit|coverage|tier|dir)\}").unwrap());

/// Spawns specialists with piped output and `kill_on_drop`, so a timed-out
/// invocation takes its process with it.
#[derive(Debug, Clone)]
pub struct SubprocessTransport {
    base_dir: PathBuf,
    tail_chars: usize,
}

impl SubprocessTransport {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            tail_chars: DEFAULT_OUTPUT_TAIL_CHARS,
        }
    }

    /// Bound on characters kept from stdout (and from stderr on failure).
    pub fn with_tail_chars(mut self, tail_chars: usize) -> Self {
        self.tail_chars = tail_chars;
        self
    }

    /// Expand placeholders in every element of `command`.
    pub fn expand(&self, command: &[String], task: &Task) -> Vec<String> {
        let raw = task.as_str();
        let dir = self.base_dir.to_string_lossy();
        command
            .iter()
            .map(|arg| {
                PLACEHOLDER
                    .replace_all(arg, |caps: &Captures| match &caps[1] {
                        "task" => raw.to_string(),
                        "limit" => extract_limit(raw).to_string(),
                        "coverage" => extract_coverage(raw).to_string(),
                        "tier" => extract_tier(raw).to_string(),
                        _ => dir.to_string(),
                    })
                    .into_owned()
            })
            .collect()
    }

    pub fn resolve_program(&self, program: &str) -> PathBuf {
        let path = Path::new(program);
        if path.is_absolute() || path.components().count() <= 1 {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }
}

#[async_trait]
impl Transport for SubprocessTransport {
    async fn invoke(&self, specialist: &Specialist, task: &Task) -> DispatchResult {
        let TransportKind::Subprocess { command } = &specialist.transport else {
            return Err(DispatchError::transport(format!(
                "{} is not a subprocess specialist",
                specialist.label
            )));
        };

        let argv = self.expand(command, task);
        let Some((program, args)) = argv.split_first() else {
            return Err(DispatchError::transport("empty command"));
        };
        let program = self.resolve_program(program);
        debug!(program = %program.display(), ?args, "spawning specialist");

        let child = Command::new(&program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                DispatchError::transport(format!("cannot start {}: {e}", program.display()))
            })?;

        let output = child.wait_with_output().await.map_err(|e| {
            DispatchError::transport(format!("lost {}: {e}", program.display()))
        })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        if output.status.success() {
            let body = stdout.trim_end();
            return Ok(Delivery {
                output: tail(body, self.tail_chars),
                total_chars: body.chars().count(),
                via: Via::Subprocess,
            });
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        let context = if stderr.trim().is_empty() {
            stdout.trim_end()
        } else {
            stderr.trim_end()
        };
        Err(DispatchError::NonZeroExit {
            code: output.status.code(),
            stderr: tail(context, self.tail_chars),
        })
    }
}
