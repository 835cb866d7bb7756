//! The ordered table of specialists a task can be routed to.
//!
//! Order matters: the classifier walks specialists front to back and the
//! first keyword hit wins, so registry order is precedence order.

use std::time::Duration;

use crate::consts::{DEFAULT_SUBPROCESS_TIMEOUT, SCAN_TIMEOUT};
use crate::error::ConfigError;

/// How a specialist is invoked.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportKind {
    /// Spawn a process. `command[0]` is the program, the rest are args;
    /// see [`crate::dispatch::subprocess`] for placeholder expansion.
    Subprocess { command: Vec<String> },
    /// Send to a managed worker session addressed by the specialist label.
    ChannelSend { thinking: String },
}

impl TransportKind {
    pub fn name(&self) -> &'static str {
        match self {
            TransportKind::Subprocess { .. } => "subprocess",
            TransportKind::ChannelSend { .. } => "channel",
        }
    }
}

/// A named handler for one class of task.
#[derive(Debug, Clone, PartialEq)]
pub struct Specialist {
    pub label: String,
    pub name: String,
    /// Lower-cased, deduplicated, in configured order.
    pub keywords: Vec<String>,
    pub transport: TransportKind,
    pub timeout: Duration,
}

impl Specialist {
    pub fn new<I, S>(
        label: impl Into<String>,
        name: impl Into<String>,
        keywords: I,
        transport: TransportKind,
        timeout: Duration,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            label: label.into(),
            name: name.into(),
            keywords: normalize_keywords(keywords),
            transport,
            timeout,
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.label.trim().is_empty() {
            return Err(ConfigError::invalid("", "label must not be empty"));
        }
        if self.keywords.is_empty() {
            return Err(ConfigError::invalid(&self.label, "at least one keyword is required"));
        }
        if self.keywords.iter().any(|k| k.trim().is_empty()) {
            return Err(ConfigError::invalid(&self.label, "keywords must not be empty"));
        }
        if self.timeout.is_zero() {
            return Err(ConfigError::invalid(&self.label, "timeout must be positive"));
        }
        if let TransportKind::Subprocess { command } = &self.transport
            && command.first().is_none_or(|program| program.trim().is_empty())
        {
            return Err(ConfigError::invalid(&self.label, "command must name a program"));
        }
        Ok(())
    }
}

fn normalize_keywords<I, S>(keywords: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut ordered: Vec<String> = Vec::new();
    for keyword in keywords {
        let keyword = keyword.as_ref().to_lowercase();
        if !ordered.contains(&keyword) {
            ordered.push(keyword);
        }
    }
    ordered
}

/// Immutable after construction; share it behind an `Arc`.
#[derive(Debug, Clone)]
pub struct SpecialistRegistry {
    specialists: Vec<Specialist>,
}

impl SpecialistRegistry {
    /// Build a registry, rejecting duplicate labels and malformed entries.
    /// Keywords are lower-cased and deduplicated here as well as in
    /// [`Specialist::new`].
    pub fn new(mut specialists: Vec<Specialist>) -> Result<Self, ConfigError> {
        for specialist in &mut specialists {
            specialist.keywords = normalize_keywords(std::mem::take(&mut specialist.keywords));
        }
        for (i, specialist) in specialists.iter().enumerate() {
            specialist.validate()?;
            if specialists[..i].iter().any(|s| s.label == specialist.label) {
                return Err(ConfigError::invalid(&specialist.label, "duplicate label"));
            }
        }
        Ok(Self { specialists })
    }

    /// The fallback table used when no usable config is found.
    ///
    /// Precedence is hedge → code review → research. "analyze code" goes to
    /// the code reviewer, and "research test runners" does too because
    /// `test` belongs to an earlier entry.
    pub fn builtin() -> Self {
        Self {
            specialists: vec![
                Specialist::new(
                    "hedge-specialist",
                    "Hedge Specialist",
                    ["hedge", "market", "polymarket", "trading", "scan"],
                    TransportKind::Subprocess {
                        command: vec![
                            "{dir}/hedge_test".into(),
                            "scan".into(),
                            "--limit".into(),
                            "{limit}".into(),
                        ],
                    },
                    SCAN_TIMEOUT,
                ),
                Specialist::new(
                    "code-reviewer",
                    "Code Reviewer",
                    ["code", "review", "bug", "quality", "refactor", "test"],
                    TransportKind::Subprocess {
                        command: vec![
                            "{dir}/code_reviewer".into(),
                            "--task".into(),
                            "{task}".into(),
                        ],
                    },
                    DEFAULT_SUBPROCESS_TIMEOUT,
                ),
                Specialist::new(
                    "researcher",
                    "Researcher",
                    ["research", "find", "search", "analyze", "competitor"],
                    TransportKind::Subprocess {
                        command: vec![
                            "{dir}/researcher".into(),
                            "--task".into(),
                            "{task}".into(),
                        ],
                    },
                    DEFAULT_SUBPROCESS_TIMEOUT,
                ),
            ],
        }
    }

    pub fn get(&self, label: &str) -> Option<&Specialist> {
        self.specialists.iter().find(|s| s.label == label)
    }

    /// Specialists in precedence order.
    pub fn iter(&self) -> impl Iterator<Item = &Specialist> {
        self.specialists.iter()
    }

    pub fn labels(&self) -> Vec<&str> {
        self.specialists.iter().map(|s| s.label.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.specialists.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specialists.is_empty()
    }
}
