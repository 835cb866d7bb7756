use std::fmt;

/// Free-text request from the user. Never rewritten after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    raw: String,
}

impl Task {
    pub fn new(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl From<&str> for Task {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for Task {
    fn from(raw: String) -> Self {
        Self::new(raw)
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
