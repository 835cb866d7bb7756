//! Project-wide constants.

use std::path::PathBuf;
use std::time::Duration;

/// File name looked up next to the executable and under `~/.switchboard`.
pub const CONFIG_FILE_NAME: &str = "switchboard.json";

/// Subprocess timeout when a specialist doesn't set `timeout_seconds`.
pub const DEFAULT_SUBPROCESS_TIMEOUT: Duration = Duration::from_secs(60);

/// Market scans page through a lot of data; they get a longer leash.
pub const SCAN_TIMEOUT: Duration = Duration::from_secs(300);

/// Channel-send timeout when a specialist doesn't set `timeout_seconds`.
pub const DEFAULT_CHANNEL_TIMEOUT: Duration = Duration::from_secs(300);

/// Successful subprocess output keeps only this many trailing characters.
pub const DEFAULT_OUTPUT_TAIL_CHARS: usize = 500;

/// Thinking hint passed along with channel sends.
pub const DEFAULT_THINKING: &str = "low";

/// `{limit}` when the task carries no number.
pub const DEFAULT_SCAN_LIMIT: u32 = 20;

/// `{coverage}` when the task carries no percentage.
pub const DEFAULT_COVERAGE_PERCENT: u32 = 90;

/// `{tier}` when the task names no tier.
pub const DEFAULT_TIER: u32 = 1;

/// Number of keywords shown per specialist in the capability summary.
pub const HELP_KEYWORDS_SHOWN: usize = 5;

/// Number of example tasks shown in the capability summary.
pub const HELP_EXAMPLES_SHOWN: usize = 4;

/// Per-user config location: `~/.switchboard/switchboard.json`.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".switchboard").join(CONFIG_FILE_NAME))
}

/// Directory holding the running executable, where specialist binaries live.
pub fn install_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|p| p.to_path_buf()))
        .unwrap_or_else(|| PathBuf::from("."))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consts_are_non_empty() {
        assert!(!CONFIG_FILE_NAME.is_empty());
        assert!(!DEFAULT_THINKING.is_empty());
    }

    #[test]
    fn timeouts_are_positive() {
        assert!(!DEFAULT_SUBPROCESS_TIMEOUT.is_zero());
        assert!(!DEFAULT_CHANNEL_TIMEOUT.is_zero());
        assert!(SCAN_TIMEOUT > DEFAULT_SUBPROCESS_TIMEOUT);
    }

    #[test]
    fn user_config_path_ends_with_file_name() {
        if let Some(path) = user_config_path() {
            assert!(path.ends_with(".switchboard/switchboard.json"));
        }
    }

    #[test]
    fn install_dir_exists() {
        assert!(install_dir().exists());
    }
}
