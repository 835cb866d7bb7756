//! Scalar parameters pulled out of free-text tasks.
//!
//! Each extractor returns its documented default when the task doesn't
//! carry a usable value. They only look for the first match.

use std::sync::LazyLock;

use regex::Regex;

use crate::consts::{DEFAULT_COVERAGE_PERCENT, DEFAULT_SCAN_LIMIT, DEFAULT_TIER};

static FIRST_NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").unwrap());
static PERCENTAGE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d+)\s*%").unwrap());
static TIER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\btier\s*(\d+)").unwrap());

/// First run of digits anywhere in the task, e.g. "scan 50 markets" → 50.
/// Defaults to [`DEFAULT_SCAN_LIMIT`]; zero and overflowing values also
/// fall back to the default.
pub fn extract_limit(task: &str) -> u32 {
    FIRST_NUMBER
        .find(task)
        .and_then(|m| m.as_str().parse::<u32>().ok())
        .filter(|&n| n > 0)
        .unwrap_or(DEFAULT_SCAN_LIMIT)
}

/// First percentage in the task, e.g. "95% coverage" → 95. Defaults to
/// [`DEFAULT_COVERAGE_PERCENT`] when absent or above 100.
pub fn extract_coverage(task: &str) -> u32 {
    PERCENTAGE
        .captures(task)
        .and_then(|c| c[1].parse::<u32>().ok())
        .filter(|&pct| pct <= 100)
        .unwrap_or(DEFAULT_COVERAGE_PERCENT)
}

/// "tier 2" / "Tier2" → 2. Defaults to [`DEFAULT_TIER`].
pub fn extract_tier(task: &str) -> u32 {
    TIER.captures(task)
        .and_then(|c| c[1].parse::<u32>().ok())
        .unwrap_or(DEFAULT_TIER)
}
