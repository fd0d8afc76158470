//! How many passages the user asked for.

use regex::Regex;
use std::sync::LazyLock;

/// Upper bound on passages a single reply may quote.
pub const MAX_QUOTES: usize = 5;

// NOTE: expect() is acceptable here: the pattern is a compile-time constant.
static COUNT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(one|two|three|four|five|1|2|3|4|5)\b")
        .expect("Invalid regex: quote count pattern")
});

/// Returns the first whole-word count between 1 and 5 (digit or English word), or 1.
pub fn extract_count(message: &str) -> usize {
    COUNT_PATTERN
        .find(message)
        .map(|m| match m.as_str().to_lowercase().as_str() {
            "one" | "1" => 1,
            "two" | "2" => 2,
            "three" | "3" => 3,
            "four" | "4" => 4,
            "five" | "5" => 5,
            _ => 1,
        })
        .unwrap_or(1)
}
