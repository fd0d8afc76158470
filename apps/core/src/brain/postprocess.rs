//! Response clean-up applied to completion output before it reaches the user.

use super::lexicon::LexiconTables;

/// Strips a leading run of digits and whitespace (verse labels) from every line.
pub fn clean_quote(text: &str) -> String {
    text.lines()
        .map(|line| line.trim_start_matches(|c: char| c.is_ascii_digit() || c.is_whitespace()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Drops every line of a casual reply that carries a devotional marker.
pub fn scrub_casual(text: &str, lexicon: &LexiconTables) -> String {
    text.lines()
        .filter(|line| !lexicon.has_devotional_marker(&line.to_lowercase()))
        .collect::<Vec<_>>()
        .join("\n")
}
