//! Shared helper functions for CLI commands

use std::collections::HashMap;

use csv::StringRecord;

/// Truncate a string to max_len characters, adding "..." if truncated
///
/// Useful for table columns that need fixed-width output. Counts chars,
/// not bytes, so multi-byte input (`µ`, `Ω`) never splits mid-character.
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        return s.to_string();
    }
    let prefix: String = s.chars().take(max_len.saturating_sub(3)).collect();
    format!("{prefix}...")
}

/// Parse a strict boolean cell value
///
/// Only case-insensitive `true`/`false` are accepted; anything else (empty
/// cells included) is rejected, matching how checkbox parameters were
/// validated by the legacy tooling.
pub fn parse_strict_bool(s: &str) -> Option<bool> {
    match s.to_lowercase().as_str() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

/// Build a map from header name to column index
pub fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(i, h)| (h.to_lowercase().trim().to_string(), i))
        .collect()
}

/// Get a field value from a CSV record
pub fn get_field(
    record: &StringRecord,
    header_map: &HashMap<String, usize>,
    field: &str,
) -> Option<String> {
    header_map
        .get(field)
        .and_then(|&idx| record.get(idx))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
