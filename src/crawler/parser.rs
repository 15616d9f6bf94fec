//! Permissive ID extraction from raw API payloads
//!
//! Payloads are scanned as text rather than parsed: the value following every
//! occurrence of a field marker, up to the next comma, is taken as an ID. Unknown
//! fields, nesting and whatever else sits between markers are ignored.

use thiserror::Error;

/// Marker preceding each match ID in a recent-matches list
pub const GAME_ID_MARKER: &str = "\"gameId\":";

/// Marker preceding each participant account ID in a match body
pub const ACCOUNT_ID_MARKER: &str = "\"accountId\":";

/// A marker was found without a value terminated by a comma
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("marker {marker} at byte {offset} has no trailing delimiter")]
pub struct MalformedDocument {
    pub marker: String,
    pub offset: usize,
}

/// Returns the values following every occurrence of `marker`, in document order
///
/// Each value runs from the end of the marker to the first comma, and that comma
/// must come before the next occurrence of the marker. Surrounding whitespace
/// and double quotes are stripped, so `"accountId": "abc",` yields `abc`.
/// Duplicates are kept; deduplication is the frontier's job.
///
/// # Errors
///
/// Returns [`MalformedDocument`] when a value is unterminated or empty, which
/// usually means a truncated payload. The whole document is abandoned.
///
/// # Example
///
/// ```
/// use match_crawler::crawler::{extract_ids, GAME_ID_MARKER};
///
/// let doc = r#"{"matches":[{"gameId":555,"champion":1},{"gameId":556,"lane":"MID"}]}"#;
/// assert_eq!(extract_ids(doc, GAME_ID_MARKER).unwrap(), vec!["555", "556"]);
/// ```
pub fn extract_ids(document: &str, marker: &str) -> Result<Vec<String>, MalformedDocument> {
    let starts: Vec<usize> = document.match_indices(marker).map(|(i, _)| i).collect();
    let mut ids = Vec::with_capacity(starts.len());

    for (n, &start) in starts.iter().enumerate() {
        let value_start = start + marker.len();
        let segment_end = starts.get(n + 1).copied().unwrap_or(document.len());
        let segment = &document[value_start..segment_end];

        let malformed = || MalformedDocument {
            marker: marker.to_string(),
            offset: start,
        };

        let value_len = segment.find(',').ok_or_else(malformed)?;
        let value = segment[..value_len].trim().trim_matches('"').trim();
        if value.is_empty() {
            return Err(malformed());
        }

        ids.push(value.to_string());
    }

    Ok(ids)
}
