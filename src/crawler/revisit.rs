//! Revisit policy
//!
//! Decides whether a re-fetched page warrants reprocessing. The decision
//! is deliberately conservative: without a Last-Modified value on both
//! the old and new fetch there is nothing to compare, and the page is
//! left alone.

use chrono::{DateTime, Utc};

/// Returns true if a re-fetched page should be reprocessed
///
/// Requires revisiting to be enabled, both timestamps to be known, and
/// the new timestamp to be strictly newer.
pub fn should_reprocess(
    new_modified: Option<DateTime<Utc>>,
    old_modified: Option<DateTime<Utc>>,
    revisit_enabled: bool,
) -> bool {
    if !revisit_enabled {
        return false;
    }
    match (new_modified, old_modified) {
        (Some(new), Some(old)) => new > old,
        _ => false,
    }
}
