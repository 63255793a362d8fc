use std::time::{SystemTime, UNIX_EPOCH};

/// Whole seconds since the Unix epoch. The farm never interpolates below one unit.
pub type Timestamp = u64;

/// Returns the current time in seconds since the Unix epoch
pub fn current_time() -> Timestamp {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Whole time units between `start` and `now`
///
/// Returns 0 if `start` lies in the future, so a clock that steps backwards
/// never produces a negative elapsed period.
pub fn elapsed_between(start: Timestamp, now: Timestamp) -> u64 {
    now.saturating_sub(start)
}

/// Format an elapsed period in a human-readable format
pub fn format_duration(secs: u64) -> String {
    if secs < 60 {
        format!("{} seconds", secs)
    } else if secs < 3600 {
        format!("{} minutes", secs / 60)
    } else if secs < 86400 {
        format!("{} hours", secs / 3600)
    } else {
        format!("{} days", secs / 86400)
    }
}
