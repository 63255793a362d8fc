pub mod time;

// Re-export time utilities
pub use time::{current_time, elapsed_between, format_duration, Timestamp};
