//! Timestamp and id helpers shared by entries and the file sink.

use std::time::Duration;
use ulid::Ulid;

/// Returns unix-epoch seconds with `Z` suffix (e.g. `1771220592Z`).
pub fn now_epoch_z() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    format!("{}Z", secs)
}

pub fn new_entry_id() -> String {
    Ulid::new().to_string()
}

/// Seconds with millisecond precision, e.g. `0.020s`.
pub fn format_secs(elapsed: Duration) -> String {
    format!("{:0.3}s", elapsed.as_secs_f64())
}
