//! Timestamp utilities

use chrono::Utc;

/// Current time as milliseconds since the Unix epoch.
///
/// All persisted timestamps (audit columns, stage windows, media capture
/// times) use this representation.
pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}
