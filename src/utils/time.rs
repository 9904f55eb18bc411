// utils/time.rs
use chrono::{DateTime, Utc};

/// Current UTC instant, used for created/updated ticket timestamps.
pub fn now_utc() -> DateTime<Utc> {
    Utc::now()
}
