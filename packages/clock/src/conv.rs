//! Conversions from timestamps to human-readable datetimes, for operator
//! logs.
use chrono::{DateTime, Utc};

use bittrickle_primitives::DurationSinceUnixEpoch;

/// It converts a timestamp to a UTC datetime.
///
/// For the Unix Epoch (timestamp 0) it returns a `DateTime` whose string
/// representation is `1970-01-01 00:00:00 UTC`.
///
/// # Panics
///
/// Will panic when the timestamp overflows the internal i64 type (this will
/// naturally happen in 292.5 billion years).
#[must_use]
pub fn convert_from_timestamp_to_datetime_utc(duration: DurationSinceUnixEpoch) -> DateTime<Utc> {
    DateTime::from_timestamp(
        i64::try_from(duration.as_secs()).expect("the timestamp should fit into an i64"),
        duration.subsec_nanos(),
    )
    .expect("the timestamp should be a valid datetime")
}
