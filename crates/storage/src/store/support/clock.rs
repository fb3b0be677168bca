#![forbid(unsafe_code)]

use time::OffsetDateTime;

/// Wall-clock epoch milliseconds, the unit of every stored timestamp.
pub(in crate::store) fn now_ms() -> i64 {
    let millis = OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000;
    i64::try_from(millis).unwrap_or(i64::MAX)
}
