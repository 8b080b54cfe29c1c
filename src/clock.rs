//! Time helpers for history records.

use chrono::{Local, Utc};

/// Millisecond timestamp id, bumped past `last` so ids issued by one store
/// stay unique and strictly increasing.
pub(crate) fn next_record_id(last: u64) -> u64 {
    let now = u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0);
    now.max(last.saturating_add(1))
}

/// Local wall-clock time as `YYYY/M/D HH:MM:SS`.
pub(crate) fn local_timestamp() -> String {
    Local::now().format("%Y/%-m/%-d %H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_strictly_increase_within_a_millisecond() {
        let first = next_record_id(0);
        let second = next_record_id(first);
        let third = next_record_id(second);
        assert!(first < second && second < third);
    }

    #[test]
    fn ids_never_go_backwards() {
        let far_future = u64::MAX / 2;
        assert_eq!(next_record_id(far_future), far_future + 1);
    }

    #[test]
    fn timestamp_has_date_and_time_parts() {
        let stamp = local_timestamp();
        let (date, time) = stamp.split_once(' ').unwrap();
        assert_eq!(date.split('/').count(), 3);
        assert_eq!(time.split(':').count(), 3);
    }
}
