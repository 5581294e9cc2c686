//! Hour-bucket time handling for harvest partitioning
//!
//! Matches are grouped into hour-granularity buckets derived from their
//! start time. A bucket is encoded as an integer reading `YYYYMMDDHH`
//! (e.g. 2024010112 = 2024-01-01 12:00 UTC), which keeps batch keys
//! sortable and human-readable in the ledger and the match store.
//!
//! All bucketing is UTC so batch keys are stable across hosts.

use chrono::{DateTime, Datelike, Timelike};

/// Seconds per bucket.
pub const BUCKET_SECS: i64 = 3600;

/// Convert an epoch start time into its `YYYYMMDDHH` bucket.
///
/// Returns `None` when the timestamp is outside chrono's representable
/// range (garbage values from a malformed payload).
pub fn batch_time_of(start_time: i64) -> Option<i64> {
    let dt = DateTime::from_timestamp(start_time, 0)?;
    Some(
        dt.year() as i64 * 1_000_000
            + dt.month() as i64 * 10_000
            + dt.day() as i64 * 100
            + dt.hour() as i64,
    )
}

/// Floor an epoch timestamp to the start of its hour.
pub fn nearest_hour(ts: i64) -> i64 {
    ts - ts.rem_euclid(BUCKET_SECS)
}

/// Walk backwards from `end_ts`, returning `count` hour blocks as
/// `(hour_start_epoch, batch_time)` pairs, most recent first.
///
/// Used by downstream batch jobs to enumerate the buckets a harvest
/// window covers.
pub fn hour_blocks(end_ts: i64, count: usize) -> Vec<(i64, i64)> {
    let mut blocks = Vec::with_capacity(count);
    let mut cursor = nearest_hour(end_ts);
    for _ in 0..count {
        if let Some(batch_time) = batch_time_of(cursor) {
            blocks.push((cursor, batch_time));
        }
        cursor -= BUCKET_SECS;
    }
    blocks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_time_known_value() {
        // 2024-01-01 12:00:00 UTC
        assert_eq!(batch_time_of(1_704_110_400), Some(2024010112));
        // Minutes and seconds fall into the same bucket
        assert_eq!(batch_time_of(1_704_110_400 + 34 * 60 + 56), Some(2024010112));
    }

    #[test]
    fn test_batch_time_bucket_boundaries() {
        // One second before the bucket rolls over
        assert_eq!(batch_time_of(1_704_110_400 + 3599), Some(2024010112));
        assert_eq!(batch_time_of(1_704_110_400 + 3600), Some(2024010113));
    }

    #[test]
    fn test_batch_time_epoch_zero() {
        assert_eq!(batch_time_of(0), Some(1970010100));
    }

    #[test]
    fn test_batch_time_out_of_range() {
        assert_eq!(batch_time_of(i64::MAX), None);
        assert_eq!(batch_time_of(i64::MIN), None);
    }

    #[test]
    fn test_nearest_hour_floors() {
        assert_eq!(nearest_hour(1_704_110_400), 1_704_110_400);
        assert_eq!(nearest_hour(1_704_110_401), 1_704_110_400);
        assert_eq!(nearest_hour(1_704_113_999), 1_704_110_400);
    }

    #[test]
    fn test_hour_blocks_walk_backwards() {
        let blocks = hour_blocks(1_704_110_450, 3);
        assert_eq!(
            blocks,
            vec![
                (1_704_110_400, 2024010112),
                (1_704_106_800, 2024010111),
                (1_704_103_200, 2024010110),
            ]
        );
    }

    #[test]
    fn test_hour_blocks_empty() {
        assert!(hour_blocks(1_704_110_450, 0).is_empty());
    }
}
