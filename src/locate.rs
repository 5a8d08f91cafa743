//! Binary search over shards and over the records of one shard

use std::cmp::Ordering;
use std::fmt;

use tracing::debug;

use crate::range::{classify, Position};
use crate::shard::{Shard, ShardError, ShardId, ShardResult, ShardSource};
use crate::timestamp::Timestamp;

/// Where a timestamp falls within a dataset of shards `1..=total`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShardLocation {
    /// `first(id) <= target < last(id)`
    Found(ShardId),
    /// `target` precedes the first record of shard 1
    OutOfRangeLow,
    /// `target` is at or after the last record of the final shard
    OutOfRangeHigh,
    /// `last(after) <= target < first(after + 1)`
    Gap { after: ShardId },
}

impl ShardLocation {
    /// Whether the target lies outside the dataset's coverage
    pub fn is_out_of_range(&self) -> bool {
        matches!(self, Self::OutOfRangeLow | Self::OutOfRangeHigh)
    }

    /// The shard that should hold the target, if one was found
    pub fn found(&self) -> Option<ShardId> {
        match self {
            Self::Found(id) => Some(*id),
            _ => None,
        }
    }
}

impl fmt::Display for ShardLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Found(id) => write!(f, "shard {}", id),
            Self::OutOfRangeLow => write!(f, "before all shards"),
            Self::OutOfRangeHigh => write!(f, "after all shards"),
            Self::Gap { after } => write!(f, "between shards {} and {}", after, after + 1),
        }
    }
}

/// Find the shard whose `[first, last)` span holds `target`.
///
/// Each probe loads one shard and classifies `target` against the timestamps
/// of its first and last records. Shards must be globally ordered; this is
/// assumed, not checked. When no span holds the target, the final search
/// bounds say which side of the data (or which seam between shards) it falls
/// on.
pub fn locate_shard<S: ShardSource + ?Sized>(
    source: &S,
    total: usize,
    target: &Timestamp,
) -> ShardResult<ShardLocation> {
    if total == 0 {
        return Err(ShardError::EmptyDataset);
    }

    let mut low: ShardId = 1;
    let mut high: ShardId = total;

    while low <= high {
        let mid = low + (high - low) / 2;

        let shard = source.read_shard(mid)?;
        let (first, last) = shard.time_range()?;
        let position = classify(&first, &last, target);

        debug!(shard = mid, %first, %last, %target, %position, "probed shard");

        match position {
            Position::Inside => return Ok(ShardLocation::Found(mid)),
            Position::Before => high = mid - 1,
            Position::After => low = mid + 1,
        }
    }

    // low == high + 1: shard `high` sits below the target, shard `low` above it
    Ok(if high == 0 {
        ShardLocation::OutOfRangeLow
    } else if high >= total {
        ShardLocation::OutOfRangeHigh
    } else {
        ShardLocation::Gap { after: high }
    })
}

/// Find the offset of `target` within a shard.
///
/// Returns the index of the first record whose timestamp equals `target`, or
/// the insertion point if there is none. Every record before the returned
/// index is strictly earlier than `target`; every record from it on is at or
/// after `target`. The result lies in `0..=shard.len()`.
pub fn locate_record(shard: &Shard, target: &Timestamp) -> ShardResult<usize> {
    let mut low = 0;
    let mut high = shard.len();

    while low < high {
        let mid = low + (high - low) / 2;

        match shard.timestamp_at(mid)?.cmp(target) {
            Ordering::Less => low = mid + 1,
            // An equal record may have equal neighbours to its left
            Ordering::Equal | Ordering::Greater => high = mid,
        }
    }

    Ok(low)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shard::{MemoryShards, Record};

    fn ts(s: &str) -> Timestamp {
        Timestamp::parse(s).unwrap()
    }

    fn rec(n: usize, when: &str) -> Record {
        [n.to_string(), when.to_string()].into_iter().collect()
    }

    fn shard_of(times: &[&str]) -> Shard {
        let records = times.iter().enumerate().map(|(i, t)| rec(i, t)).collect();
        Shard::new(1, 1, records).unwrap()
    }

    /// Three shards with gaps between them:
    /// 1: Jan 01 .. Jan 03, 2: Jan 05 .. Jan 07, 3: Jan 09 .. Jan 11
    fn three_shards() -> MemoryShards {
        MemoryShards::new(1)
            .with_shard(vec![
                rec(1, "2024-01-01T00:00:00Z"),
                rec(2, "2024-01-02T00:00:00Z"),
                rec(3, "2024-01-03T00:00:00Z"),
            ])
            .with_shard(vec![
                rec(4, "2024-01-05T00:00:00Z"),
                rec(5, "2024-01-06T00:00:00Z"),
                rec(6, "2024-01-07T00:00:00Z"),
            ])
            .with_shard(vec![
                rec(7, "2024-01-09T00:00:00Z"),
                rec(8, "2024-01-10T00:00:00Z"),
                rec(9, "2024-01-11T00:00:00Z"),
            ])
    }

    #[test]
    fn test_locate_shard_inside() -> ShardResult<()> {
        let source = three_shards();

        assert_eq!(locate_shard(&source, 3, &ts("2024-01-01T00:00:00Z"))?, ShardLocation::Found(1));
        assert_eq!(locate_shard(&source, 3, &ts("2024-01-02T12:00:00Z"))?, ShardLocation::Found(1));
        assert_eq!(locate_shard(&source, 3, &ts("2024-01-06T00:00:00Z"))?, ShardLocation::Found(2));
        assert_eq!(locate_shard(&source, 3, &ts("2024-01-10T23:00:00Z"))?, ShardLocation::Found(3));
        Ok(())
    }

    #[test]
    fn test_locate_shard_out_of_range() -> ShardResult<()> {
        let source = three_shards();

        assert_eq!(locate_shard(&source, 3, &ts("2023-12-31T00:00:00Z"))?, ShardLocation::OutOfRangeLow);
        assert_eq!(locate_shard(&source, 3, &ts("2024-02-01T00:00:00Z"))?, ShardLocation::OutOfRangeHigh);
        // The last record itself is outside the half-open span of the last shard
        assert_eq!(locate_shard(&source, 3, &ts("2024-01-11T00:00:00Z"))?, ShardLocation::OutOfRangeHigh);
        Ok(())
    }

    #[test]
    fn test_locate_shard_gaps() -> ShardResult<()> {
        let source = three_shards();

        assert_eq!(locate_shard(&source, 3, &ts("2024-01-04T00:00:00Z"))?, ShardLocation::Gap { after: 1 });
        assert_eq!(locate_shard(&source, 3, &ts("2024-01-03T00:00:00Z"))?, ShardLocation::Gap { after: 1 });
        assert_eq!(locate_shard(&source, 3, &ts("2024-01-08T00:00:00Z"))?, ShardLocation::Gap { after: 2 });
        Ok(())
    }

    #[test]
    fn test_locate_shard_uses_instant_comparison() -> ShardResult<()> {
        let source = three_shards();
        // 2024-01-05T06:00:00+07:00 == 2024-01-04T23:00:00Z, still in the gap
        assert_eq!(
            locate_shard(&source, 3, &ts("2024-01-05T06:00:00+07:00"))?,
            ShardLocation::Gap { after: 1 }
        );
        // 2024-01-05T07:00:00+07:00 == first record of shard 2
        assert_eq!(
            locate_shard(&source, 3, &ts("2024-01-05T07:00:00+07:00"))?,
            ShardLocation::Found(2)
        );
        Ok(())
    }

    #[test]
    fn test_locate_shard_single_record_shards() -> ShardResult<()> {
        let source = MemoryShards::new(1)
            .with_shard(vec![rec(1, "2024-01-01T00:00:00Z")])
            .with_shard(vec![rec(2, "2024-01-02T00:00:00Z")]);

        assert_eq!(locate_shard(&source, 2, &ts("2024-01-01T00:00:00Z"))?, ShardLocation::Gap { after: 1 });
        assert_eq!(locate_shard(&source, 2, &ts("2023-12-01T00:00:00Z"))?, ShardLocation::OutOfRangeLow);
        assert_eq!(locate_shard(&source, 2, &ts("2024-01-02T00:00:00Z"))?, ShardLocation::OutOfRangeHigh);
        Ok(())
    }

    #[test]
    fn test_locate_shard_empty_dataset() {
        let source = MemoryShards::new(1);
        let err = locate_shard(&source, 0, &ts("2024-01-01T00:00:00Z")).unwrap_err();
        assert!(matches!(err, ShardError::EmptyDataset));
    }

    #[test]
    fn test_locate_shard_aborts_on_bad_data() {
        let source = MemoryShards::new(1)
            .with_shard(vec![rec(1, "2024-01-01T00:00:00Z")])
            .with_shard(vec![rec(2, "garbage"), rec(3, "2024-01-03T00:00:00Z")])
            .with_shard(vec![rec(4, "2024-01-05T00:00:00Z")]);

        let err = locate_shard(&source, 3, &ts("2024-01-02T00:00:00Z")).unwrap_err();
        assert!(matches!(err, ShardError::Timestamp { shard: 2, row: 0, .. }));
        assert!(err.is_data_integrity());
    }

    #[test]
    fn test_locate_record_exact_and_insertion() -> ShardResult<()> {
        let shard = shard_of(&[
            "2024-01-01T00:00:00Z",
            "2024-01-02T00:00:00Z",
            "2024-01-03T00:00:00Z",
            "2024-01-04T00:00:00Z",
        ]);

        assert_eq!(locate_record(&shard, &ts("2024-01-01T00:00:00Z"))?, 0);
        assert_eq!(locate_record(&shard, &ts("2024-01-03T00:00:00Z"))?, 2);
        assert_eq!(locate_record(&shard, &ts("2024-01-02T12:00:00Z"))?, 2);
        assert_eq!(locate_record(&shard, &ts("2023-12-31T00:00:00Z"))?, 0);
        assert_eq!(locate_record(&shard, &ts("2024-01-04T00:00:01Z"))?, 4);
        Ok(())
    }

    #[test]
    fn test_locate_record_odd_length_insertion_points() -> ShardResult<()> {
        let shard = shard_of(&["2024-01-01T00:00:00Z", "2024-01-03T00:00:00Z", "2024-01-05T00:00:00Z"]);

        assert_eq!(locate_record(&shard, &ts("2024-01-02T00:00:00Z"))?, 1);
        assert_eq!(locate_record(&shard, &ts("2024-01-04T00:00:00Z"))?, 2);
        assert_eq!(locate_record(&shard, &ts("2024-01-06T00:00:00Z"))?, 3);
        Ok(())
    }

    #[test]
    fn test_locate_record_first_of_duplicates() -> ShardResult<()> {
        let shard = shard_of(&[
            "2024-01-01T00:00:00Z",
            "2024-01-02T00:00:00Z",
            "2024-01-02T00:00:00Z",
            "2024-01-02T00:00:00Z",
            "2024-01-03T00:00:00Z",
        ]);

        assert_eq!(locate_record(&shard, &ts("2024-01-02T00:00:00Z"))?, 1);
        assert_eq!(locate_record(&shard, &ts("2024-01-02T07:00:00+07:00"))?, 1);
        Ok(())
    }

    #[test]
    fn test_locate_record_bad_timestamp() {
        let shard = shard_of(&["2024-01-01T00:00:00Z", "nope", "2024-01-03T00:00:00Z"]);
        let err = locate_record(&shard, &ts("2024-01-02T00:00:00Z")).unwrap_err();
        assert!(matches!(err, ShardError::Timestamp { row: 1, .. }));
    }

    #[test]
    fn test_location_display() {
        assert_eq!(ShardLocation::Found(2).to_string(), "shard 2");
        assert_eq!(ShardLocation::Gap { after: 4 }.to_string(), "between shards 4 and 5");
        assert!(ShardLocation::OutOfRangeLow.is_out_of_range());
        assert_eq!(ShardLocation::Found(3).found(), Some(3));
        assert_eq!(ShardLocation::Gap { after: 1 }.found(), None);
    }
}
