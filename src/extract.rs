//! Range extraction
//!
//! The `Extractor` turns a `[start, end)` query into the records it covers.
//! Each bound is located among the shards, then resolved to a global cursor
//! (a shard id and a record offset) that marks the first record at or after
//! the bound. The result is everything between the two cursors, in dataset
//! order.

use std::fmt;
use std::path::Path;
use std::time::Instant;

use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::locate::{locate_record, locate_shard, ShardLocation};
use crate::metrics::{MetricsCollector, MetricsSnapshot};
use crate::range::TimeRange;
use crate::shard::{Record, Shard, ShardId, ShardResult, ShardSource};
use crate::timestamp::Timestamp;
use crate::writer::{write_result, WriteOptions};

/// A position between records of the dataset.
///
/// `offset` indexes into shard `shard`; `offset == len` is only produced for
/// the final shard, where it marks the end of the dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Cursor {
    pub shard: ShardId,
    pub offset: usize,
}

impl Cursor {
    pub fn new(shard: ShardId, offset: usize) -> Self {
        Self { shard, offset }
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.shard, self.offset)
    }
}

/// Whether an extraction produced anything
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// At least one record lies in the range
    Extracted,
    /// No record lies in the range; not an error
    NoData,
}

/// The result of one extraction
#[derive(Debug, Clone)]
pub struct Extraction {
    /// The query
    pub range: TimeRange,
    /// Where the start bound fell
    pub start: ShardLocation,
    /// Where the end bound fell
    pub end: ShardLocation,
    /// Matching records in dataset order
    pub records: Vec<Record>,
    pub outcome: Outcome,
    /// Extractor counters once this extraction finished
    pub metrics: MetricsSnapshot,
}

impl Extraction {
    /// Whether no record matched
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Counts every shard load against the extractor's metrics
struct Metered<'a, S: ?Sized> {
    source: &'a S,
    metrics: &'a MetricsCollector,
}

impl<S: ShardSource + ?Sized> ShardSource for Metered<'_, S> {
    fn shard_count(&self) -> ShardResult<usize> {
        self.source.shard_count()
    }

    fn read_shard(&self, id: ShardId) -> ShardResult<Shard> {
        let started = Instant::now();
        let shard = self.source.read_shard(id)?;
        self.metrics.record_shard_read(shard.len(), started.elapsed());
        Ok(shard)
    }
}

/// Extracts time ranges from a shard source
#[derive(Debug)]
pub struct Extractor<S> {
    source: S,
    metrics: MetricsCollector,
}

impl<S: ShardSource> Extractor<S> {
    /// Create an extractor over `source`
    pub fn new(source: S) -> Self {
        Self {
            source,
            metrics: MetricsCollector::new(),
        }
    }

    /// Get the metrics collector
    pub fn metrics(&self) -> &MetricsCollector {
        &self.metrics
    }

    /// Extract every record whose timestamp lies in `range`.
    ///
    /// The result equals a linear scan of the dataset filtered by the range.
    /// An empty result is reported as `Outcome::NoData`, not as an error.
    /// Any shard that fails to load or parse aborts the extraction.
    pub fn extract(&self, range: &TimeRange) -> Result<Extraction> {
        let started = Instant::now();

        // The fields are public, so the invariant may have been bypassed
        if range.start >= range.end {
            return Err(Error::invalid_range(format!(
                "start time {} is not before end time {}",
                range.start, range.end
            )));
        }

        let source = Metered {
            source: &self.source,
            metrics: &self.metrics,
        };

        let total = source.shard_count()?;
        let start = locate_shard(&source, total, &range.start)?;
        let end = locate_shard(&source, total, &range.end)?;
        debug!(total, %start, %end, "located range bounds");

        let records = if start == ShardLocation::OutOfRangeLow && end == ShardLocation::OutOfRangeLow {
            Vec::new()
        } else {
            let from = self.resolve(&source, total, start, &range.start)?;
            let to = self.resolve(&source, total, end, &range.end)?;
            debug!(%from, %to, "resolved cursors");
            assemble(&source, from, to)?
        };

        let outcome = if records.is_empty() {
            Outcome::NoData
        } else {
            Outcome::Extracted
        };

        self.metrics.record_extraction(records.len(), started.elapsed());
        info!(
            range = %range,
            records = records.len(),
            shard_reads = self.metrics.get_shard_reads(),
            ?outcome,
            "extraction finished"
        );

        Ok(Extraction {
            range: *range,
            start,
            end,
            records,
            outcome,
            metrics: self.metrics.snapshot(),
        })
    }

    /// Extract `range` and write the records to `path`.
    ///
    /// Nothing is written when the range holds no data.
    pub fn extract_to_file(
        &self,
        range: &TimeRange,
        path: &Path,
        options: &WriteOptions,
    ) -> Result<Extraction> {
        let extraction = self.extract(range)?;

        if extraction.outcome == Outcome::Extracted {
            write_result(path, &extraction.records, options)?;
            info!(path = %path.display(), records = extraction.records.len(), "result written");
        }

        Ok(extraction)
    }

    /// Resolve a located bound to the cursor of the first record at or after `target`
    fn resolve<T: ShardSource>(
        &self,
        source: &T,
        total: usize,
        location: ShardLocation,
        target: &Timestamp,
    ) -> ShardResult<Cursor> {
        let id = match location {
            ShardLocation::OutOfRangeLow => return Ok(Cursor::new(1, 0)),
            ShardLocation::Found(id) | ShardLocation::Gap { after: id } => id,
            ShardLocation::OutOfRangeHigh => total,
        };

        let shard = source.read_shard(id)?;
        let mut cursor = Cursor::new(id, self.search(&shard, target)?);
        let mut len = shard.len();

        // Records equal to the target may continue across a seam into earlier shards
        while cursor.offset == 0 && cursor.shard > 1 {
            let previous = source.read_shard(cursor.shard - 1)?;
            if previous.last_timestamp()? < *target {
                break;
            }
            cursor = Cursor::new(previous.id(), self.search(&previous, target)?);
            len = previous.len();
        }

        if cursor.offset == len && cursor.shard < total {
            cursor = Cursor::new(cursor.shard + 1, 0);
        }

        Ok(cursor)
    }

    fn search(&self, shard: &Shard, target: &Timestamp) -> ShardResult<usize> {
        self.metrics.increment_record_searches();
        locate_record(shard, target)
    }
}

/// Load a shard that contributes to the result, checking every timestamp
fn load_checked<S: ShardSource>(source: &S, id: ShardId) -> ShardResult<Vec<Record>> {
    let shard = source.read_shard(id)?;
    shard.validate()?;
    Ok(shard.into_records())
}

/// Collect the records in `[from, to)`
fn assemble<S: ShardSource>(source: &S, from: Cursor, to: Cursor) -> ShardResult<Vec<Record>> {
    if from >= to {
        return Ok(Vec::new());
    }

    if from.shard == to.shard {
        let records = load_checked(source, from.shard)?;
        return Ok(records
            .into_iter()
            .skip(from.offset)
            .take(to.offset - from.offset)
            .collect());
    }

    let mut records: Vec<Record> = load_checked(source, from.shard)?
        .into_iter()
        .skip(from.offset)
        .collect();

    for id in from.shard + 1..to.shard {
        records.extend(load_checked(source, id)?);
    }

    if to.offset > 0 {
        let tail = load_checked(source, to.shard)?;
        records.extend(tail.into_iter().take(to.offset));
    }

    Ok(records)
}
