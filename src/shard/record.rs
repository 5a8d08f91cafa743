//! Records and loaded shards

use crate::shard::{ShardError, ShardId, ShardResult};
use crate::timestamp::Timestamp;

/// One row of a shard: an ordered list of opaque string fields, one of which
/// holds the row's timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Record {
    fields: Vec<String>,
}

impl Record {
    /// Create a record from its fields
    pub fn new(fields: Vec<String>) -> Self {
        Self { fields }
    }

    /// Borrow all fields
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Get one field
    pub fn field(&self, index: usize) -> Option<&str> {
        self.fields.get(index).map(String::as_str)
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the record has no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Consume the record, returning its fields
    pub fn into_fields(self) -> Vec<String> {
        self.fields
    }
}

impl<S: Into<String>> FromIterator<S> for Record {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(Into::into).collect())
    }
}

impl From<&csv::StringRecord> for Record {
    fn from(row: &csv::StringRecord) -> Self {
        row.iter().collect()
    }
}

/// A fully materialized shard.
///
/// Holds the records in on-disk order together with the column that carries
/// their timestamps. Timestamps are parsed on access; a shard is only ever
/// probed a handful of times, so eager parsing would be wasted work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shard {
    id: ShardId,
    timestamp_column: usize,
    records: Vec<Record>,
}

impl Shard {
    /// Create a shard, rejecting an empty record list
    pub fn new(id: ShardId, timestamp_column: usize, records: Vec<Record>) -> ShardResult<Self> {
        if records.is_empty() {
            return Err(ShardError::Empty(id));
        }
        Ok(Self {
            id,
            timestamp_column,
            records,
        })
    }

    /// Shard ID
    pub fn id(&self) -> ShardId {
        self.id
    }

    /// Number of records (always at least one)
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Always false; kept for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Borrow the records
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Consume the shard, returning its records
    pub fn into_records(self) -> Vec<Record> {
        self.records
    }

    /// Parse the timestamp of the record at `row`
    pub fn timestamp_at(&self, row: usize) -> ShardResult<Timestamp> {
        let field = self
            .records
            .get(row)
            .and_then(|record| record.field(self.timestamp_column))
            .ok_or(ShardError::MissingField {
                shard: self.id,
                row,
                column: self.timestamp_column,
            })?;

        Timestamp::parse(field).map_err(|source| ShardError::Timestamp {
            shard: self.id,
            row,
            source,
        })
    }

    /// Check that every record carries a parsable timestamp
    pub fn validate(&self) -> ShardResult<()> {
        for row in 0..self.records.len() {
            self.timestamp_at(row)?;
        }
        Ok(())
    }

    /// Timestamp of the first record
    pub fn first_timestamp(&self) -> ShardResult<Timestamp> {
        self.timestamp_at(0)
    }

    /// Timestamp of the last record
    pub fn last_timestamp(&self) -> ShardResult<Timestamp> {
        self.timestamp_at(self.records.len() - 1)
    }

    /// Get the time span `(first, last)` of the shard
    pub fn time_range(&self) -> ShardResult<(Timestamp, Timestamp)> {
        Ok((self.first_timestamp()?, self.last_timestamp()?))
    }
}
