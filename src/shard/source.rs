//! Shard sources
//!
//! The locators only need two things from storage: how many shards there are
//! and the records of one shard by id. `ShardSource` captures that, so the
//! search logic runs the same against a directory of CSV files or against
//! shards held in memory.

use crate::shard::{Record, Shard, ShardError, ShardId, ShardResult};

/// Read access to an ordered dataset of shards `1..=shard_count()`
pub trait ShardSource {
    /// Total number of shards in the dataset
    fn shard_count(&self) -> ShardResult<usize>;

    /// Load one shard, preserving record order
    fn read_shard(&self, id: ShardId) -> ShardResult<Shard>;
}

impl<S: ShardSource + ?Sized> ShardSource for &S {
    fn shard_count(&self) -> ShardResult<usize> {
        (**self).shard_count()
    }

    fn read_shard(&self, id: ShardId) -> ShardResult<Shard> {
        (**self).read_shard(id)
    }
}

/// Shards held in memory, numbered from 1 in insertion order
#[derive(Debug, Clone, Default)]
pub struct MemoryShards {
    timestamp_column: usize,
    shards: Vec<Vec<Record>>,
}

impl MemoryShards {
    /// Create an empty dataset whose records carry timestamps in `timestamp_column`
    pub fn new(timestamp_column: usize) -> Self {
        Self {
            timestamp_column,
            shards: Vec::new(),
        }
    }

    /// Append a shard, returning its id
    pub fn push(&mut self, records: Vec<Record>) -> ShardId {
        self.shards.push(records);
        self.shards.len()
    }

    /// Builder form of `push`
    pub fn with_shard(mut self, records: Vec<Record>) -> Self {
        self.push(records);
        self
    }

    /// Every record of every shard, in dataset order
    pub fn all_records(&self) -> impl Iterator<Item = &Record> {
        self.shards.iter().flatten()
    }
}

impl ShardSource for MemoryShards {
    fn shard_count(&self) -> ShardResult<usize> {
        Ok(self.shards.len())
    }

    fn read_shard(&self, id: ShardId) -> ShardResult<Shard> {
        let records = id
            .checked_sub(1)
            .and_then(|index| self.shards.get(index))
            .ok_or(ShardError::NotFound(id))?;
        Shard::new(id, self.timestamp_column, records.clone())
    }
}
