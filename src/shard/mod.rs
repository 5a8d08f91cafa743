//! Shard storage access
//!
//! A dataset is split into shards numbered from 1. Each shard is a sorted run
//! of records, and every record of shard `i` precedes every record of shard
//! `i + 1`. This module loads shards; the search itself lives in `locate`.

mod directory;
mod error;
mod record;
mod source;

pub use directory::{list_shard_files, parse_shard_file_name, shard_path, CsvShardDirectory, DEFAULT_SHARD_SUFFIX};
pub use error::{ShardError, ShardResult};
pub use record::{Record, Shard};
pub use source::{MemoryShards, ShardSource};

/// Shard ID type, 1-based
pub type ShardId = usize;
