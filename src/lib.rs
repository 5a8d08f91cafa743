//! Time-range extraction over sharded, timestamp-sorted record files
//!
//! A dataset is a directory of shards `1..=N`. Records inside a shard are
//! sorted by timestamp and shards are globally ordered, so a `[start, end)`
//! query resolves with two levels of binary search: first over shards, then
//! over the records of the boundary shards.
//!
//! ```no_run
//! use shardrange_rs::{CsvShardDirectory, ExtractConfig, Extractor, TimeRange, Timestamp};
//!
//! # fn main() -> shardrange_rs::Result<()> {
//! let config = ExtractConfig::new().with_directory("files_report");
//! let extractor = Extractor::new(CsvShardDirectory::from_config(&config));
//! let range = TimeRange::new(
//!     Timestamp::parse("2023-12-30T19:08:18+07:00")?,
//!     Timestamp::parse("2024-01-04T15:27:03+07:00")?,
//! )?;
//! let extraction = extractor.extract(&range)?;
//! println!("{} records", extraction.records.len());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod extract;
pub mod locate;
pub mod metrics;
pub mod range;
pub mod shard;
pub mod timestamp;
pub mod writer;

pub use config::ExtractConfig;
pub use error::{Error, Result};
pub use extract::{Cursor, Extraction, Extractor, Outcome};
pub use locate::{locate_record, locate_shard, ShardLocation};
pub use metrics::{MetricsCollector, MetricsSnapshot};
pub use range::{classify, Position, TimeRange};
pub use shard::{CsvShardDirectory, MemoryShards, Record, Shard, ShardError, ShardId, ShardResult, ShardSource};
pub use timestamp::{Timestamp, TimestampError};
pub use writer::{write_result, WriteOptions};
