//! Error types for the shard module
//!
//! Defines error types specific to reading and enumerating shards.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::shard::ShardId;
use crate::timestamp::TimestampError;

/// Errors that can occur during shard operations
#[derive(Error, Debug)]
pub enum ShardError {
    /// Error when a shard file does not exist
    #[error("Shard not found: {0}")]
    NotFound(ShardId),

    /// Error when a shard holds no records
    #[error("Shard {0} is empty")]
    Empty(ShardId),

    /// Error when the dataset holds no shards at all
    #[error("Dataset contains no shards")]
    EmptyDataset,

    /// Error when shard ids do not form the run 1..=N
    #[error("Shard {missing} is missing; found {found} shard files")]
    MissingShard { missing: ShardId, found: usize },

    /// Error when a record is too short to hold the timestamp column
    #[error("Shard {shard}, row {row}: no field at column {column}")]
    MissingField {
        shard: ShardId,
        row: usize,
        column: usize,
    },

    /// Error when a record's timestamp field does not parse
    #[error("Shard {shard}, row {row}: {source}")]
    Timestamp {
        shard: ShardId,
        row: usize,
        #[source]
        source: TimestampError,
    },

    /// Error from the CSV parser
    #[error("CSV error in shard {shard}: {source}")]
    Csv {
        shard: ShardId,
        #[source]
        source: csv::Error,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// File error
    #[error("File error for {path:?}: {message}")]
    File { path: PathBuf, message: String },
}

/// Result type for shard operations
pub type ShardResult<T> = std::result::Result<T, ShardError>;

impl ShardError {
    /// Create a new file error
    pub fn file_error(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::File {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a new CSV error for a shard
    pub fn csv(shard: ShardId, source: csv::Error) -> Self {
        Self::Csv { shard, source }
    }

    /// Check if this is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Check if this is an I/O error
    pub fn is_io_error(&self) -> bool {
        matches!(self, Self::Io(_) | Self::File { .. })
    }

    /// Check if the shard contents violate the expected record layout.
    ///
    /// CSV failures count as data errors unless the parser hit an I/O error.
    pub fn is_data_integrity(&self) -> bool {
        match self {
            Self::Empty(_)
            | Self::EmptyDataset
            | Self::MissingShard { .. }
            | Self::MissingField { .. }
            | Self::Timestamp { .. } => true,
            Self::Csv { source, .. } => !source.is_io_error(),
            _ => false,
        }
    }

    /// The shard this error refers to, if any
    pub fn shard_id(&self) -> Option<ShardId> {
        match self {
            Self::NotFound(id) | Self::Empty(id) => Some(*id),
            Self::MissingShard { missing, .. } => Some(*missing),
            Self::MissingField { shard, .. }
            | Self::Timestamp { shard, .. }
            | Self::Csv { shard, .. } => Some(*shard),
            _ => None,
        }
    }
}
