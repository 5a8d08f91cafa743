//! Error handling for range extraction
//!
//! This module provides the crate-level error type and result alias.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::shard::ShardError;
use crate::timestamp::TimestampError;

/// Errors that can occur while extracting a time range
#[derive(Error, Debug)]
pub enum Error {
    /// The query bounds are equal or inverted
    #[error("Invalid time range: {0}")]
    InvalidRange(String),

    /// A timestamp supplied by the caller does not parse
    #[error("Timestamp error: {0}")]
    Timestamp(#[from] TimestampError),

    /// Errors raised while enumerating, loading or searching shards
    #[error(transparent)]
    Shard(#[from] ShardError),

    /// Errors related to I/O operations
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Errors writing the result file
    #[error("Output error for {path:?}: {message}")]
    Output { path: PathBuf, message: String },

    /// Errors from the CSV writer
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Errors related to serialization/deserialization
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Errors related to configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for extraction operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a new invalid range error
    pub fn invalid_range(message: impl Into<String>) -> Self {
        Self::InvalidRange(message.into())
    }

    /// Create a new output error
    pub fn output(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Output {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Check if this is a user input error (bad bounds or an unparsable query timestamp)
    pub fn is_input_error(&self) -> bool {
        matches!(self, Self::InvalidRange(_) | Self::Timestamp(_))
    }

    /// Check if this is an invalid range error
    pub fn is_invalid_range(&self) -> bool {
        matches!(self, Self::InvalidRange(_))
    }

    /// Check if the shard data itself is malformed
    pub fn is_data_integrity(&self) -> bool {
        match self {
            Self::Shard(err) => err.is_data_integrity(),
            _ => false,
        }
    }

    /// Check if this is an I/O error
    pub fn is_io_error(&self) -> bool {
        match self {
            Self::Io(_) | Self::Output { .. } => true,
            Self::Shard(err) => err.is_io_error() || err.is_not_found(),
            Self::Csv(err) => err.is_io_error(),
            _ => false,
        }
    }

    /// Get a user-friendly suggestion for resolving the error
    pub fn suggestion(&self) -> Option<String> {
        match self {
            Self::InvalidRange(_) => Some("The start time must be strictly before the end time".to_string()),
            Self::Timestamp(_) => {
                Some("Timestamps use RFC 3339, for example 2023-12-30T19:08:18+07:00".to_string())
            }
            Self::Shard(ShardError::MissingShard { .. }) => {
                Some("Shard files must be numbered 1..N without gaps".to_string())
            }
            Self::Shard(ShardError::EmptyDataset) => {
                Some("Check the directory path and the shard file suffix".to_string())
            }
            Self::Shard(ShardError::MissingField { .. }) => {
                Some("Check the timestamp column index and the field delimiter".to_string())
            }
            Self::Io(err) if err.kind() == io::ErrorKind::NotFound => {
                Some("The specified file or directory does not exist".to_string())
            }
            Self::Io(err) if err.kind() == io::ErrorKind::PermissionDenied => {
                Some("You don't have permission to access this file or directory".to_string())
            }
            _ => None,
        }
    }
}
