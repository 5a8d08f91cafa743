//! Configuration for range extraction
//!
//! This module provides the options that describe a shard directory and where
//! the extracted result goes.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::shard::DEFAULT_SHARD_SUFFIX;
use crate::writer::WriteOptions;

/// Configuration options for an extraction run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    // Input layout
    /// Directory holding the shard files
    pub directory: PathBuf,
    /// File name suffix after the shard id (`1_report.csv`)
    pub shard_suffix: String,
    /// Zero-based column holding each record's timestamp
    pub timestamp_column: usize,
    /// Whether every shard starts with a header row
    pub has_headers: bool,
    /// CSV field delimiter, shared by input and output
    pub delimiter: u8,

    // Output
    /// Where the extracted records are written
    pub output: PathBuf,
    /// Whether to fsync the output before it is moved into place
    pub sync_output: bool,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("files_report"),
            shard_suffix: DEFAULT_SHARD_SUFFIX.to_string(),
            timestamp_column: 1,
            has_headers: false,
            delimiter: b',',

            output: PathBuf::from("final_result.csv"),
            sync_output: true,
        }
    }
}

impl ExtractConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the shard directory
    pub fn with_directory<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.directory = path.as_ref().to_path_buf();
        self
    }

    /// Set the shard file suffix
    pub fn with_shard_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.shard_suffix = suffix.into();
        self
    }

    /// Set the timestamp column
    pub fn with_timestamp_column(mut self, column: usize) -> Self {
        self.timestamp_column = column;
        self
    }

    /// Set whether shards carry a header row
    pub fn with_headers(mut self, has_headers: bool) -> Self {
        self.has_headers = has_headers;
        self
    }

    /// Set the CSV delimiter
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Set the output path
    pub fn with_output<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.output = path.as_ref().to_path_buf();
        self
    }

    /// Set whether to fsync the output
    pub fn with_sync_output(mut self, sync: bool) -> Self {
        self.sync_output = sync;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.directory.as_os_str().is_empty() {
            return Err(Error::config("Shard directory must not be empty"));
        }

        if self.shard_suffix.is_empty() {
            return Err(Error::config("Shard file suffix must not be empty"));
        }

        if self.shard_suffix.starts_with(|c: char| c.is_ascii_digit()) {
            return Err(Error::config(
                "Shard file suffix must not start with a digit",
            ));
        }

        if self.output.as_os_str().is_empty() || self.output.file_name().is_none() {
            return Err(Error::config("Output path must name a file"));
        }

        if matches!(self.delimiter, b'"' | b'\n' | b'\r') {
            return Err(Error::config(format!(
                "Delimiter {:?} cannot be used in CSV",
                self.delimiter as char
            )));
        }

        Ok(())
    }

    /// Options for the result writer
    pub fn write_options(&self) -> WriteOptions {
        WriteOptions {
            delimiter: self.delimiter,
            sync: self.sync_output,
        }
    }

    /// Create a human-readable string representation of the configuration
    pub fn to_string_pretty(&self) -> String {
        let mut result = String::new();

        result.push_str("=== Extraction Configuration ===\n\n");

        result.push_str("Input:\n");
        result.push_str(&format!("  Directory: {:?}\n", self.directory));
        result.push_str(&format!("  Shard Files: <id>{}\n", self.shard_suffix));
        result.push_str(&format!("  Timestamp Column: {}\n", self.timestamp_column));
        result.push_str(&format!("  Header Row: {}\n", self.has_headers));
        result.push_str(&format!("  Delimiter: {:?}\n", self.delimiter as char));

        result.push_str("\nOutput:\n");
        result.push_str(&format!("  Path: {:?}\n", self.output));
        result.push_str(&format!("  Sync: {}\n", self.sync_output));

        result
    }

    /// Load configuration from a JSON file; missing keys take default values
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file
    pub fn to_json_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}
