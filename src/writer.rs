//! Result writer
//!
//! Writes extracted records as CSV. Output goes to a temporary sibling first
//! and is renamed into place only after a successful flush, so a failed run
//! never leaves a truncated file at the destination.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::shard::Record;

/// Options for writing a result file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteOptions {
    /// Field delimiter
    pub delimiter: u8,
    /// Whether to fsync the file before renaming it into place
    pub sync: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            sync: true,
        }
    }
}

/// Temporary path used while writing `path`
fn staging_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "result".to_string());
    path.with_file_name(format!(".{}.partial", name))
}

/// Write `records` to `path`, replacing any existing file
pub fn write_result(path: &Path, records: &[Record], options: &WriteOptions) -> Result<()> {
    let staging = staging_path(path);

    if let Err(err) = write_records(&staging, records, options) {
        if let Err(cleanup) = fs::remove_file(&staging) {
            warn!(path = %staging.display(), error = %cleanup, "failed to remove partial output");
        }
        return Err(err);
    }

    fs::rename(&staging, path).map_err(|e| {
        Error::output(path, format!("Failed to move {} into place: {}", staging.display(), e))
    })?;

    debug!(path = %path.display(), records = records.len(), "wrote result");
    Ok(())
}

fn write_records(path: &Path, records: &[Record], options: &WriteOptions) -> Result<()> {
    let file = File::create(path)
        .map_err(|e| Error::output(path, format!("Failed to create output file: {}", e)))?;

    let mut writer = csv::WriterBuilder::new()
        .delimiter(options.delimiter)
        .flexible(true)
        .from_writer(file);

    for record in records {
        writer.write_record(record.fields())?;
    }

    writer.flush()?;
    let file = writer
        .into_inner()
        .map_err(|e| Error::output(path, format!("Failed to flush output: {}", e)))?;

    if options.sync {
        file.sync_all()?;
    }

    Ok(())
}
