//! CSV shard directories
//!
//! A dataset on disk is a flat directory holding `1_report.csv`,
//! `2_report.csv`, ... `N_report.csv`. The suffix is configurable.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::ExtractConfig;
use crate::shard::{Record, Shard, ShardError, ShardId, ShardResult, ShardSource};

/// Default file name suffix following the shard id
pub const DEFAULT_SHARD_SUFFIX: &str = "_report.csv";

/// Get the path for a shard file
pub fn shard_path(base_dir: &Path, shard_id: ShardId, suffix: &str) -> PathBuf {
    base_dir.join(format!("{}{}", shard_id, suffix))
}

/// Parse the shard id out of a file name, if it follows the `<id><suffix>` pattern
pub fn parse_shard_file_name(file_name: &str, suffix: &str) -> Option<ShardId> {
    let stem = file_name.strip_suffix(suffix)?;
    // Canonical decimal only: `01_report.csv` would never be opened by `shard_path`
    if stem.is_empty() || stem.starts_with('0') || !stem.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    stem.parse::<ShardId>().ok()
}

/// List all shard files in a directory, sorted by id
pub fn list_shard_files(base_dir: &Path, suffix: &str) -> ShardResult<Vec<(ShardId, PathBuf)>> {
    let entries = fs::read_dir(base_dir).map_err(|e| {
        ShardError::file_error(base_dir, format!("Failed to list shard directory: {}", e))
    })?;

    let mut result = Vec::new();

    for entry in entries {
        let entry = entry?;
        let path = entry.path();

        if !path.is_file() {
            continue;
        }

        match path
            .file_name()
            .and_then(|name| name.to_str())
            .and_then(|name| parse_shard_file_name(name, suffix))
        {
            Some(id) => result.push((id, path)),
            None => debug!(path = %path.display(), "ignoring non-shard file"),
        }
    }

    result.sort_by_key(|(id, _)| *id);
    Ok(result)
}

/// A directory of CSV shard files
#[derive(Debug, Clone)]
pub struct CsvShardDirectory {
    directory: PathBuf,
    suffix: String,
    timestamp_column: usize,
    has_headers: bool,
    delimiter: u8,
}

impl CsvShardDirectory {
    /// Open a directory with default naming (`<id>_report.csv`, timestamp in column 1, no headers)
    pub fn new<P: AsRef<Path>>(directory: P) -> Self {
        Self {
            directory: directory.as_ref().to_path_buf(),
            suffix: DEFAULT_SHARD_SUFFIX.to_string(),
            timestamp_column: 1,
            has_headers: false,
            delimiter: b',',
        }
    }

    /// Build from an extraction configuration
    pub fn from_config(config: &ExtractConfig) -> Self {
        Self {
            directory: config.directory.clone(),
            suffix: config.shard_suffix.clone(),
            timestamp_column: config.timestamp_column,
            has_headers: config.has_headers,
            delimiter: config.delimiter,
        }
    }

    /// Set the file name suffix
    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    /// Set the timestamp column
    pub fn with_timestamp_column(mut self, column: usize) -> Self {
        self.timestamp_column = column;
        self
    }

    /// Set whether each shard starts with a header row
    pub fn with_headers(mut self, has_headers: bool) -> Self {
        self.has_headers = has_headers;
        self
    }

    /// Set the field delimiter
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Path of one shard file
    pub fn path_of(&self, id: ShardId) -> PathBuf {
        shard_path(&self.directory, id, &self.suffix)
    }
}

impl ShardSource for CsvShardDirectory {
    fn shard_count(&self) -> ShardResult<usize> {
        let files = list_shard_files(&self.directory, &self.suffix)?;

        // Sorted ids must read 1, 2, 3, ...
        if let Some(missing) = files
            .iter()
            .enumerate()
            .find(|(index, (id, _))| *id != index + 1)
            .map(|(index, _)| index + 1)
        {
            return Err(ShardError::MissingShard {
                missing,
                found: files.len(),
            });
        }

        Ok(files.len())
    }

    fn read_shard(&self, id: ShardId) -> ShardResult<Shard> {
        let path = self.path_of(id);

        // The reader owns the file handle and drops it before this returns.
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(self.has_headers)
            .delimiter(self.delimiter)
            .flexible(true)
            .from_path(&path)
            .map_err(|e| match e.kind() {
                csv::ErrorKind::Io(io_err) if io_err.kind() == io::ErrorKind::NotFound => {
                    ShardError::NotFound(id)
                }
                _ => ShardError::csv(id, e),
            })?;

        let mut records = Vec::new();
        for row in reader.records() {
            let row = row.map_err(|e| ShardError::csv(id, e))?;
            records.push(Record::from(&row));
        }

        debug!(shard = id, records = records.len(), "loaded shard");
        Shard::new(id, self.timestamp_column, records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    fn write_shard(dir: &Path, id: ShardId, rows: &[&str]) -> io::Result<()> {
        let mut file = File::create(shard_path(dir, id, DEFAULT_SHARD_SUFFIX))?;
        for row in rows {
            writeln!(file, "{}", row)?;
        }
        Ok(())
    }

    #[test]
    fn test_shard_path() {
        let base = Path::new("/data/files_report");
        assert_eq!(
            shard_path(base, 12, DEFAULT_SHARD_SUFFIX),
            Path::new("/data/files_report/12_report.csv")
        );
    }

    #[test]
    fn test_parse_shard_file_name() {
        assert_eq!(parse_shard_file_name("1_report.csv", "_report.csv"), Some(1));
        assert_eq!(parse_shard_file_name("42_report.csv", "_report.csv"), Some(42));
        assert_eq!(parse_shard_file_name("0_report.csv", "_report.csv"), None);
        assert_eq!(parse_shard_file_name("01_report.csv", "_report.csv"), None);
        assert_eq!(parse_shard_file_name("_report.csv", "_report.csv"), None);
        assert_eq!(parse_shard_file_name("a1_report.csv", "_report.csv"), None);
        assert_eq!(parse_shard_file_name("+1_report.csv", "_report.csv"), None);
        assert_eq!(parse_shard_file_name("1_report.txt", "_report.csv"), None);
    }

    #[test]
    fn test_list_and_count() -> ShardResult<()> {
        let temp_dir = tempdir()?;
        write_shard(temp_dir.path(), 2, &["b,2024-01-02T00:00:00Z"])?;
        write_shard(temp_dir.path(), 1, &["a,2024-01-01T00:00:00Z"])?;
        File::create(temp_dir.path().join("README.md"))?;
        fs::create_dir(temp_dir.path().join("3_report.csv"))?;

        let files = list_shard_files(temp_dir.path(), DEFAULT_SHARD_SUFFIX)?;
        let ids: Vec<_> = files.iter().map(|(id, _)| *id).collect();
        assert_eq!(ids, vec![1, 2]);

        let source = CsvShardDirectory::new(temp_dir.path());
        assert_eq!(source.shard_count()?, 2);
        Ok(())
    }

    #[test]
    fn test_gap_in_ids_is_reported() -> ShardResult<()> {
        let temp_dir = tempdir()?;
        write_shard(temp_dir.path(), 1, &["a,2024-01-01T00:00:00Z"])?;
        write_shard(temp_dir.path(), 3, &["c,2024-01-03T00:00:00Z"])?;

        let err = CsvShardDirectory::new(temp_dir.path()).shard_count().unwrap_err();
        assert!(matches!(err, ShardError::MissingShard { missing: 2, found: 2 }));
        assert!(err.is_data_integrity());
        Ok(())
    }

    #[test]
    fn test_missing_directory() {
        let err = CsvShardDirectory::new("/definitely/not/here").shard_count().unwrap_err();
        assert!(err.is_io_error());
    }

    #[test]
    fn test_read_shard_preserves_order() -> ShardResult<()> {
        let temp_dir = tempdir()?;
        write_shard(
            temp_dir.path(),
            1,
            &[
                "1,2024-01-01T00:00:00+07:00,alpha",
                "2,2024-01-01T01:00:00+07:00,\"beta, quoted\"",
                "3,2024-01-01T02:00:00+07:00,gamma",
            ],
        )?;

        let shard = CsvShardDirectory::new(temp_dir.path()).read_shard(1)?;
        assert_eq!(shard.len(), 3);
        assert_eq!(shard.records()[1].field(2), Some("beta, quoted"));
        assert_eq!(shard.records()[2].field(0), Some("3"));
        Ok(())
    }

    #[test]
    fn test_read_shard_with_headers_and_column() -> ShardResult<()> {
        let temp_dir = tempdir()?;
        write_shard(temp_dir.path(), 1, &["when;id", "2024-01-01T00:00:00Z;1"])?;

        let source = CsvShardDirectory::new(temp_dir.path())
            .with_headers(true)
            .with_delimiter(b';')
            .with_timestamp_column(0);
        let shard = source.read_shard(1)?;
        assert_eq!(shard.len(), 1);
        assert_eq!(shard.first_timestamp()?.to_string(), "2024-01-01T00:00:00Z");
        Ok(())
    }

    #[test]
    fn test_read_missing_and_empty_shards() -> ShardResult<()> {
        let temp_dir = tempdir()?;
        File::create(shard_path(temp_dir.path(), 1, DEFAULT_SHARD_SUFFIX))?;

        let source = CsvShardDirectory::new(temp_dir.path());
        assert!(matches!(source.read_shard(1), Err(ShardError::Empty(1))));
        assert!(matches!(source.read_shard(2), Err(ShardError::NotFound(2))));
        Ok(())
    }
}
