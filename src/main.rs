use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use shardrange_rs::{CsvShardDirectory, ExtractConfig, Extractor, Outcome, Result, TimeRange};

#[derive(Parser, Debug)]
#[command(
    name = "shardrange",
    version,
    about = "Extract a [start, end) time range from timestamp-sorted CSV shards"
)]
struct Cli {
    /// Directory holding <id>_report.csv shards [default: files_report]
    #[arg(short, long)]
    dir: Option<PathBuf>,
    /// Inclusive start time (RFC 3339)
    #[arg(short, long, default_value = "2023-12-10T16:39:13+07:00")]
    start: String,
    /// Exclusive end time (RFC 3339)
    #[arg(short, long, default_value = "2024-02-20T19:04:18+07:00")]
    end: String,
    /// Result file [default: final_result.csv]
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Zero-based timestamp column [default: 1]
    #[arg(long)]
    column: Option<usize>,
    /// Shard file suffix after the id [default: _report.csv]
    #[arg(long)]
    suffix: Option<String>,
    /// Shards start with a header row
    #[arg(long, default_value_t = false)]
    headers: bool,
    /// JSON configuration file; flags override its values
    #[arg(long)]
    config: Option<PathBuf>,
    /// Print extraction metrics to stderr when done
    #[arg(long, default_value_t = false)]
    metrics: bool,
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

impl Cli {
    /// Apply the flags that were given on top of `config`
    fn apply_overrides(&self, mut config: ExtractConfig) -> ExtractConfig {
        if let Some(dir) = &self.dir {
            config.directory = dir.clone();
        }
        if let Some(output) = &self.output {
            config.output = output.clone();
        }
        if let Some(column) = self.column {
            config.timestamp_column = column;
        }
        if let Some(suffix) = &self.suffix {
            config.shard_suffix = suffix.clone();
        }
        if self.headers {
            config.has_headers = true;
        }
        config
    }

    fn load_config(&self) -> Result<ExtractConfig> {
        let base = match &self.config {
            Some(path) => ExtractConfig::from_json_file(path)?,
            None => ExtractConfig::default(),
        };

        let config = self.apply_overrides(base);
        config.validate()?;
        Ok(config)
    }
}

fn run(cli: &Cli) -> Result<Outcome> {
    let config = cli.load_config()?;
    debug!("\n{}", config.to_string_pretty());

    let range = TimeRange::parse(&cli.start, &cli.end)?;
    let extractor = Extractor::new(CsvShardDirectory::from_config(&config));
    let extraction = extractor.extract_to_file(&range, &config.output, &config.write_options())?;

    match extraction.outcome {
        Outcome::Extracted => info!(
            records = extraction.records.len(),
            output = %config.output.display(),
            "extraction complete"
        ),
        Outcome::NoData => info!(range = %range, "data not found"),
    }

    if cli.metrics {
        eprint!("{}", extractor.metrics().get_report());
    }

    Ok(extraction.outcome)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    match run(&cli) {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{}", err);
            if let Some(suggestion) = err.suggestion() {
                eprintln!("hint: {}", suggestion);
            }
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_without_flags() -> Result<()> {
        let cli = Cli::try_parse_from(["shardrange"]).unwrap();

        assert_eq!(cli.start, "2023-12-10T16:39:13+07:00");
        assert_eq!(cli.end, "2024-02-20T19:04:18+07:00");
        assert!(TimeRange::parse(&cli.start, &cli.end).is_ok());
        assert_eq!(cli.load_config()?, ExtractConfig::default());
        Ok(())
    }

    #[test]
    fn test_flags_override_config_file() -> Result<()> {
        let temp_dir = tempdir()?;
        let path = temp_dir.path().join("extract.json");
        ExtractConfig::new()
            .with_directory("from_file")
            .with_output("file_output.csv")
            .with_timestamp_column(4)
            .with_delimiter(b';')
            .to_json_file(&path)?;

        let cli = Cli::try_parse_from([
            "shardrange",
            "--config",
            path.to_str().unwrap(),
            "-d",
            "from_flag",
            "--column",
            "2",
            "--headers",
        ])
        .unwrap();
        let config = cli.load_config()?;

        assert_eq!(config.directory, PathBuf::from("from_flag"));
        assert_eq!(config.timestamp_column, 2);
        assert!(config.has_headers);
        // Values without a flag come from the file
        assert_eq!(config.output, PathBuf::from("file_output.csv"));
        assert_eq!(config.delimiter, b';');
        Ok(())
    }

    #[test]
    fn test_invalid_override_is_rejected() {
        let cli = Cli::try_parse_from(["shardrange", "--suffix", ""]).unwrap();

        let err = cli.load_config().unwrap_err();
        assert!(matches!(err, shardrange_rs::Error::Config(_)));
    }
}
