//! Batch command implementation

use anyhow::{Context, Result};
use clap::Args;
use rayon::prelude::*;
use std::fs;
use std::path::PathBuf;

use super::compare::{load_config, load_expected, score_against};
use crate::error::CliError;
use crate::input::resolve_patterns;
use crate::output::{create_formatter, open_output, OutputFormat};
use crate::progress::ProgressReporter;

/// Arguments for the batch command
#[derive(Debug, Args)]
pub struct BatchArgs {
    /// Expected result table (.csv or .json)
    #[arg(short, long, value_name = "FILE")]
    pub expected: PathBuf,

    /// Produced result files or patterns (supports glob)
    #[arg(short, long, value_name = "FILE/PATTERN", required = true)]
    pub input: Vec<String>,

    /// Output file (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format (default: from config, else text)
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Only reorder columns and rows, leaving names and values untouched
    #[arg(long)]
    pub strict: bool,

    /// Number of worker threads (default: from config, else all CPUs)
    #[arg(short = 'j', long, value_name = "THREADS")]
    pub threads: Option<usize>,

    /// Suppress progress and log output
    #[arg(short, long)]
    pub quiet: bool,

    /// Increase verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl BatchArgs {
    /// Execute the batch command
    pub fn execute(&self) -> Result<()> {
        super::init_logging(self.verbose, self.quiet);
        log::debug!("Arguments: {:?}", self);

        let config = load_config(self.config.as_deref(), self.strict)?;
        let core = config.core_config();

        let mut files = resolve_patterns(&self.input)?;
        // a pattern like *.csv usually matches the expected file too
        if let Ok(expected_path) = fs::canonicalize(&self.expected) {
            files.retain(|path| fs::canonicalize(path).map_or(true, |p| p != expected_path));
        }
        if files.is_empty() {
            anyhow::bail!("No produced results left after excluding the expected file");
        }

        let expected = load_expected(&self.expected, &core)?;

        let threads = self
            .threads
            .filter(|&n| n > 0)
            .unwrap_or_else(|| config.performance.resolved_threads());
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .context("Failed to build thread pool")?;
        log::info!("scoring {} results on {} threads", files.len(), threads);

        let mut progress = ProgressReporter::new(self.quiet);
        progress.init_files(files.len() as u64);

        let results: Vec<_> = pool.install(|| {
            files
                .par_iter()
                .map(|path| {
                    let result = score_against(&expected, path, &core);
                    progress.file_completed(&path.display().to_string());
                    (path, result)
                })
                .collect()
        });
        progress.finish();

        let format = self.format.unwrap_or(config.output.default_format);
        let mut formatter = create_formatter(
            format,
            open_output(self.output.as_deref())?,
            config.output.pretty_json,
        );

        let mut failed = 0;
        for (path, result) in &results {
            match result {
                Ok(scores) => formatter.format_scores(&path.display().to_string(), scores)?,
                Err(e) => {
                    failed += 1;
                    eprintln!("✗ {}: {e:#}", path.display());
                }
            }
        }
        formatter.finish()?;

        if failed == results.len() {
            return Err(CliError::ProcessingError(format!(
                "all {failed} results failed to score"
            ))
            .into());
        }
        if failed > 0 {
            log::warn!("{failed} of {} results failed to score", results.len());
        }
        Ok(())
    }
}
