//! Compare command implementation

use anyhow::{Context, Result};
use clap::Args;
use sqleval_core::{canonicalize, evaluate, CanonicalTable, Config, PreprocessOptions, Scores};
use std::path::{Path, PathBuf};

use crate::config::CliConfig;
use crate::input::read_table;
use crate::output::{create_formatter, open_output, OutputFormat};

/// Arguments for the compare command
#[derive(Debug, Args)]
pub struct CompareArgs {
    /// Expected result table (.csv or .json)
    #[arg(short, long, value_name = "FILE")]
    pub expected: PathBuf,

    /// Produced result table (.csv or .json)
    #[arg(short, long, value_name = "FILE")]
    pub produced: PathBuf,

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

    /// Suppress log output
    #[arg(short, long)]
    pub quiet: bool,

    /// Increase verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl CompareArgs {
    /// Execute the compare command
    pub fn execute(&self) -> Result<()> {
        super::init_logging(self.verbose, self.quiet);
        log::debug!("Arguments: {:?}", self);

        let config = load_config(self.config.as_deref(), self.strict)?;
        let core = config.core_config();
        let expected = load_expected(&self.expected, &core)?;
        let scores = score_against(&expected, &self.produced, &core)?;

        let format = self.format.unwrap_or(config.output.default_format);
        let mut formatter = create_formatter(
            format,
            open_output(self.output.as_deref())?,
            config.output.pretty_json,
        );
        formatter.format_scores(&self.produced.display().to_string(), &scores)?;
        formatter.finish()?;

        log::info!(
            "scored {} against {}",
            self.produced.display(),
            self.expected.display()
        );
        Ok(())
    }
}

/// Load the configuration, switching to strict preprocessing if asked
pub(crate) fn load_config(path: Option<&Path>, strict: bool) -> Result<CliConfig> {
    let mut config = CliConfig::load_or_default(path)?;
    if strict {
        config.preprocess = PreprocessOptions::strict();
    }
    Ok(config)
}

/// Read and canonicalize the expected table
pub(crate) fn load_expected(path: &Path, config: &Config) -> Result<CanonicalTable> {
    let table = read_table(path)?;
    canonicalize(table, &config.preprocess)
        .with_context(|| format!("Failed to canonicalize expected result: {}", path.display()))
}

/// Read one produced table and score it against the canonical expected table
pub(crate) fn score_against(
    expected: &CanonicalTable,
    produced: &Path,
    config: &Config,
) -> Result<Scores> {
    let table = read_table(produced)?;
    let produced_table = canonicalize(table, &config.preprocess)
        .with_context(|| format!("Failed to canonicalize produced result: {}", produced.display()))?;
    let evaluation = evaluate(expected, &produced_table, &config.metrics)
        .with_context(|| format!("Failed to score {}", produced.display()))?;

    log::debug!(
        "{}: {} expected rows, {} produced rows",
        produced.display(),
        evaluation.expected_rows,
        evaluation.produced_rows
    );
    Ok(evaluation.scores(config.metrics.round_digits))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn args(dir: &TempDir, expected: &str, produced: &str) -> CompareArgs {
        let expected_path = dir.path().join("expected.csv");
        let produced_path = dir.path().join("produced.csv");
        fs::write(&expected_path, expected).unwrap();
        fs::write(&produced_path, produced).unwrap();

        CompareArgs {
            expected: expected_path,
            produced: produced_path,
            output: Some(dir.path().join("scores.txt")),
            format: None,
            config: None,
            strict: false,
            quiet: true,
            verbose: 0,
        }
    }

    #[test]
    fn test_score_against() {
        let dir = TempDir::new().unwrap();
        let args = args(&dir, "id,name\n1,a\n2,b\n", "name,id\na,1\nc,3\n");
        let config = Config::default();

        let expected = load_expected(&args.expected, &config).unwrap();
        let scores = score_against(&expected, &args.produced, &config).unwrap();
        assert_eq!(scores.get("f1"), Some(0.5));
        assert_eq!(scores.get("schema_match"), Some(1.0));
    }

    #[test]
    fn test_execute_writes_report() {
        let dir = TempDir::new().unwrap();
        let args = args(&dir, "id\n1\n", "ID\n1.0\n");
        args.execute().unwrap();

        let report = fs::read_to_string(args.output.as_ref().unwrap()).unwrap();
        assert!(report.contains("exact_match: 1\n"));
        assert!(report.contains("textual_f1: 1\n"));
    }

    #[test]
    fn test_strict_mode() {
        let dir = TempDir::new().unwrap();
        let args = args(&dir, "id\n1\n", "ID\n1.0\n");

        let config = load_config(None, true).unwrap().core_config();
        let expected = load_expected(&args.expected, &config).unwrap();
        let err = score_against(&expected, &args.produced, &config).unwrap_err();
        // "id" and "ID" share no column without case folding
        assert!(format!("{err:#}").contains("no shared columns"));
    }
}
