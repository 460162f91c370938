//! Generate config command implementation

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use crate::config::CliConfig;

/// Arguments for the generate-config command
#[derive(Debug, Args)]
pub struct GenerateConfigArgs {
    /// Output file path
    #[arg(short, long, value_name = "FILE", required = true)]
    pub output: PathBuf,
}

impl GenerateConfigArgs {
    /// Execute the generate-config command
    pub fn execute(&self) -> Result<()> {
        use std::fs;

        println!("Generating configuration template...");
        println!("  Output file: {}", self.output.display());

        let template = generate_template();

        fs::write(&self.output, template)
            .with_context(|| format!("Failed to write to {}", self.output.display()))?;

        println!("✓ Configuration template generated successfully!");
        println!();
        println!("Next steps:");
        println!("1. Edit the configuration file to adjust preprocessing and metrics");
        println!("2. Validate your configuration:");
        println!("   sqleval validate -c {}", self.output.display());
        println!("3. Use it for scoring:");
        println!(
            "   sqleval compare -e expected.csv -p produced.csv -c {}",
            self.output.display()
        );

        Ok(())
    }
}

fn toml_list(items: &[String]) -> String {
    let quoted: Vec<String> = items.iter().map(|item| format!("{item:?}")).collect();
    format!("[{}]", quoted.join(", "))
}

/// Commented template holding the default configuration
pub fn generate_template() -> String {
    let defaults = CliConfig::default();
    let preprocess = &defaults.preprocess;
    let metrics = &defaults.metrics;

    format!(
        r#"# sqleval configuration

# How expected and produced tables are canonicalized before comparison.
# Both tables always go through the same options.
[preprocess]
# Case folding of column names: "preserve", "lower" or "upper"
column_case = "lower"
# Case folding of text values
text_case = "preserve"
# Trim surrounding whitespace from text values
trim_text = {trim_text}
# Parse numeric-looking text ("42", "1.5", "1e3") into numbers
parse_numbers = {parse_numbers}
# Round reals to this many decimal places (unset keeps full precision)
# round_reals = 6
# Text values, after trimming, that are read as NULL
null_markers = {null_markers}
# Collapse duplicate rows before comparing
deduplicate_rows = {deduplicate_rows}

[metrics]
# Columns ignored by the relaxed_* metrics (generated surrogate ids)
relaxed_exclude = {relaxed_exclude}
# Minimum normalized Levenshtein similarity for a textual row match
textual_threshold = {textual_threshold}
# Decimal places kept in reported scores (remove to keep full precision)
round_digits = {round_digits}

[output]
# Default format: "text", "json" or "markdown"
default_format = "text"
# Pretty print JSON output
pretty_json = {pretty_json}

[performance]
# Worker threads for batch scoring (0 = number of CPUs)
worker_threads = {worker_threads}
"#,
        trim_text = preprocess.trim_text,
        parse_numbers = preprocess.parse_numbers,
        null_markers = toml_list(&preprocess.null_markers),
        deduplicate_rows = preprocess.deduplicate_rows,
        relaxed_exclude = toml_list(&metrics.relaxed_exclude),
        textual_threshold = metrics.textual_threshold,
        round_digits = metrics.round_digits.unwrap_or_default(),
        pretty_json = defaults.output.pretty_json,
        worker_threads = defaults.performance.worker_threads,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_generate_config_args_debug() {
        let args = GenerateConfigArgs {
            output: PathBuf::from("sqleval.toml"),
        };

        let debug_str = format!("{:?}", args);
        assert!(debug_str.contains("GenerateConfigArgs"));
        assert!(debug_str.contains("sqleval.toml"));
    }

    #[test]
    fn test_template_holds_defaults() {
        let template = generate_template();
        assert!(template.contains("[preprocess]"));
        assert!(template.contains("[metrics]"));
        assert!(template.contains(r#"null_markers = ["", "NULL", "null", "NaN", "nan", "None", "<NA>"]"#));

        let parsed: CliConfig = toml::from_str(&template).unwrap();
        assert_eq!(parsed, CliConfig::default());
    }

    #[test]
    fn test_execute_success() {
        let temp_dir = TempDir::new().unwrap();
        let output_path = temp_dir.path().join("sqleval.toml");

        let args = GenerateConfigArgs {
            output: output_path.clone(),
        };

        assert!(args.execute().is_ok());
        let content = std::fs::read_to_string(&output_path).unwrap();
        assert!(content.contains("textual_threshold = 0.75"));
        assert!(CliConfig::load(&output_path).is_ok());
    }
}
