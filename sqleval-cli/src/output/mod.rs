//! Output formatting module

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sqleval_core::Scores;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Trait for output formatters
pub trait OutputFormatter: Send + Sync {
    /// Format and output the scores of one produced result
    fn format_scores(&mut self, label: &str, scores: &Scores) -> Result<()>;

    /// Finalize output (e.g., close JSON array)
    fn finish(&mut self) -> Result<()>;
}

pub mod json;
pub mod markdown;
pub mod text;

pub use json::JsonFormatter;
pub use markdown::MarkdownFormatter;
pub use text::TextFormatter;

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// `name: score` lines, one block per result
    #[default]
    Text,
    /// JSON array of score reports
    Json,
    /// Markdown table with one row per result
    Markdown,
}

impl OutputFormat {
    /// All formats with a short description
    pub const ALL: [(OutputFormat, &'static str, &'static str); 3] = [
        (OutputFormat::Text, "text", "name: score lines, one block per result"),
        (OutputFormat::Json, "json", "JSON array of {file, scores} reports"),
        (OutputFormat::Markdown, "markdown", "Markdown table, one row per result"),
    ];
}

/// Sink for formatted output
pub type OutputSink = Box<dyn Write + Send + Sync>;

/// Open `path` for writing, or stdout when no path is given
pub fn open_output(path: Option<&Path>) -> Result<OutputSink> {
    match path {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path.display()))?;
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(io::stdout())),
    }
}

/// Build the formatter for `format` writing to `writer`
pub fn create_formatter(
    format: OutputFormat,
    writer: OutputSink,
    pretty_json: bool,
) -> Box<dyn OutputFormatter> {
    match format {
        OutputFormat::Text => Box::new(TextFormatter::new(writer)),
        OutputFormat::Json => Box::new(JsonFormatter::new(writer, pretty_json)),
        OutputFormat::Markdown => Box::new(MarkdownFormatter::new(writer)),
    }
}
