//! Markdown output formatter

use super::OutputFormatter;
use anyhow::Result;
use sqleval_core::Scores;
use std::io::Write;

/// Markdown formatter - outputs one table row per result
pub struct MarkdownFormatter<W: Write> {
    writer: W,
    result_count: usize,
}

impl<W: Write> MarkdownFormatter<W> {
    /// Create a new markdown formatter
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            result_count: 0,
        }
    }
}

impl<W: Write + Send + Sync> OutputFormatter for MarkdownFormatter<W> {
    fn format_scores(&mut self, label: &str, scores: &Scores) -> Result<()> {
        // header from the first report's metric names
        if self.result_count == 0 {
            let names: Vec<&str> = scores.iter().map(|(name, _)| name).collect();
            writeln!(self.writer, "| file | {} |", names.join(" | "))?;
            writeln!(self.writer, "|---|{}", "---|".repeat(names.len()))?;
        }
        self.result_count += 1;

        let values: Vec<String> = scores.iter().map(|(_, score)| score.to_string()).collect();
        writeln!(self.writer, "| {} | {} |", label, values.join(" | "))?;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        writeln!(self.writer)?;
        writeln!(self.writer, "---")?;
        writeln!(self.writer, "*Total results: {}*", self.result_count)?;
        self.writer.flush()?;
        Ok(())
    }
}
