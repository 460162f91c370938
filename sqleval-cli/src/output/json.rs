//! JSON output formatter

use super::OutputFormatter;
use anyhow::Result;
use serde::Serialize;
use sqleval_core::Scores;
use std::io::Write;

/// JSON formatter - outputs every report as one JSON array
pub struct JsonFormatter<W: Write> {
    writer: W,
    pretty: bool,
    reports: Vec<ScoreReport>,
}

/// Data structure for JSON output
#[derive(Debug, Serialize)]
pub struct ScoreReport {
    /// The produced result that was scored
    pub file: String,
    /// Metric name to score, in report order
    pub scores: Scores,
}

impl<W: Write> JsonFormatter<W> {
    /// Create a new JSON formatter
    pub fn new(writer: W, pretty: bool) -> Self {
        Self {
            writer,
            pretty,
            reports: Vec::new(),
        }
    }
}

impl<W: Write + Send + Sync> OutputFormatter for JsonFormatter<W> {
    fn format_scores(&mut self, label: &str, scores: &Scores) -> Result<()> {
        self.reports.push(ScoreReport {
            file: label.to_string(),
            scores: scores.clone(),
        });
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        if self.pretty {
            serde_json::to_writer_pretty(&mut self.writer, &self.reports)?;
        } else {
            serde_json::to_writer(&mut self.writer, &self.reports)?;
        }
        writeln!(self.writer)?;
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compact_array() {
        let mut scores = Scores::new();
        scores.insert("f1", 0.5);

        let mut formatter = JsonFormatter::new(Vec::new(), false);
        formatter.format_scores("out.csv", &scores).unwrap();
        formatter.finish().unwrap();

        let output = String::from_utf8(formatter.writer).unwrap();
        assert_eq!(output, "[{\"file\":\"out.csv\",\"scores\":{\"f1\":0.5}}]\n");
    }

    #[test]
    fn test_empty_array() {
        let mut formatter = JsonFormatter::new(Vec::new(), true);
        formatter.finish().unwrap();
        assert_eq!(String::from_utf8(formatter.writer).unwrap(), "[]\n");
    }
}
