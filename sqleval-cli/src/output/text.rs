//! Plain text output formatter

use super::OutputFormatter;
use anyhow::Result;
use sqleval_core::Scores;
use std::io::Write;

/// Plain text formatter - one `name: score` line per metric
pub struct TextFormatter<W: Write> {
    writer: W,
    blocks: usize,
}

impl<W: Write> TextFormatter<W> {
    /// Create a new text formatter
    pub fn new(writer: W) -> Self {
        Self { writer, blocks: 0 }
    }
}

impl<W: Write + Send + Sync> OutputFormatter for TextFormatter<W> {
    fn format_scores(&mut self, label: &str, scores: &Scores) -> Result<()> {
        if self.blocks > 0 {
            writeln!(self.writer)?;
        }
        self.blocks += 1;

        writeln!(self.writer, "# {label}")?;
        for (name, score) in scores.iter() {
            writeln!(self.writer, "{name}: {score}")?;
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_blocks() {
        let mut scores = Scores::new();
        scores.insert("precision", 0.5);
        scores.insert("recall", 1.0);

        let mut formatter = TextFormatter::new(Vec::new());
        formatter.format_scores("a.csv", &scores).unwrap();
        formatter.format_scores("b.csv", &scores).unwrap();
        formatter.finish().unwrap();

        let output = String::from_utf8(formatter.writer).unwrap();
        assert_eq!(
            output,
            "# a.csv\nprecision: 0.5\nrecall: 1\n\n# b.csv\nprecision: 0.5\nrecall: 1\n"
        );
    }
}
