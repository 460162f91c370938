//! Compare-sql command implementation

use anyhow::{Context, Result};
use clap::Args;
use sqleval_core::sql::{sql_identical, sql_similarity};
use std::fs;
use std::path::PathBuf;

/// Arguments for the compare-sql command
#[derive(Debug, Args)]
pub struct CompareSqlArgs {
    /// First SQL script
    #[arg(value_name = "FIRST")]
    pub first: PathBuf,

    /// Second SQL script
    #[arg(value_name = "SECOND")]
    pub second: PathBuf,
}

/// Outcome of comparing two scripts
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SqlComparison {
    /// Equal after whitespace normalization
    pub identical: bool,
    /// Normalized Levenshtein similarity in `[0, 1]`
    pub similarity: f64,
}

impl CompareSqlArgs {
    /// Execute the compare-sql command
    pub fn execute(&self) -> Result<()> {
        let comparison = self.compare()?;
        println!("identical: {}", comparison.identical);
        println!("similarity: {:.3}", comparison.similarity);
        Ok(())
    }

    /// Read both scripts and compare them
    pub fn compare(&self) -> Result<SqlComparison> {
        let read = |path: &PathBuf| {
            fs::read_to_string(path)
                .with_context(|| format!("Failed to read file: {}", path.display()))
        };
        let first = read(&self.first)?;
        let second = read(&self.second)?;

        Ok(SqlComparison {
            identical: sql_identical(&first, &second),
            similarity: sql_similarity(&first, &second),
        })
    }
}
