//! Extract-sql command implementation

use anyhow::{Context, Result};
use clap::Args;
use sqleval_core::sql::extract_sql_statement;
use std::fs;
use std::path::PathBuf;

/// Arguments for the extract-sql command
#[derive(Debug, Args)]
pub struct ExtractSqlArgs {
    /// File holding the LLM response
    #[arg(short, long, value_name = "FILE")]
    pub input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

impl ExtractSqlArgs {
    /// Execute the extract-sql command
    pub fn execute(&self) -> Result<()> {
        let response = fs::read_to_string(&self.input)
            .with_context(|| format!("Failed to read file: {}", self.input.display()))?;
        let statement = extract_sql_statement(&response);

        match &self.output {
            Some(path) => fs::write(path, format!("{statement}\n"))
                .with_context(|| format!("Failed to write to {}", path.display()))?,
            None => println!("{statement}"),
        }
        Ok(())
    }
}
