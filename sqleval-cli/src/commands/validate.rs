//! Validate command implementation

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use crate::config::CliConfig;

/// Arguments for the validate command
#[derive(Debug, Args)]
pub struct ValidateArgs {
    /// Path to the configuration file to validate
    #[arg(short, long, value_name = "FILE", required = true)]
    pub config: PathBuf,
}

impl ValidateArgs {
    /// Execute the validate command
    pub fn execute(&self) -> Result<()> {
        println!("Validating configuration: {}", self.config.display());

        match CliConfig::load(&self.config) {
            Ok(config) => {
                println!("✓ Configuration is valid!");
                println!("  Column case: {:?}", config.preprocess.column_case);
                println!("  Text case: {:?}", config.preprocess.text_case);
                println!("  Null markers: {}", config.preprocess.null_markers.len());
                println!("  Relaxed exclude: {:?}", config.metrics.relaxed_exclude);
                println!("  Textual threshold: {}", config.metrics.textual_threshold);
                Ok(())
            }
            Err(e) => {
                println!("✗ Configuration is invalid!");
                println!("  Error: {e}");
                Err(anyhow::anyhow!("Validation failed: {}", e))
            }
        }
    }
}
