//! Configuration module
//!
//! The TOML file mirrors the core options (`[preprocess]`, `[metrics]`)
//! and adds CLI-only sections for output and performance.

use crate::error::CliError;
use crate::output::OutputFormat;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sqleval_core::{Config, MetricOptions, PreprocessOptions};
use std::fs;
use std::path::Path;

/// CLI configuration structure
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Default)]
pub struct CliConfig {
    /// Preprocessing options passed to the core
    #[serde(default)]
    pub preprocess: PreprocessOptions,

    /// Metric options passed to the core
    #[serde(default)]
    pub metrics: MetricOptions,

    /// Output configuration
    #[serde(default)]
    pub output: OutputConfig,

    /// Performance configuration
    #[serde(default)]
    pub performance: PerformanceConfig,
}

/// Output-related configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Default output format
    pub default_format: OutputFormat,

    /// Pretty print JSON output
    pub pretty_json: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            default_format: OutputFormat::Text,
            pretty_json: true,
        }
    }
}

/// Performance-related configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct PerformanceConfig {
    /// Number of worker threads for batch scoring (0 = auto)
    pub worker_threads: usize,
}

impl PerformanceConfig {
    /// Thread count to use, resolving 0 to the number of CPUs
    pub fn resolved_threads(&self) -> usize {
        match self.worker_threads {
            0 => num_cpus::get(),
            n => n,
        }
    }
}

impl CliConfig {
    /// Load and validate a configuration file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(CliError::FileNotFound(path.display().to_string()).into());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: CliConfig =
            toml::from_str(&content).map_err(|e| CliError::ConfigError(e.to_string()))?;
        config.validate()?;

        log::debug!("loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Load the given file, or fall back to defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// The options handed to the core library
    pub fn core_config(&self) -> Config {
        Config {
            preprocess: self.preprocess.clone(),
            metrics: self.metrics.clone(),
        }
    }

    /// Check option ranges
    pub fn validate(&self) -> Result<()> {
        self.core_config().validate().map_err(CliError::from)?;
        Ok(())
    }
}
