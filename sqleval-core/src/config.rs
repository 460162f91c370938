//! Evaluation configuration

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Default configuration constants
pub mod defaults {
    /// Column dropped by the relaxed metrics (a generated surrogate id)
    pub const RELAXED_EXCLUDE: &[&str] = &["activity_id"];

    /// Minimum normalized similarity for a textual row match
    pub const TEXTUAL_THRESHOLD: f64 = 0.75;

    /// Decimal places kept in the score mapping
    pub const ROUND_DIGITS: u32 = 3;

    /// Text values read as `NULL`
    pub const NULL_MARKERS: &[&str] = &["", "NULL", "null", "NaN", "nan", "None", "<NA>"];
}

/// Case folding applied to names or text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseMode {
    /// Keep as is
    #[default]
    Preserve,
    /// Convert to lower case
    Lower,
    /// Convert to upper case
    Upper,
}

impl CaseMode {
    /// Apply the case folding to a string
    pub fn apply(self, text: &str) -> String {
        match self {
            CaseMode::Preserve => text.to_string(),
            CaseMode::Lower => text.to_lowercase(),
            CaseMode::Upper => text.to_uppercase(),
        }
    }
}

/// Options controlling how a table is brought into canonical form
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessOptions {
    /// Case folding of column names
    pub column_case: CaseMode,
    /// Case folding of text values
    pub text_case: CaseMode,
    /// Trim surrounding whitespace from text values
    pub trim_text: bool,
    /// Parse numeric-looking text into numbers
    pub parse_numbers: bool,
    /// Round reals to this many decimal places
    pub round_reals: Option<u32>,
    /// Text values (after trimming) that mean `NULL`
    pub null_markers: Vec<String>,
    /// Collapse duplicate rows
    pub deduplicate_rows: bool,
}

impl Default for PreprocessOptions {
    fn default() -> Self {
        Self {
            column_case: CaseMode::Lower,
            text_case: CaseMode::Preserve,
            trim_text: true,
            parse_numbers: true,
            round_reals: None,
            null_markers: defaults::NULL_MARKERS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            deduplicate_rows: false,
        }
    }
}

impl PreprocessOptions {
    /// Options that only reorder, leaving names and values untouched
    pub fn strict() -> Self {
        Self {
            column_case: CaseMode::Preserve,
            text_case: CaseMode::Preserve,
            trim_text: false,
            parse_numbers: false,
            round_reals: None,
            null_markers: Vec::new(),
            deduplicate_rows: false,
        }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if let Some(digits) = self.round_reals {
            if digits > 15 {
                return Err(Error::Configuration(format!(
                    "round_reals must be at most 15, got {digits}"
                )));
            }
        }
        Ok(())
    }
}

/// Options controlling metric computation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricOptions {
    /// Columns ignored by the relaxed metrics
    pub relaxed_exclude: Vec<String>,
    /// Minimum similarity in `[0, 1]` for a textual row match
    pub textual_threshold: f64,
    /// Decimal places kept in the score mapping (`None` keeps full precision)
    pub round_digits: Option<u32>,
}

impl Default for MetricOptions {
    fn default() -> Self {
        Self {
            relaxed_exclude: defaults::RELAXED_EXCLUDE
                .iter()
                .map(|s| s.to_string())
                .collect(),
            textual_threshold: defaults::TEXTUAL_THRESHOLD,
            round_digits: Some(defaults::ROUND_DIGITS),
        }
    }
}

impl MetricOptions {
    pub(crate) fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.textual_threshold) {
            return Err(Error::Configuration(format!(
                "textual_threshold must be within [0, 1], got {}",
                self.textual_threshold
            )));
        }
        if let Some(digits) = self.round_digits {
            if digits > 15 {
                return Err(Error::Configuration(format!(
                    "round_digits must be at most 15, got {digits}"
                )));
            }
        }
        Ok(())
    }
}

/// Complete evaluation configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Preprocessing options
    pub preprocess: PreprocessOptions,
    /// Metric options
    pub metrics: MetricOptions,
}

impl Config {
    /// Create a configuration builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Check option ranges
    pub fn validate(&self) -> Result<()> {
        self.preprocess.validate()?;
        self.metrics.validate()
    }
}

/// Fluent builder for configuration
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new configuration builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from strict preprocessing (reorder only)
    pub fn strict(mut self) -> Self {
        self.config.preprocess = PreprocessOptions::strict();
        self
    }

    /// Set column name case folding
    pub fn column_case(mut self, mode: CaseMode) -> Self {
        self.config.preprocess.column_case = mode;
        self
    }

    /// Set text value case folding
    pub fn text_case(mut self, mode: CaseMode) -> Self {
        self.config.preprocess.text_case = mode;
        self
    }

    /// Enable or disable whitespace trimming
    pub fn trim_text(mut self, enabled: bool) -> Self {
        self.config.preprocess.trim_text = enabled;
        self
    }

    /// Enable or disable numeric parsing of text
    pub fn parse_numbers(mut self, enabled: bool) -> Self {
        self.config.preprocess.parse_numbers = enabled;
        self
    }

    /// Round reals to a number of decimal places
    pub fn round_reals(mut self, digits: Option<u32>) -> Self {
        self.config.preprocess.round_reals = digits;
        self
    }

    /// Replace the set of null markers
    pub fn null_markers<I, S>(mut self, markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.preprocess.null_markers = markers.into_iter().map(Into::into).collect();
        self
    }

    /// Collapse duplicate rows during preprocessing
    pub fn deduplicate_rows(mut self, enabled: bool) -> Self {
        self.config.preprocess.deduplicate_rows = enabled;
        self
    }

    /// Replace the columns ignored by relaxed metrics
    pub fn relaxed_exclude<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.metrics.relaxed_exclude = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Set the textual match threshold
    pub fn textual_threshold(mut self, threshold: f64) -> Self {
        self.config.metrics.textual_threshold = threshold;
        self
    }

    /// Set score rounding
    pub fn round_digits(mut self, digits: Option<u32>) -> Self {
        self.config.metrics.round_digits = digits;
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<Config> {
        self.config.validate()?;
        Ok(self.config)
    }
}
