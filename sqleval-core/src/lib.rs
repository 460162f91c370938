//! Scoring of LLM-generated SQL results against an expected result
//!
//! A generated query is judged by the table it returns, not by its text.
//! Both the expected and the produced table are first brought into a
//! canonical form (normalized column names and values, columns sorted by
//! name, rows sorted), so that column order, row order and cosmetic
//! differences in values do not count as errors. The canonical tables are
//! then compared with a family of metrics:
//!
//! - **Exact and schema match**: strict structural agreement
//! - **Row overlap**: precision, recall and F1 over row multisets
//! - **Cell overlap**: partial credit for rows that are nearly right
//! - **Relaxed overlap**: row overlap ignoring generated id columns
//! - **Textual overlap**: fuzzy row matching by edit distance
//!
//! # Example
//!
//! ```rust
//! use sqleval_core::{compare, Config, Table, Value};
//!
//! let expected = Table::new(
//!     vec!["id".into(), "name".into()],
//!     vec![
//!         vec![Value::from(1), Value::from("a")],
//!         vec![Value::from(2), Value::from("b")],
//!     ],
//! )?;
//! let produced = Table::new(
//!     vec!["Name".into(), "ID".into()],
//!     vec![
//!         vec![Value::from("b"), Value::from("2")],
//!         vec![Value::from("a"), Value::from(1.0)],
//!     ],
//! )?;
//!
//! let scores = compare(expected, produced, &Config::default())?;
//! assert_eq!(scores.get("exact_match"), Some(1.0));
//! assert_eq!(scores.get("f1"), Some(1.0));
//! # Ok::<(), sqleval_core::Error>(())
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod metrics;
pub mod preprocess;
pub mod sql;
pub mod table;
pub mod value;

pub use config::{CaseMode, Config, ConfigBuilder, MetricOptions, PreprocessOptions};
pub use error::{DataFormatError, Error, PreconditionError, Result};
pub use metrics::{evaluate, Evaluation, Overlap, Scores, METRICS};
pub use preprocess::{canonicalize, CanonicalTable};
pub use table::Table;
pub use value::Value;

/// Canonicalize both tables and compute the rounded score mapping
///
/// This is the one-call path used by the command line front end; callers
/// needing the raw [`Evaluation`] can run [`canonicalize`] and [`evaluate`]
/// themselves.
pub fn compare(expected: Table, produced: Table, config: &Config) -> Result<Scores> {
    config.validate()?;
    let expected = canonicalize(expected, &config.preprocess)?;
    let produced = canonicalize(produced, &config.preprocess)?;
    let evaluation = evaluate(&expected, &produced, &config.metrics)?;
    Ok(evaluation.scores(config.metrics.round_digits))
}
