//! Similarity metrics between an expected and a produced result
//!
//! Every metric is a pure function of two [`CanonicalTable`]s. Metrics keep
//! structural correctness ([`schema_match`]), strict correctness
//! ([`exact_match`]) and content correctness (the overlap family) apart, so
//! a result with the right data in the wrong shape scores differently from
//! one that is simply wrong.
//!
//! # Empty results
//!
//! When the expected table has no rows, every overlap metric is `1.0` if
//! the produced table has no rows either and `0.0` otherwise. A produced
//! table without rows scores `0.0` against a non-empty expected table.
//!
//! # Column mismatches
//!
//! Row, relaxed and textual overlap score `0.0` when the two results do
//! not hold the same columns (after the relaxed exclusions), since no
//! expected row can be present in a result that lacks some of its
//! columns. Cell overlap keeps giving partial credit on the shared
//! columns. Results sharing no column at all are rejected with
//! [`PreconditionError::NoSharedColumns`].

mod cells;
mod rows;
mod textual;

pub use cells::cell_overlap;
pub use rows::{relaxed_overlap, row_overlap};
pub use textual::textual_overlap;

use crate::config::MetricOptions;
use crate::error::{PreconditionError, Result};
use crate::preprocess::{normalize_column, CanonicalTable};
use crate::value::Value;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/// Metric names in report order, with a short description
pub const METRICS: &[(&str, &str)] = &[
    ("exact_match", "1 if both results hold the same columns and rows"),
    ("schema_match", "1 if both results have the same column names"),
    ("precision", "share of produced rows found in the expected result"),
    ("recall", "share of expected rows found in the produced result"),
    ("f1", "harmonic mean of row precision and recall"),
    ("cell_precision", "share of produced cells matching an expected cell"),
    ("cell_recall", "share of expected cells matched by a produced cell"),
    ("cell_f1", "harmonic mean of cell precision and recall"),
    ("relaxed_precision", "row precision ignoring excluded columns"),
    ("relaxed_recall", "row recall ignoring excluded columns"),
    ("relaxed_f1", "row F1 ignoring excluded columns"),
    ("textual_precision", "share of produced rows with a close textual match"),
    ("textual_recall", "share of expected rows with a close textual match"),
    ("textual_f1", "harmonic mean of textual precision and recall"),
];

/// Precision, recall and their harmonic mean
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Overlap {
    /// Matched share of the produced side
    pub precision: f64,
    /// Matched share of the expected side
    pub recall: f64,
    /// Harmonic mean of precision and recall
    pub f1: f64,
}

impl Overlap {
    /// All scores at 1.0
    pub const PERFECT: Overlap = Overlap {
        precision: 1.0,
        recall: 1.0,
        f1: 1.0,
    };

    /// All scores at 0.0
    pub const NONE: Overlap = Overlap {
        precision: 0.0,
        recall: 0.0,
        f1: 0.0,
    };

    /// Build from a matched count and the size of each side
    pub fn from_counts(matched: usize, expected_total: usize, produced_total: usize) -> Self {
        let ratio = |total: usize| {
            if total > 0 {
                matched as f64 / total as f64
            } else {
                0.0
            }
        };
        let precision = ratio(produced_total);
        let recall = ratio(expected_total);
        let f1 = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };

        Self {
            precision,
            recall,
            f1,
        }
    }
}

/// Ordered mapping from metric name to score
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scores {
    entries: Vec<(String, f64)>,
}

impl Scores {
    /// Create an empty mapping
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a score, keeping first-insertion order
    pub fn insert(&mut self, name: impl Into<String>, value: f64) {
        let name = name.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Look up a score by name
    pub fn get(&self, name: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| *value)
    }

    /// Iterate over `(name, score)` pairs in order
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), *value))
    }

    /// Number of scores
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the mapping is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for Scores {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Every metric for one comparison
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    /// Same columns and same row multiset
    pub exact_match: bool,
    /// Same column name set
    pub schema_match: bool,
    /// Row-level overlap, zero when the column sets differ
    pub rows: Overlap,
    /// Cell-level overlap
    pub cells: Overlap,
    /// Row-level overlap without the excluded columns
    pub relaxed: Overlap,
    /// Fuzzy textual row overlap
    pub textual: Overlap,
    /// Rows in the expected table
    pub expected_rows: usize,
    /// Rows in the produced table
    pub produced_rows: usize,
}

impl Evaluation {
    /// Flatten into a score mapping, rounded to `round_digits` if given
    pub fn scores(&self, round_digits: Option<u32>) -> Scores {
        let round = |value: f64| match round_digits {
            Some(digits) => {
                let factor = 10f64.powi(digits as i32);
                (value * factor).round() / factor
            }
            None => value,
        };
        let flag = |value: bool| if value { 1.0 } else { 0.0 };

        let mut scores = Scores::new();
        scores.insert("exact_match", flag(self.exact_match));
        scores.insert("schema_match", flag(self.schema_match));
        for (prefix, overlap) in [
            ("", &self.rows),
            ("cell_", &self.cells),
            ("relaxed_", &self.relaxed),
            ("textual_", &self.textual),
        ] {
            scores.insert(format!("{prefix}precision"), round(overlap.precision));
            scores.insert(format!("{prefix}recall"), round(overlap.recall));
            scores.insert(format!("{prefix}f1"), round(overlap.f1));
        }
        scores
    }
}

/// Both tables must come from the same preprocessing.
pub(crate) fn check_comparable(
    expected: &CanonicalTable,
    produced: &CanonicalTable,
) -> Result<()> {
    if expected.options() != produced.options() {
        return Err(PreconditionError::OptionsMismatch.into());
    }
    Ok(())
}

/// The fixed outcome when either table has no rows, if it applies.
///
/// An empty produced result may carry no columns at all (an empty JSON
/// array or CSV file), so this runs before any column is resolved.
pub(crate) fn empty_policy(
    expected: &CanonicalTable,
    produced: &CanonicalTable,
) -> Option<Overlap> {
    match (expected.is_empty(), produced.is_empty()) {
        (true, true) => Some(Overlap::PERFECT),
        (true, false) | (false, true) => Some(Overlap::NONE),
        (false, false) => None,
    }
}

/// Positions of the columns both tables share.
///
/// Columns are sorted in canonical tables, so both index lists follow the
/// same column order.
pub(crate) fn shared_columns(
    expected: &CanonicalTable,
    produced: &CanonicalTable,
) -> Result<(Vec<usize>, Vec<usize>)> {
    let mut expected_indices = Vec::new();
    let mut produced_indices = Vec::new();
    for (i, column) in expected.columns().iter().enumerate() {
        if let Ok(j) = produced.columns().binary_search(column) {
            expected_indices.push(i);
            produced_indices.push(j);
        }
    }

    if expected_indices.is_empty() {
        return Err(PreconditionError::NoSharedColumns {
            expected: expected.columns().to_vec(),
            produced: produced.columns().to_vec(),
        }
        .into());
    }
    Ok((expected_indices, produced_indices))
}

/// Positions of the compared columns when both tables hold the same
/// column set once `exclude` is removed, `None` otherwise.
///
/// A row can only be present in the other result when every one of its
/// columns is, so row-level metrics score a column mismatch as no match.
pub(crate) fn aligned_columns(
    expected: &CanonicalTable,
    produced: &CanonicalTable,
    exclude: &[String],
) -> Option<(Vec<usize>, Vec<usize>)> {
    let excluded: Vec<String> = exclude
        .iter()
        .map(|name| normalize_column(name, expected.options()))
        .collect();
    let kept = |columns: &[String]| -> Vec<usize> {
        columns
            .iter()
            .enumerate()
            .filter(|(_, column)| !excluded.contains(column))
            .map(|(i, _)| i)
            .collect()
    };

    let expected_indices = kept(expected.columns());
    let produced_indices = kept(produced.columns());
    let same_names = expected_indices.len() == produced_indices.len()
        && expected_indices
            .iter()
            .zip(&produced_indices)
            .all(|(&i, &j)| expected.columns()[i] == produced.columns()[j]);

    same_names.then_some((expected_indices, produced_indices))
}

/// Borrowed projection of a row onto the given positions
pub(crate) fn project<'a>(row: &'a [Value], indices: &[usize]) -> Vec<&'a Value> {
    indices.iter().map(|&i| &row[i]).collect()
}

/// Whether both results hold the same columns and the same row multiset
pub fn exact_match(expected: &CanonicalTable, produced: &CanonicalTable) -> Result<bool> {
    check_comparable(expected, produced)?;
    Ok(expected.columns() == produced.columns() && expected.rows() == produced.rows())
}

/// Whether both results have the same set of column names
pub fn schema_match(expected: &CanonicalTable, produced: &CanonicalTable) -> Result<bool> {
    check_comparable(expected, produced)?;
    Ok(expected.columns() == produced.columns())
}

/// Compute every metric for one comparison
///
/// Both tables are re-validated against the canonical invariants first;
/// tables that were not canonicalized with identical options are rejected.
pub fn evaluate(
    expected: &CanonicalTable,
    produced: &CanonicalTable,
    options: &MetricOptions,
) -> Result<Evaluation> {
    options.validate()?;
    expected.validate()?;
    produced.validate()?;
    check_comparable(expected, produced)?;

    log::debug!(
        "evaluating {} expected rows against {} produced rows",
        expected.num_rows(),
        produced.num_rows()
    );

    let evaluation = Evaluation {
        exact_match: exact_match(expected, produced)?,
        schema_match: schema_match(expected, produced)?,
        rows: row_overlap(expected, produced)?,
        cells: cell_overlap(expected, produced)?,
        relaxed: relaxed_overlap(expected, produced, &options.relaxed_exclude)?,
        textual: textual_overlap(expected, produced, options.textual_threshold)?,
        expected_rows: expected.num_rows(),
        produced_rows: produced.num_rows(),
    };

    log::trace!("evaluation: {evaluation:?}");
    Ok(evaluation)
}
