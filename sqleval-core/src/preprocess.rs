//! Canonicalization of tabular results
//!
//! A [`CanonicalTable`] is a [`Table`] whose column order, row order and
//! value representation no longer depend on how the query happened to
//! produce them. Two results holding the same logical content canonicalize
//! to identical tables.

use crate::config::PreprocessOptions;
use crate::error::DataFormatError;
use crate::table::Table;
use crate::value::Value;
use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

/// Largest magnitude at which every integer is exactly representable as f64.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

static INTEGER_LITERAL: OnceLock<Regex> = OnceLock::new();
static DECIMAL_LITERAL: OnceLock<Regex> = OnceLock::new();

fn integer_literal() -> &'static Regex {
    // a lone zero, or digits without a leading zero
    INTEGER_LITERAL.get_or_init(|| Regex::new(r"^[+-]?(0|[1-9][0-9]*)$").expect("valid regex"))
}

fn decimal_literal() -> &'static Regex {
    DECIMAL_LITERAL.get_or_init(|| {
        Regex::new(r"^[+-]?((0|[1-9][0-9]*)(\.[0-9]*)?|\.[0-9]+)([eE][+-]?[0-9]+)?$")
            .expect("valid regex")
    })
}

/// Parse a plain decimal literal into a number
///
/// Returns `None` for anything that is not an unsigned or signed integer,
/// decimal fraction or exponent literal. Identifier-like strings with a
/// leading zero (`"007"`) are not numbers.
pub fn parse_numeric(text: &str) -> Option<Value> {
    if integer_literal().is_match(text) {
        if let Ok(integer) = text.parse::<i64>() {
            return Some(Value::Integer(integer));
        }
        // out of i64 range, fall through to a real
    }
    if decimal_literal().is_match(text) {
        if let Ok(real) = text.parse::<f64>() {
            if real.is_finite() {
                return Some(Value::Real(real));
            }
        }
    }
    None
}

fn round_to(real: f64, digits: u32) -> f64 {
    let factor = 10f64.powi(digits as i32);
    let rounded = (real * factor).round() / factor;
    if rounded.is_finite() {
        rounded
    } else {
        real
    }
}

fn normalize_real(real: f64, options: &PreprocessOptions) -> Value {
    if real.is_nan() {
        return Value::Null;
    }
    let real = match options.round_reals {
        Some(digits) => round_to(real, digits),
        None => real,
    };
    if real.fract() == 0.0 && real.abs() < MAX_EXACT_INTEGER {
        // also folds -0.0 into 0
        Value::Integer(real as i64)
    } else {
        Value::Real(real)
    }
}

fn normalize_text(text: String, options: &PreprocessOptions) -> Value {
    let trimmed = if options.trim_text {
        text.trim()
    } else {
        text.as_str()
    };

    let folded = options.text_case.apply(trimmed);
    // folding may turn text into a marker ("Nan" -> "nan"), so check both forms
    if options
        .null_markers
        .iter()
        .any(|marker| marker == trimmed || *marker == folded)
    {
        return Value::Null;
    }

    if options.parse_numbers {
        if let Some(number) = parse_numeric(trimmed) {
            return normalize_value(number, options);
        }
    }

    Value::Text(folded)
}

/// Normalize a single value to its canonical representation
pub fn normalize_value(value: Value, options: &PreprocessOptions) -> Value {
    match value {
        Value::Null => Value::Null,
        Value::Integer(integer) => Value::Integer(integer),
        Value::Real(real) => normalize_real(real, options),
        Value::Text(text) => normalize_text(text, options),
    }
}

/// Normalize a column name
pub fn normalize_column(name: &str, options: &PreprocessOptions) -> String {
    options.column_case.apply(name.trim())
}

/// A table in canonical form
///
/// Only obtainable through [`canonicalize`] or, for tables produced
/// elsewhere, through [`CanonicalTable::from_canonical`] which checks the
/// canonical invariants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalTable {
    table: Table,
    options: PreprocessOptions,
}

impl CanonicalTable {
    /// Accept a table that is claimed to be canonical already
    pub fn from_canonical(
        table: Table,
        options: PreprocessOptions,
    ) -> Result<Self, DataFormatError> {
        let canonical = Self { table, options };
        canonical.validate()?;
        Ok(canonical)
    }

    /// Check the canonical invariants
    ///
    /// Columns strictly increasing and normalized, rows non-decreasing (and
    /// distinct when deduplication is on), values normalized.
    pub fn validate(&self) -> Result<(), DataFormatError> {
        let columns = self.table.columns();

        for column in columns {
            if normalize_column(column, &self.options) != *column {
                return Err(DataFormatError::NotCanonical(format!(
                    "column '{column}' is not normalized"
                )));
            }
        }
        if let Some(pair) = columns.windows(2).find(|pair| pair[0] >= pair[1]) {
            return Err(DataFormatError::NotCanonical(format!(
                "columns '{}' and '{}' are out of order",
                pair[0], pair[1]
            )));
        }

        for (index, row) in self.table.rows().iter().enumerate() {
            if row.len() != columns.len() {
                return Err(DataFormatError::RaggedRow {
                    row: index,
                    expected: columns.len(),
                    found: row.len(),
                });
            }
            if let Some(value) = row
                .iter()
                .find(|value| normalize_value((*value).clone(), &self.options) != **value)
            {
                return Err(DataFormatError::NotCanonical(format!(
                    "row {index} holds unnormalized {} value '{value}'",
                    value.type_name()
                )));
            }
        }

        let rows = self.table.rows();
        if let Some(index) = (1..rows.len()).find(|&i| {
            if self.options.deduplicate_rows {
                rows[i - 1] >= rows[i]
            } else {
                rows[i - 1] > rows[i]
            }
        }) {
            return Err(DataFormatError::NotCanonical(format!(
                "row {index} is out of order"
            )));
        }

        Ok(())
    }

    /// The underlying table
    pub fn table(&self) -> &Table {
        &self.table
    }

    /// The options the table was canonicalized with
    pub fn options(&self) -> &PreprocessOptions {
        &self.options
    }

    /// Column names, sorted
    pub fn columns(&self) -> &[String] {
        self.table.columns()
    }

    /// Rows, sorted
    pub fn rows(&self) -> &[Vec<Value>] {
        self.table.rows()
    }

    /// Number of rows
    pub fn num_rows(&self) -> usize {
        self.table.num_rows()
    }

    /// Number of columns
    pub fn num_columns(&self) -> usize {
        self.table.num_columns()
    }

    /// Whether the table has no rows
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Release the underlying table
    pub fn into_table(self) -> Table {
        self.table
    }
}

/// Bring a table into canonical form
///
/// Column names are normalized and sorted, values normalized, rows sorted
/// with nulls first. Duplicate rows are kept unless
/// [`PreprocessOptions::deduplicate_rows`] is set. An empty table
/// canonicalizes to an empty table.
pub fn canonicalize(
    table: Table,
    options: &PreprocessOptions,
) -> Result<CanonicalTable, DataFormatError> {
    let (columns, rows) = table.into_parts();
    log::debug!(
        "canonicalizing table with {} columns and {} rows",
        columns.len(),
        rows.len()
    );

    let names: Vec<String> = columns
        .iter()
        .map(|column| normalize_column(column, options))
        .collect();

    let mut seen = HashSet::with_capacity(names.len());
    if let Some(duplicate) = names.iter().find(|name| !seen.insert(name.as_str())) {
        return Err(DataFormatError::DuplicateColumn(duplicate.clone()));
    }

    let mut order: Vec<usize> = (0..names.len()).collect();
    order.sort_by(|&a, &b| names[a].cmp(&names[b]));
    let sorted_names: Vec<String> = order.iter().map(|&i| names[i].clone()).collect();

    let mut sorted_rows = Vec::with_capacity(rows.len());
    for row in rows {
        let mut cells: Vec<Option<Value>> = row.into_iter().map(Some).collect();
        let normalized = order
            .iter()
            .map(|&i| normalize_value(cells[i].take().unwrap_or_default(), options))
            .collect();
        sorted_rows.push(normalized);
    }

    sorted_rows.sort();
    if options.deduplicate_rows {
        let before = sorted_rows.len();
        sorted_rows.dedup();
        log::trace!("dropped {} duplicate rows", before - sorted_rows.len());
    }

    Ok(CanonicalTable {
        table: Table::new(sorted_names, sorted_rows)?,
        options: options.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CaseMode;

    fn table(columns: &[&str], rows: Vec<Vec<Value>>) -> Table {
        Table::new(columns.iter().map(|c| c.to_string()).collect(), rows).unwrap()
    }

    #[test]
    fn test_parse_numeric_fixtures() {
        assert_eq!(parse_numeric("42"), Some(Value::Integer(42)));
        assert_eq!(parse_numeric("-7"), Some(Value::Integer(-7)));
        assert_eq!(parse_numeric("+3"), Some(Value::Integer(3)));
        assert_eq!(parse_numeric("0"), Some(Value::Integer(0)));
        assert_eq!(parse_numeric("1.5"), Some(Value::Real(1.5)));
        assert_eq!(parse_numeric(".5"), Some(Value::Real(0.5)));
        assert_eq!(parse_numeric("2."), Some(Value::Real(2.0)));
        assert_eq!(parse_numeric("1e3"), Some(Value::Real(1000.0)));
        assert_eq!(parse_numeric("0.25"), Some(Value::Real(0.25)));

        assert_eq!(parse_numeric("007"), None);
        assert_eq!(parse_numeric("1,000"), None);
        assert_eq!(parse_numeric("inf"), None);
        assert_eq!(parse_numeric("NaN"), None);
        assert_eq!(parse_numeric("0x1F"), None);
        assert_eq!(parse_numeric("2023-01-05"), None);
        assert_eq!(parse_numeric(""), None);
        assert_eq!(parse_numeric("1e999"), None);
    }

    #[test]
    fn test_parse_numeric_beyond_i64() {
        assert_eq!(
            parse_numeric("99999999999999999999"),
            Some(Value::Real(1e20))
        );
    }

    #[test]
    fn test_normalize_values() {
        let options = PreprocessOptions::default();
        assert_eq!(
            normalize_value(Value::from("  12 "), &options),
            Value::Integer(12)
        );
        assert_eq!(
            normalize_value(Value::from("3.0"), &options),
            Value::Integer(3)
        );
        assert_eq!(normalize_value(Value::from(2.0), &options), Value::Integer(2));
        assert_eq!(normalize_value(Value::from(-0.0), &options), Value::Integer(0));
        assert_eq!(normalize_value(Value::from(f64::NAN), &options), Value::Null);
        assert_eq!(normalize_value(Value::from("NULL"), &options), Value::Null);
        assert_eq!(normalize_value(Value::from("   "), &options), Value::Null);
        assert_eq!(
            normalize_value(Value::from(" Create Order "), &options),
            Value::from("Create Order")
        );
        assert_eq!(
            normalize_value(Value::from("007"), &options),
            Value::from("007")
        );
    }

    #[test]
    fn test_round_reals() {
        let options = PreprocessOptions {
            round_reals: Some(2),
            ..PreprocessOptions::default()
        };
        assert_eq!(
            normalize_value(Value::from(1.23456), &options),
            Value::Real(1.23)
        );
        assert_eq!(
            normalize_value(Value::from("0.999"), &options),
            Value::Integer(1)
        );
    }

    #[test]
    fn test_text_case_folding() {
        let options = PreprocessOptions {
            text_case: CaseMode::Lower,
            ..PreprocessOptions::default()
        };
        assert_eq!(
            normalize_value(Value::from("Approve PO"), &options),
            Value::from("approve po")
        );
    }

    #[test]
    fn test_strict_options_keep_text() {
        let options = PreprocessOptions::strict();
        assert_eq!(
            normalize_value(Value::from(" 12 "), &options),
            Value::from(" 12 ")
        );
        assert_eq!(normalize_value(Value::from(""), &options), Value::from(""));
    }

    #[test]
    fn test_canonicalize_sorts_columns_and_rows() {
        let raw = table(
            &["Name", "ID"],
            vec![
                vec![Value::from("b"), Value::from("2")],
                vec![Value::from("a"), Value::from(1)],
            ],
        );
        let canonical = canonicalize(raw, &PreprocessOptions::default()).unwrap();
        assert_eq!(canonical.columns(), &["id".to_string(), "name".to_string()]);
        assert_eq!(
            canonical.rows(),
            &[
                vec![Value::from(1), Value::from("a")],
                vec![Value::from(2), Value::from("b")],
            ]
        );
    }

    #[test]
    fn test_nulls_sort_first() {
        let raw = table(
            &["v"],
            vec![
                vec![Value::from("x")],
                vec![Value::from(5)],
                vec![Value::Null],
                vec![Value::from("")],
            ],
        );
        let canonical = canonicalize(raw, &PreprocessOptions::default()).unwrap();
        let column: Vec<Value> = canonical.rows().iter().map(|r| r[0].clone()).collect();
        assert_eq!(
            column,
            vec![Value::Null, Value::Null, Value::from(5), Value::from("x")]
        );
    }

    #[test]
    fn test_duplicates_preserved_unless_requested() {
        let rows = vec![vec![Value::from(1)], vec![Value::from(1)], vec![Value::from(2)]];

        let kept = canonicalize(table(&["a"], rows.clone()), &PreprocessOptions::default()).unwrap();
        assert_eq!(kept.num_rows(), 3);

        let options = PreprocessOptions {
            deduplicate_rows: true,
            ..PreprocessOptions::default()
        };
        let deduped = canonicalize(table(&["a"], rows), &options).unwrap();
        assert_eq!(deduped.num_rows(), 2);
    }

    #[test]
    fn test_empty_table() {
        let canonical =
            canonicalize(table(&["b", "a"], Vec::new()), &PreprocessOptions::default()).unwrap();
        assert!(canonical.is_empty());
        assert_eq!(canonical.columns(), &["a".to_string(), "b".to_string()]);
        assert!(canonical.validate().is_ok());
    }

    #[test]
    fn test_duplicate_column_after_normalization() {
        let raw = table(&["Case_ID", "case_id "], Vec::new());
        let err = canonicalize(raw, &PreprocessOptions::default()).unwrap_err();
        assert_eq!(err, DataFormatError::DuplicateColumn("case_id".into()));
    }

    #[test]
    fn test_idempotent() {
        let raw = table(
            &["b", "a"],
            vec![
                vec![Value::from(" 2.0"), Value::Null],
                vec![Value::from("x"), Value::from(1.5)],
            ],
        );
        let options = PreprocessOptions::default();
        let once = canonicalize(raw, &options).unwrap();
        let twice = canonicalize(once.table().clone(), &options).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_from_canonical_rejects_unsorted() {
        let options = PreprocessOptions::default();
        let unsorted_rows = table(&["a"], vec![vec![Value::from(2)], vec![Value::from(1)]]);
        assert!(matches!(
            CanonicalTable::from_canonical(unsorted_rows, options.clone()),
            Err(DataFormatError::NotCanonical(_))
        ));

        let unsorted_columns = table(&["b", "a"], Vec::new());
        assert!(CanonicalTable::from_canonical(unsorted_columns, options.clone()).is_err());

        let unnormalized = table(&["a"], vec![vec![Value::from("1")]]);
        assert!(CanonicalTable::from_canonical(unnormalized, options.clone()).is_err());

        let upper_column = table(&["A"], Vec::new());
        assert!(CanonicalTable::from_canonical(upper_column, options.clone()).is_err());

        let good = table(&["a", "b"], vec![vec![Value::from(1), Value::from("x")]]);
        assert!(CanonicalTable::from_canonical(good, options).is_ok());
    }
}
