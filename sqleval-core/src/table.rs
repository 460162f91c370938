//! Tabular results as returned by a query

use crate::error::DataFormatError;
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A rectangular query result with named columns
///
/// Column order and row order carry no meaning for comparison; they are
/// kept as supplied until the table is canonicalized. Every constructor
/// checks that the table is rectangular.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawTable")]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    /// Build a table from a header and row-major values
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Result<Self, DataFormatError> {
        if columns.is_empty() && !rows.is_empty() {
            return Err(DataFormatError::NoColumns { rows: rows.len() });
        }

        if let Some((row, values)) = rows
            .iter()
            .enumerate()
            .find(|(_, values)| values.len() != columns.len())
        {
            return Err(DataFormatError::RaggedRow {
                row,
                expected: columns.len(),
                found: values.len(),
            });
        }

        Ok(Self { columns, rows })
    }

    /// Build an empty table with the given header
    pub fn empty(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Build a table from column-major values
    pub fn from_columns(columns: Vec<(String, Vec<Value>)>) -> Result<Self, DataFormatError> {
        let height = columns.first().map_or(0, |(_, values)| values.len());

        if let Some((name, values)) = columns.iter().find(|(_, values)| values.len() != height) {
            return Err(DataFormatError::ColumnLengthMismatch {
                column: name.clone(),
                expected: height,
                found: values.len(),
            });
        }

        let mut rows: Vec<Vec<Value>> = (0..height)
            .map(|_| Vec::with_capacity(columns.len()))
            .collect();
        let mut names = Vec::with_capacity(columns.len());
        for (name, values) in columns {
            names.push(name);
            for (row, value) in rows.iter_mut().zip(values) {
                row.push(value);
            }
        }

        Self::new(names, rows)
    }

    /// Build a table from row records keyed by column name
    ///
    /// The first record fixes the column set; every other record must carry
    /// exactly the same keys.
    pub fn from_records(records: Vec<BTreeMap<String, Value>>) -> Result<Self, DataFormatError> {
        let Some(first) = records.first() else {
            return Ok(Self::empty(Vec::new()));
        };
        let columns: Vec<String> = first.keys().cloned().collect();

        let mut rows = Vec::with_capacity(records.len());
        for (index, mut record) in records.into_iter().enumerate() {
            if record.len() != columns.len() {
                return Err(DataFormatError::RecordKeyMismatch { record: index });
            }
            let mut row = Vec::with_capacity(columns.len());
            for column in &columns {
                match record.remove(column) {
                    Some(value) => row.push(value),
                    None => return Err(DataFormatError::RecordKeyMismatch { record: index }),
                }
            }
            rows.push(row);
        }

        Self::new(columns, rows)
    }

    /// Column names, in table order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Rows, in table order
    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    /// Number of rows
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns
    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// Whether the table has no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column by exact name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    /// Consume the table into its header and rows
    pub fn into_parts(self) -> (Vec<String>, Vec<Vec<Value>>) {
        (self.columns, self.rows)
    }
}

#[derive(Deserialize)]
struct RawTable {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl TryFrom<RawTable> for Table {
    type Error = DataFormatError;

    fn try_from(raw: RawTable) -> Result<Self, Self::Error> {
        Table::new(raw.columns, raw.rows)
    }
}
