//! Reading result tables from disk
//!
//! CSV files carry a header row; an empty field is read as `NULL` and all
//! other fields as text, leaving number recognition to preprocessing. JSON
//! files hold either an array of row objects or a `{"columns", "rows"}`
//! object.

use crate::error::CliError;
use anyhow::{Context, Result};
use serde::Deserialize;
use sqleval_core::{Table, Value};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// On-disk table formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    /// Comma separated values with a header row
    Csv,
    /// JSON records or a columns/rows object
    Json,
}

impl TableFormat {
    /// Detect the format from the file extension
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());

        match extension.as_deref() {
            Some("csv") => Ok(TableFormat::Csv),
            Some("json") => Ok(TableFormat::Json),
            _ => Err(CliError::UnsupportedFormat(path.display().to_string()).into()),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum JsonTable {
    Records(Vec<BTreeMap<String, Value>>),
    Table(Table),
}

/// Read a table file, choosing the parser by extension
pub fn read_table(path: &Path) -> Result<Table> {
    if !path.is_file() {
        return Err(CliError::FileNotFound(path.display().to_string()).into());
    }

    let table = match TableFormat::from_path(path)? {
        TableFormat::Csv => {
            let content = fs::read(path)
                .with_context(|| format!("Failed to read file: {}", path.display()))?;
            parse_csv(&content)
        }
        TableFormat::Json => {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read file: {}", path.display()))?;
            parse_json(&content)
        }
    }
    .with_context(|| format!("Failed to parse table: {}", path.display()))?;

    log::debug!(
        "read {} with {} columns and {} rows",
        path.display(),
        table.num_columns(),
        table.num_rows()
    );
    Ok(table)
}

/// Parse CSV bytes with a header row
pub fn parse_csv(content: &[u8]) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        // ragged rows are reported by the table constructor
        .flexible(true)
        .from_reader(content);

    let columns: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(
            record
                .iter()
                .map(|field| {
                    if field.is_empty() {
                        Value::Null
                    } else {
                        Value::from(field)
                    }
                })
                .collect(),
        );
    }

    Ok(Table::new(columns, rows)?)
}

/// Parse a JSON table
pub fn parse_json(content: &str) -> Result<Table> {
    match serde_json::from_str(content)? {
        JsonTable::Records(records) => Ok(Table::from_records(records)?),
        JsonTable::Table(table) => Ok(table),
    }
}
