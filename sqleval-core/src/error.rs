//! Layered error types
//!
//! Malformed tables raise [`DataFormatError`]; inputs that are well formed
//! but cannot be compared raise [`PreconditionError`]. [`Error`] wraps both
//! for operations that can fail either way.

use thiserror::Error;

/// The input cannot be interpreted as a rectangular, canonical table
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DataFormatError {
    /// A row holds a different number of values than the header
    #[error("row {row} has {found} values but the header has {expected} columns")]
    RaggedRow {
        /// Zero-based row index
        row: usize,
        /// Number of columns in the header
        expected: usize,
        /// Number of values found in the row
        found: usize,
    },

    /// Columns supplied column-wise have differing lengths
    #[error("column '{column}' has {found} values, expected {expected}")]
    ColumnLengthMismatch {
        /// The offending column
        column: String,
        /// Length of the first column
        expected: usize,
        /// Length of the offending column
        found: usize,
    },

    /// A row record does not carry the same keys as the first record
    #[error("record {record} does not have the same columns as the first record")]
    RecordKeyMismatch {
        /// Zero-based record index
        record: usize,
    },

    /// Rows were supplied without any column
    #[error("table has {rows} rows but no columns")]
    NoColumns {
        /// Number of rows supplied
        rows: usize,
    },

    /// Two columns share a name after normalization
    #[error("duplicate column '{0}'")]
    DuplicateColumn(String),

    /// A table claimed to be canonical violates the canonical invariants
    #[error("table is not in canonical form: {0}")]
    NotCanonical(String),
}

/// Two canonical tables cannot be compared meaningfully
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PreconditionError {
    /// The tables were canonicalized with different preprocessing options
    #[error("expected and produced tables were canonicalized with different options")]
    OptionsMismatch,

    /// Row comparison needs at least one column present in both tables
    #[error("no shared columns between expected {expected:?} and produced {produced:?}")]
    NoSharedColumns {
        /// Columns of the expected table
        expected: Vec<String>,
        /// Columns of the produced table
        produced: Vec<String>,
    },
}

/// Errors surfaced by evaluation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Malformed input table
    #[error("data format error: {0}")]
    DataFormat(#[from] DataFormatError),

    /// Inputs cannot be compared
    #[error("comparison precondition failed: {0}")]
    Precondition(#[from] PreconditionError),

    /// Invalid options
    #[error("configuration error: {0}")]
    Configuration(String),
}

/// Result type for evaluation operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ragged_row_display() {
        let err = DataFormatError::RaggedRow {
            row: 3,
            expected: 2,
            found: 1,
        };
        assert_eq!(
            err.to_string(),
            "row 3 has 1 values but the header has 2 columns"
        );
    }

    #[test]
    fn test_error_wraps_layers() {
        let err: Error = DataFormatError::DuplicateColumn("id".into()).into();
        assert!(matches!(err, Error::DataFormat(_)));
        assert_eq!(err.to_string(), "data format error: duplicate column 'id'");

        let err: Error = PreconditionError::OptionsMismatch.into();
        assert!(matches!(err, Error::Precondition(_)));
        assert!(err.to_string().starts_with("comparison precondition failed"));
    }
}
