//! Property-based tests for canonicalization and metrics
//!
//! Invariants that must hold for any well-formed table:
//! - Canonicalization is idempotent
//! - Row order and column order never change the canonical form
//! - Exact match is reflexive and symmetric
//! - Row precision of (a, b) is the row recall of (b, a)
//! - A result missing a column shares no row with the full result

use proptest::prelude::*;
use sqleval_core::metrics::{cell_overlap, exact_match, row_overlap};
use sqleval_core::{canonicalize, CanonicalTable, Overlap, PreprocessOptions, Table, Value};

const MAX_ROWS: usize = 8;
const MAX_COLUMNS: usize = 4;

fn cell() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        (-1000i64..1000).prop_map(Value::Integer),
        (-1000.0f64..1000.0).prop_map(Value::Real),
        "[a-zA-Z0-9 .]{0,6}".prop_map(Value::Text),
    ]
}

fn raw_table() -> impl Strategy<Value = (Vec<String>, Vec<Vec<Value>>)> {
    (1..=MAX_COLUMNS).prop_flat_map(|width| {
        let columns: Vec<String> = (0..width).map(|i| format!("Col_{i}")).collect();
        (
            Just(columns),
            prop::collection::vec(prop::collection::vec(cell(), width), 0..MAX_ROWS),
        )
    })
}

fn shuffle_keys() -> impl Strategy<Value = Vec<u32>> {
    prop::collection::vec(any::<u32>(), MAX_ROWS.max(MAX_COLUMNS))
}

/// Positions `0..len` ordered by the given keys
fn permutation(len: usize, keys: &[u32]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..len).collect();
    order.sort_by_key(|&i| (keys[i], i));
    order
}

fn canonical(columns: Vec<String>, rows: Vec<Vec<Value>>) -> CanonicalTable {
    let table = Table::new(columns, rows).unwrap();
    canonicalize(table, &PreprocessOptions::default()).unwrap()
}

proptest! {
    /// Canonicalizing a canonical table changes nothing
    #[test]
    fn canonicalize_is_idempotent((columns, rows) in raw_table()) {
        let once = canonical(columns, rows);
        let twice = canonicalize(once.table().clone(), once.options()).unwrap();
        prop_assert_eq!(once, twice);
    }

    /// Row order of the input is irrelevant
    #[test]
    fn row_shuffle_invariance((columns, rows) in raw_table(), keys in shuffle_keys()) {
        let shuffled: Vec<Vec<Value>> = permutation(rows.len(), &keys)
            .into_iter()
            .map(|i| rows[i].clone())
            .collect();
        prop_assert_eq!(canonical(columns.clone(), rows), canonical(columns, shuffled));
    }

    /// Column order of the input is irrelevant
    #[test]
    fn column_permutation_invariance((columns, rows) in raw_table(), keys in shuffle_keys()) {
        let order = permutation(columns.len(), &keys);
        let permuted_columns: Vec<String> = order.iter().map(|&i| columns[i].clone()).collect();
        let permuted_rows: Vec<Vec<Value>> = rows
            .iter()
            .map(|row| order.iter().map(|&i| row[i].clone()).collect())
            .collect();
        prop_assert_eq!(
            canonical(columns, rows),
            canonical(permuted_columns, permuted_rows)
        );
    }

    /// A table always matches itself
    #[test]
    fn exact_match_is_reflexive((columns, rows) in raw_table()) {
        let table = canonical(columns, rows);
        prop_assert!(exact_match(&table, &table).unwrap());
    }

    /// Exact match does not depend on argument order
    #[test]
    fn exact_match_is_symmetric(
        (columns, rows) in raw_table(),
        (other_columns, other_rows) in raw_table(),
    ) {
        let left = canonical(columns, rows);
        let right = canonical(other_columns, other_rows);
        prop_assert_eq!(
            exact_match(&left, &right).unwrap(),
            exact_match(&right, &left).unwrap()
        );
    }

    /// Swapping the roles of expected and produced swaps precision and recall
    #[test]
    fn row_overlap_is_mirrored(
        (columns, rows) in raw_table(),
        keys in shuffle_keys(),
    ) {
        // keep a subset of the rows as the second table
        let subset: Vec<Vec<Value>> = rows
            .iter()
            .zip(&keys)
            .filter(|(_, key)| *key % 2 == 0)
            .map(|(row, _)| row.clone())
            .collect();
        let left = canonical(columns.clone(), rows);
        let right = canonical(columns, subset);

        let forward = row_overlap(&left, &right).unwrap();
        let backward = row_overlap(&right, &left).unwrap();
        prop_assert!((0.0..=1.0).contains(&forward.f1));

        // the empty policy is asymmetric, so only compare non-empty sides
        if !left.is_empty() && !right.is_empty() {
            prop_assert_eq!(forward.precision, backward.recall);
            prop_assert_eq!(forward.recall, backward.precision);
            prop_assert_eq!(forward.precision, 1.0);
        }
    }

    /// Projecting away a column loses every row but keeps cell credit
    #[test]
    fn missing_column_shares_no_rows((columns, rows) in raw_table()) {
        prop_assume!(columns.len() > 1 && !rows.is_empty());
        let narrow_columns = columns[..columns.len() - 1].to_vec();
        let narrow_rows: Vec<Vec<Value>> = rows
            .iter()
            .map(|row| row[..row.len() - 1].to_vec())
            .collect();
        let full = canonical(columns, rows);
        let narrow = canonical(narrow_columns, narrow_rows);

        prop_assert_eq!(row_overlap(&full, &narrow).unwrap(), Overlap::NONE);
        prop_assert_eq!(row_overlap(&narrow, &full).unwrap(), Overlap::NONE);
        let cells = cell_overlap(&full, &narrow).unwrap();
        prop_assert_eq!(cells.precision, 1.0);
        prop_assert!(cells.recall < 1.0);
    }
}
