//! Cell-level overlap
//!
//! Rows of the two results are paired one to one, then the equal cells of
//! each pair are counted. Identical rows are paired first; the leftovers
//! are paired greedily, each expected row (in canonical order) taking the
//! unpaired produced row that shares the most cells with it. Ties go to the
//! produced row that sorts first.

use super::{check_comparable, empty_policy, project, shared_columns, Overlap};
use crate::error::Result;
use crate::preprocess::CanonicalTable;
use crate::value::Value;
use std::collections::HashMap;

fn equal_cells(expected: &[&Value], produced: &[&Value]) -> usize {
    expected
        .iter()
        .zip(produced)
        .filter(|(left, right)| left == right)
        .count()
}

/// Cell-level precision, recall and F1
///
/// Precision divides the matched cells by every produced cell, recall by
/// every expected cell, so extra or missing columns lower the score
/// without making it undefined.
pub fn cell_overlap(expected: &CanonicalTable, produced: &CanonicalTable) -> Result<Overlap> {
    check_comparable(expected, produced)?;
    if let Some(overlap) = empty_policy(expected, produced) {
        return Ok(overlap);
    }
    let (expected_indices, produced_indices) = shared_columns(expected, produced)?;
    let width = expected_indices.len();

    let expected_rows: Vec<Vec<&Value>> = expected
        .rows()
        .iter()
        .map(|row| project(row, &expected_indices))
        .collect();
    let produced_rows: Vec<Vec<&Value>> = produced
        .rows()
        .iter()
        .map(|row| project(row, &produced_indices))
        .collect();

    // identical rows first
    let mut by_key: HashMap<&[&Value], Vec<usize>> = HashMap::new();
    for (index, row) in produced_rows.iter().enumerate().rev() {
        by_key.entry(row.as_slice()).or_default().push(index);
    }

    let mut paired = vec![false; produced_rows.len()];
    let mut matched = 0;
    let mut leftover = Vec::new();
    for row in &expected_rows {
        match by_key.get_mut(row.as_slice()).and_then(Vec::pop) {
            Some(index) => {
                paired[index] = true;
                matched += width;
            }
            None => leftover.push(row),
        }
    }

    // then best partial match for what is left
    for row in leftover {
        let best = produced_rows
            .iter()
            .enumerate()
            .filter(|(index, _)| !paired[*index])
            .map(|(index, candidate)| (index, equal_cells(row, candidate)))
            .filter(|(_, count)| *count > 0)
            .fold(None, |best: Option<(usize, usize)>, (index, count)| match best {
                Some((_, best_count)) if best_count >= count => best,
                _ => Some((index, count)),
            });

        if let Some((index, count)) = best {
            paired[index] = true;
            matched += count;
        }
    }

    let expected_cells = expected.num_rows() * expected.num_columns();
    let produced_cells = produced.num_rows() * produced.num_columns();
    log::trace!("cell overlap: {matched} cells of {expected_cells} expected, {produced_cells} produced");

    Ok(Overlap::from_counts(matched, expected_cells, produced_cells))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PreprocessOptions;
    use crate::preprocess::canonicalize;
    use crate::table::Table;

    fn canonical(columns: &[&str], rows: Vec<Vec<Value>>) -> CanonicalTable {
        let table = Table::new(columns.iter().map(|c| c.to_string()).collect(), rows).unwrap();
        canonicalize(table, &PreprocessOptions::default()).unwrap()
    }

    fn event(case: i64, activity: &str, timestamp: &str) -> Vec<Value> {
        vec![
            Value::from(case),
            Value::from(activity),
            Value::from(timestamp),
        ]
    }

    #[test]
    fn test_partial_credit_for_near_rows() {
        let columns = ["case_id", "activity", "timestamp"];
        let expected = canonical(
            &columns,
            vec![
                event(1, "create", "2024-01-01"),
                event(1, "approve", "2024-01-02"),
            ],
        );
        // one timestamp wrong
        let produced = canonical(
            &columns,
            vec![
                event(1, "create", "2024-01-01"),
                event(1, "approve", "2024-01-03"),
            ],
        );

        let overlap = cell_overlap(&expected, &produced).unwrap();
        assert!((overlap.precision - 5.0 / 6.0).abs() < 1e-12);
        assert!((overlap.recall - 5.0 / 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_identical_tables() {
        let columns = ["case_id", "activity", "timestamp"];
        let table = canonical(&columns, vec![event(1, "create", "t1"), event(2, "pay", "t2")]);
        assert_eq!(cell_overlap(&table, &table).unwrap(), Overlap::PERFECT);
    }

    #[test]
    fn test_rows_are_paired_once() {
        let columns = ["case_id", "activity", "timestamp"];
        let expected = canonical(
            &columns,
            vec![event(1, "create", "t1"), event(1, "create", "t2")],
        );
        let produced = canonical(&columns, vec![event(1, "create", "t9")]);

        // a single produced row can only pair with one expected row
        let overlap = cell_overlap(&expected, &produced).unwrap();
        assert!((overlap.precision - 2.0 / 3.0).abs() < 1e-12);
        assert!((overlap.recall - 2.0 / 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_missing_column_lowers_recall() {
        let expected = canonical(&["a", "b"], vec![vec![Value::from(1), Value::from(2)]]);
        let produced = canonical(&["a"], vec![vec![Value::from(1)]]);
        let overlap = cell_overlap(&expected, &produced).unwrap();
        assert_eq!(overlap.precision, 1.0);
        assert_eq!(overlap.recall, 0.5);
    }

    #[test]
    fn test_disjoint_rows() {
        let expected = canonical(&["a"], vec![vec![Value::from(1)]]);
        let produced = canonical(&["a"], vec![vec![Value::from(2)]]);
        assert_eq!(cell_overlap(&expected, &produced).unwrap(), Overlap::NONE);
    }
}
