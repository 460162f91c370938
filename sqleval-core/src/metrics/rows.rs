//! Row-level overlap

use super::{aligned_columns, check_comparable, empty_policy, project, shared_columns, Overlap};
use crate::error::Result;
use crate::preprocess::CanonicalTable;
use crate::value::Value;
use std::collections::HashMap;

/// Row-level precision, recall and F1
///
/// Rows are compared as multisets: a row present twice in the expected
/// result must be produced twice to be fully recalled. Results with
/// different column sets share no row and score zero.
pub fn row_overlap(expected: &CanonicalTable, produced: &CanonicalTable) -> Result<Overlap> {
    relaxed_overlap(expected, produced, &[])
}

/// Row-level overlap ignoring the `exclude` columns
///
/// Names are normalized like column names; names missing from a table are
/// ignored. When the exclusions leave no column on either side the full
/// rows are compared instead.
pub fn relaxed_overlap(
    expected: &CanonicalTable,
    produced: &CanonicalTable,
    exclude: &[String],
) -> Result<Overlap> {
    check_comparable(expected, produced)?;
    if let Some(overlap) = empty_policy(expected, produced) {
        return Ok(overlap);
    }
    shared_columns(expected, produced)?;

    let aligned = match aligned_columns(expected, produced, exclude) {
        Some((expected_indices, _)) if expected_indices.is_empty() => {
            aligned_columns(expected, produced, &[])
        }
        aligned => aligned,
    };
    let Some((expected_indices, produced_indices)) = aligned else {
        log::trace!(
            "row overlap: columns {:?} and {:?} differ",
            expected.columns(),
            produced.columns()
        );
        return Ok(Overlap::NONE);
    };

    let mut remaining: HashMap<Vec<&Value>, usize> = HashMap::new();
    for row in expected.rows() {
        *remaining
            .entry(project(row, &expected_indices))
            .or_default() += 1;
    }

    let mut matched = 0;
    for row in produced.rows() {
        if let Some(count) = remaining.get_mut(&project(row, &produced_indices)) {
            if *count > 0 {
                *count -= 1;
                matched += 1;
            }
        }
    }

    log::trace!(
        "row overlap: {matched} of {} expected, {} produced",
        expected.num_rows(),
        produced.num_rows()
    );
    Ok(Overlap::from_counts(
        matched,
        expected.num_rows(),
        produced.num_rows(),
    ))
}
