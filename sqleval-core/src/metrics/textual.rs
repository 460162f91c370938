//! Fuzzy textual row overlap
//!
//! Each row is rendered as its values joined by `;` (nulls render empty)
//! and rows are paired one to one by normalized Levenshtein similarity. A
//! pair counts as a match when its similarity reaches the threshold.
//! Results with different column sets score zero.

use super::{aligned_columns, check_comparable, empty_policy, shared_columns, Overlap};
use crate::error::Result;
use crate::preprocess::CanonicalTable;
use crate::value::Value;
use std::collections::HashMap;

/// Separator between rendered cells
pub const FIELD_SEPARATOR: &str = ";";

fn render(row: &[Value], indices: &[usize]) -> String {
    indices
        .iter()
        .map(|&i| row[i].render())
        .collect::<Vec<_>>()
        .join(FIELD_SEPARATOR)
}

/// Similarity of two rendered rows in `[0, 1]`
pub fn row_similarity(left: &str, right: &str) -> f64 {
    strsim::normalized_levenshtein(left, right)
}

/// Textual precision, recall and F1 with the given similarity threshold
pub fn textual_overlap(
    expected: &CanonicalTable,
    produced: &CanonicalTable,
    threshold: f64,
) -> Result<Overlap> {
    check_comparable(expected, produced)?;
    if let Some(overlap) = empty_policy(expected, produced) {
        return Ok(overlap);
    }
    shared_columns(expected, produced)?;
    let Some((expected_indices, produced_indices)) = aligned_columns(expected, produced, &[])
    else {
        return Ok(Overlap::NONE);
    };

    let expected_rows: Vec<String> = expected
        .rows()
        .iter()
        .map(|row| render(row, &expected_indices))
        .collect();
    let produced_rows: Vec<String> = produced
        .rows()
        .iter()
        .map(|row| render(row, &produced_indices))
        .collect();

    let mut by_text: HashMap<&str, Vec<usize>> = HashMap::new();
    for (index, row) in produced_rows.iter().enumerate().rev() {
        by_text.entry(row.as_str()).or_default().push(index);
    }

    let mut paired = vec![false; produced_rows.len()];
    let mut matched = 0;
    let mut leftover = Vec::new();
    for row in &expected_rows {
        match by_text.get_mut(row.as_str()).and_then(Vec::pop) {
            Some(index) => {
                paired[index] = true;
                matched += 1;
            }
            None => leftover.push(row),
        }
    }

    for row in leftover {
        let best = produced_rows
            .iter()
            .enumerate()
            .filter(|(index, _)| !paired[*index])
            .map(|(index, candidate)| (index, row_similarity(row, candidate)))
            .fold(None, |best: Option<(usize, f64)>, (index, score)| match best {
                Some((_, best_score)) if best_score >= score => best,
                _ => Some((index, score)),
            });

        if let Some((index, score)) = best {
            if score >= threshold {
                paired[index] = true;
                matched += 1;
            }
        }
    }

    log::trace!(
        "textual overlap at threshold {threshold}: {matched} of {} expected, {} produced",
        expected.num_rows(),
        produced.num_rows()
    );
    Ok(Overlap::from_counts(
        matched,
        expected.num_rows(),
        produced.num_rows(),
    ))
}
