use std::collections::HashMap;

use tracing::debug;

use super::{Cell, RecordSet};
use crate::mnu::ebooks::error::Result;

/// Describes a left join between two record sets.
#[derive(Debug, Clone)]
pub struct JoinSpec<'a> {
    pub left_key: &'a str,
    pub right_key: &'a str,
    /// Suffixes appended to non-key columns present on both sides.
    pub suffixes: (&'a str, &'a str),
    /// Label of the resulting record set.
    pub label: &'a str,
}

/// Key normalisation shared by every join: surrounding whitespace is ignored
/// and blank keys never match.
fn join_key(cell: &Cell) -> Option<&str> {
    let trimmed = cell.as_deref()?.trim();
    if trimmed.is_empty() { None } else { Some(trimmed) }
}

/// Left-joins `right` onto `left`.
///
/// Every left row appears in the output at least once, in its original order,
/// and once per matching right row when the right key repeats.
/// When both keys share a name the right key column is folded into the left
/// one. Other overlapping column names are disambiguated with the configured
/// suffixes.
pub fn left_join(left: &RecordSet, right: &RecordSet, spec: &JoinSpec<'_>) -> Result<RecordSet> {
    let left_key = left.require_column(spec.left_key)?;
    let right_key = right.require_column(spec.right_key)?;
    let merged_key = spec.left_key == spec.right_key;

    let right_columns: Vec<usize> = (0..right.columns.len())
        .filter(|&index| !(merged_key && index == right_key))
        .collect();

    let mut columns = Vec::with_capacity(left.columns.len() + right_columns.len());
    for (index, name) in left.columns.iter().enumerate() {
        let shared = !(merged_key && index == left_key)
            && right_columns.iter().any(|&r| right.columns[r] == *name);
        columns.push(if shared {
            format!("{name}{}", spec.suffixes.0)
        } else {
            name.clone()
        });
    }
    for &index in &right_columns {
        let name = &right.columns[index];
        let shared = left
            .columns
            .iter()
            .enumerate()
            .any(|(l, column)| column == name && !(merged_key && l == left_key));
        columns.push(if shared {
            format!("{name}{}", spec.suffixes.1)
        } else {
            name.clone()
        });
    }

    let mut index: HashMap<&str, Vec<usize>> = HashMap::new();
    for (row_idx, row) in right.rows.iter().enumerate() {
        if let Some(key) = join_key(&row[right_key]) {
            index.entry(key).or_default().push(row_idx);
        }
    }

    let mut output = RecordSet::new(spec.label, columns);
    let mut unmatched = 0usize;
    for row in &left.rows {
        let matches = join_key(&row[left_key]).and_then(|key| index.get(key));
        match matches {
            Some(matches) => {
                for &right_idx in matches {
                    let right_row = &right.rows[right_idx];
                    let mut cells: Vec<Cell> = row.clone();
                    cells.extend(right_columns.iter().map(|&c| right_row[c].clone()));
                    output.rows.push(cells);
                }
            }
            None => {
                unmatched += 1;
                let mut cells: Vec<Cell> = row.clone();
                cells.extend(right_columns.iter().map(|_| None));
                output.rows.push(cells);
            }
        }
    }

    debug!(
        label = spec.label,
        left_rows = left.len(),
        right_rows = right.len(),
        output_rows = output.len(),
        unmatched,
        "left join complete"
    );
    Ok(output)
}
