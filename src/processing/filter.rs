//! Row filtering by per-column predicates, optionally with per-level bucket filters.

use crate::types::{Row, Value};

use super::grouping::{flatten, group_rows, LevelOps};

/// Keep the rows that pass every key filter and every group filter.
///
/// `key_filters` pairs a column index with a predicate over that column's cell.
/// `group_filters` pairs a column index with a predicate over a whole bucket of rows
/// sharing that column's value.
///
/// A single key filter without group filters is applied row by row and preserves order.
/// Otherwise the rows are grouped by the key-filter columns (then by any column that only
/// has a group filter) and flattened level by level, so the result comes back clustered
/// by those columns in first-occurrence order.
pub fn filter_rows_by(
    rows: &mut Vec<Row>,
    key_filters: &[(usize, &dyn Fn(&Value) -> bool)],
    group_filters: &[(usize, &dyn Fn(&[Row]) -> bool)],
) {
    if group_filters.is_empty() {
        match key_filters {
            [] => return,
            [(idx, keep)] => {
                let idx = *idx;
                rows.retain(|r| keep(&r[idx]));
                return;
            }
            _ => {}
        }
    }

    let mut indexes: Vec<usize> = key_filters.iter().map(|(idx, _)| *idx).collect();
    let mut levels: Vec<LevelOps<'_>> = key_filters
        .iter()
        .map(|(_, keep)| LevelOps {
            filter: Some(*keep),
            ..Default::default()
        })
        .collect();

    for (idx, keep) in group_filters {
        match indexes.iter().position(|i| i == idx) {
            Some(level) if levels[level].group_filter.is_none() => {
                levels[level].group_filter = Some(*keep);
            }
            _ => {
                indexes.push(*idx);
                levels.push(LevelOps {
                    group_filter: Some(*keep),
                    ..Default::default()
                });
            }
        }
    }

    let node = group_rows(std::mem::take(rows), &indexes);
    *rows = flatten(node, &indexes, &levels);
}
