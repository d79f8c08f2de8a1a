//! Single- and multi-key row sorting.

use std::cmp::Ordering;
use std::fmt;

use crate::types::{compare_values, Row, Value};

use super::grouping::{flatten, group_rows, LevelOps};

/// Direction (or comparator) for one sort key.
#[derive(Default)]
pub enum SortOrder {
    /// [`compare_values`] order.
    #[default]
    Ascending,
    /// Reverse of [`compare_values`] order.
    Descending,
    /// Caller-supplied comparator over two cell values.
    Custom(Box<dyn Fn(&Value, &Value) -> Ordering>),
}

impl SortOrder {
    /// Parse a direction keyword.
    ///
    /// `d`, `desc`, `descending`, `za` and `z-a` (any case) mean descending; anything else
    /// is ascending.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "d" | "desc" | "descending" | "za" | "z-a" => SortOrder::Descending,
            _ => SortOrder::Ascending,
        }
    }

    /// Order by a caller-supplied comparator.
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&Value, &Value) -> Ordering + 'static,
    {
        SortOrder::Custom(Box::new(f))
    }

    /// Compare two cells under this order.
    pub fn compare(&self, a: &Value, b: &Value) -> Ordering {
        match self {
            SortOrder::Ascending => compare_values(a, b),
            SortOrder::Descending => compare_values(b, a),
            SortOrder::Custom(f) => f(a, b),
        }
    }
}

impl From<&str> for SortOrder {
    fn from(s: &str) -> Self {
        SortOrder::parse(s)
    }
}

impl fmt::Debug for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortOrder::Ascending => f.write_str("Ascending"),
            SortOrder::Descending => f.write_str("Descending"),
            SortOrder::Custom(_) => f.write_str("Custom(<fn>)"),
        }
    }
}

/// Stable lexicographic sort of `rows` by `(column index, order)` keys.
///
/// One key sorts directly. Several keys group by all but the last key and let each level
/// order its buckets, so rows that tie on every key keep their relative order.
pub fn sort_rows(rows: &mut Vec<Row>, keys: &[(usize, &SortOrder)]) {
    match keys {
        [] => {}
        [(idx, order)] => {
            let idx = *idx;
            rows.sort_by(|a, b| order.compare(&a[idx], &b[idx]));
        }
        _ => {
            let indexes: Vec<usize> = keys.iter().map(|(idx, _)| *idx).collect();
            let levels: Vec<LevelOps<'_>> = keys
                .iter()
                .map(|(_, order)| LevelOps {
                    sort: Some(*order),
                    ..Default::default()
                })
                .collect();
            let node = group_rows(std::mem::take(rows), &indexes[..indexes.len() - 1]);
            *rows = flatten(node, &indexes, &levels);
        }
    }
}
