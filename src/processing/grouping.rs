//! Multi-key group-by and the matching flatten traversal.
//!
//! [`group_rows`] partitions rows into a [`GroupNode`] tree, one level per key column.
//! [`flatten`] walks the tree back into a single row sequence, applying an optional sort,
//! row filter and bucket filter at each level (see [`LevelOps`]).

use indexmap::IndexMap;

use crate::types::{Row, Value, ValueKey};

use super::sort::SortOrder;

static UNDEFINED: Value = Value::Undefined;

/// Predicate over a single cell, used by per-level row filters.
pub type ValuePredicate = Box<dyn Fn(&Value) -> bool>;

/// Predicate over a whole (flattened) bucket, used by per-level group filters.
pub type GroupPredicate = Box<dyn Fn(&[Row]) -> bool>;

/// Result of a group-by: nested buckets keyed by cell value, with rows at the leaves.
///
/// Buckets keep first-occurrence order of their key; rows inside a bucket keep their
/// original relative order.
#[derive(Debug, Clone, PartialEq)]
pub enum GroupNode {
    Leaf(Vec<Row>),
    Branch(IndexMap<ValueKey, GroupNode>),
}

impl GroupNode {
    /// Child bucket for `key`, if this is a branch that has one.
    pub fn get(&self, key: &Value) -> Option<&GroupNode> {
        match self {
            GroupNode::Branch(buckets) => buckets.get(&ValueKey::new(key.clone())),
            GroupNode::Leaf(_) => None,
        }
    }

    /// Rows of a leaf.
    pub fn rows(&self) -> Option<&[Row]> {
        match self {
            GroupNode::Leaf(rows) => Some(rows),
            GroupNode::Branch(_) => None,
        }
    }

    /// Bucket keys of a branch, in bucket order.
    pub fn keys(&self) -> Vec<&Value> {
        match self {
            GroupNode::Branch(buckets) => buckets.keys().map(ValueKey::value).collect(),
            GroupNode::Leaf(_) => Vec::new(),
        }
    }

    /// Number of buckets (branch) or rows (leaf).
    pub fn len(&self) -> usize {
        match self {
            GroupNode::Branch(buckets) => buckets.len(),
            GroupNode::Leaf(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Nesting depth; a leaf has depth 0.
    pub fn depth(&self) -> usize {
        match self {
            GroupNode::Leaf(_) => 0,
            GroupNode::Branch(buckets) => {
                1 + buckets.values().map(GroupNode::depth).max().unwrap_or(0)
            }
        }
    }

    /// Concatenate every leaf in bucket order.
    pub fn into_rows(self) -> Vec<Row> {
        flatten(self, &[], &[])
    }
}

/// Partition `rows` by the values at `indexes[0]`, then `indexes[1]`, and so on.
///
/// With no indexes the rows come back as a single leaf.
pub fn group_rows(rows: Vec<Row>, indexes: &[usize]) -> GroupNode {
    let Some((&idx, rest)) = indexes.split_first() else {
        return GroupNode::Leaf(rows);
    };

    let mut buckets: IndexMap<ValueKey, Vec<Row>> = IndexMap::new();
    for row in rows {
        let key = ValueKey::new(cell(&row, idx).clone());
        buckets.entry(key).or_default().push(row);
    }

    GroupNode::Branch(
        buckets
            .into_iter()
            .map(|(key, bucket)| (key, group_rows(bucket, rest)))
            .collect(),
    )
}

/// What to do at one level of a [`flatten`].
#[derive(Default)]
pub struct LevelOps<'a> {
    /// Orders the buckets of a branch (by key) or the rows of a leaf (by cell).
    pub sort: Option<&'a SortOrder>,
    /// Keeps rows whose cell at this level's column passes.
    pub filter: Option<&'a dyn Fn(&Value) -> bool>,
    /// Keeps buckets whose flattened rows pass.
    pub group_filter: Option<&'a dyn Fn(&[Row]) -> bool>,
}

/// Linearize a group tree.
///
/// `indexes[l]` is the column of level `l` and `levels[l]` its operations. A branch sorts
/// its buckets, flattens each one, drops buckets rejected by the group filter,
/// concatenates the rest and finally applies the row filter. A leaf applies the row filter
/// and then sorts its rows; leaves below the last index are returned untouched.
pub fn flatten(node: GroupNode, indexes: &[usize], levels: &[LevelOps<'_>]) -> Vec<Row> {
    flatten_at(node, indexes, levels, 0)
}

fn flatten_at(node: GroupNode, indexes: &[usize], levels: &[LevelOps<'_>], level: usize) -> Vec<Row> {
    let index = indexes.get(level).copied();
    let ops = levels.get(level);

    match node {
        GroupNode::Leaf(mut rows) => {
            let (Some(idx), Some(ops)) = (index, ops) else {
                return rows;
            };
            if let Some(keep) = ops.filter {
                rows.retain(|r| keep(cell(r, idx)));
            }
            if let Some(order) = ops.sort {
                rows.sort_by(|a, b| order.compare(cell(a, idx), cell(b, idx)));
            }
            rows
        }
        GroupNode::Branch(buckets) => {
            let mut buckets: Vec<(ValueKey, GroupNode)> = buckets.into_iter().collect();
            if let Some(order) = ops.and_then(|o| o.sort) {
                buckets.sort_by(|(a, _), (b, _)| order.compare(a.value(), b.value()));
            }

            let group_filter = ops.and_then(|o| o.group_filter);
            let mut out = Vec::new();
            for (_, child) in buckets {
                let flat = flatten_at(child, indexes, levels, level + 1);
                if group_filter.is_some_and(|keep| !keep(flat.as_slice())) {
                    continue;
                }
                out.extend(flat);
            }

            if let (Some(idx), Some(keep)) = (index, ops.and_then(|o| o.filter)) {
                out.retain(|r| keep(cell(r, idx)));
            }
            out
        }
    }
}

fn cell(row: &Row, idx: usize) -> &Value {
    row.get(idx).unwrap_or(&UNDEFINED)
}

#[cfg(test)]
mod tests {
    use super::{flatten, group_rows, GroupNode, LevelOps};
    use crate::processing::sort::SortOrder;
    use crate::types::{Row, Value};

    fn n(v: f64) -> Value {
        Value::Number(v)
    }

    fn s(v: &str) -> Value {
        Value::from(v)
    }

    fn rows() -> Vec<Row> {
        vec![
            vec![n(1.0), s("x"), n(10.0)],
            vec![n(2.0), s("y"), n(20.0)],
            vec![n(1.0), s("z"), n(30.0)],
            vec![n(2.0), s("x"), n(40.0)],
            vec![n(1.0), s("x"), n(50.0)],
        ]
    }

    #[test]
    fn group_rows_without_keys_is_a_leaf() {
        let node = group_rows(rows(), &[]);
        assert_eq!(node.depth(), 0);
        assert_eq!(node.rows().unwrap().len(), 5);
    }

    #[test]
    fn group_rows_is_stable_and_first_occurrence_ordered() {
        let node = group_rows(rows(), &[0]);
        assert_eq!(node.keys(), vec![&n(1.0), &n(2.0)]);
        let ones = node.get(&n(1.0)).unwrap().rows().unwrap();
        let labels: Vec<&Value> = ones.iter().map(|r| &r[2]).collect();
        assert_eq!(labels, vec![&n(10.0), &n(30.0), &n(50.0)]);
    }

    #[test]
    fn nested_groups_have_one_level_per_key() {
        let node = group_rows(rows(), &[0, 1]);
        assert_eq!(node.depth(), 2);
        let inner = node.get(&n(1.0)).unwrap();
        assert_eq!(inner.keys(), vec![&s("x"), &s("z")]);
        assert_eq!(inner.get(&s("x")).unwrap().len(), 2);
        assert!(node.get(&n(3.0)).is_none());
    }

    #[test]
    fn into_rows_concatenates_buckets_in_order() {
        let out = group_rows(rows(), &[1]).into_rows();
        let thirds: Vec<f64> = out.iter().filter_map(|r| r[2].as_f64()).collect();
        assert_eq!(thirds, vec![10.0, 40.0, 50.0, 20.0, 30.0]);
    }

    #[test]
    fn flatten_sorts_buckets_and_leaf_rows() {
        let desc = SortOrder::Descending;
        let asc = SortOrder::Ascending;
        let levels = [
            LevelOps { sort: Some(&desc), ..Default::default() },
            LevelOps { sort: Some(&asc), ..Default::default() },
        ];
        let out = flatten(group_rows(rows(), &[0]), &[0, 1], &levels);
        let pairs: Vec<String> = out.iter().map(|r| format!("{}{}", r[0], r[1])).collect();
        assert_eq!(pairs, vec!["2x", "2y", "1x", "1x", "1z"]);
    }

    #[test]
    fn flatten_applies_group_and_row_filters() {
        let big_group = |rows: &[Row]| rows.len() >= 2;
        let not_z = |v: &Value| v != &Value::from("z");
        let levels = [
            LevelOps { group_filter: Some(&big_group), ..Default::default() },
            LevelOps { filter: Some(&not_z), ..Default::default() },
        ];
        let out = flatten(group_rows(rows(), &[0, 1]), &[0, 1], &levels);
        let thirds: Vec<f64> = out.iter().filter_map(|r| r[2].as_f64()).collect();
        assert_eq!(thirds, vec![10.0, 50.0, 20.0, 40.0]);

        let only_pairs = |rows: &[Row]| rows.len() == 2;
        let levels = [
            LevelOps::default(),
            LevelOps { group_filter: Some(&only_pairs), ..Default::default() },
        ];
        let out = flatten(group_rows(rows(), &[0, 1]), &[0, 1], &levels);
        assert_eq!(out, vec![rows()[0].clone(), rows()[4].clone()]);
    }

    #[test]
    fn leaf_filters_before_sorting() {
        let asc = SortOrder::Ascending;
        let small = |v: &Value| v.as_f64().is_some_and(|x| x < 45.0);
        let levels = [LevelOps { sort: Some(&asc), filter: Some(&small), ..Default::default() }];
        let node = GroupNode::Leaf(rows());
        let out = flatten(node, &[2], &levels);
        let thirds: Vec<f64> = out.iter().filter_map(|r| r[2].as_f64()).collect();
        assert_eq!(thirds, vec![10.0, 20.0, 30.0, 40.0]);
    }
}
