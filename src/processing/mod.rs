//! Row reordering and selection over [`crate::types::Row`] slices.
//!
//! [`grouping`] is the core: [`group_rows`] builds a [`GroupNode`] tree and [`flatten`]
//! linearizes it again, optionally sorting and filtering at every level. Multi-key
//! [`sort_rows`] and [`filter_rows_by`] are both expressed through that pair.
//!
//! ## Example
//!
//! ```rust
//! use rust_tabular_dataset::processing::{group_rows, sort_rows, SortOrder};
//! use rust_tabular_dataset::types::Value;
//!
//! let mut rows = vec![
//!     vec![Value::from("b"), Value::Number(2.0)],
//!     vec![Value::from("a"), Value::Number(9.0)],
//!     vec![Value::from("b"), Value::Number(1.0)],
//! ];
//!
//! let groups = group_rows(rows.clone(), &[0]);
//! assert_eq!(groups.keys(), vec![&Value::from("b"), &Value::from("a")]);
//!
//! let desc = SortOrder::Descending;
//! sort_rows(&mut rows, &[(0, &SortOrder::Ascending), (1, &desc)]);
//! assert_eq!(rows[1], vec![Value::from("b"), Value::Number(2.0)]);
//! ```

pub mod filter;
pub mod grouping;
pub mod sort;

pub use filter::filter_rows_by;
pub use grouping::{flatten, group_rows, GroupNode, GroupPredicate, LevelOps, ValuePredicate};
pub use sort::{sort_rows, SortOrder};
