//! `rust-tabular-dataset` parses comma-separated text into an in-memory [`dataset::DataSet`]
//! of typed, optionally label-encoded columns, and groups, sorts and filters its rows by one
//! or more keys.
//!
//! The primary entrypoint is [`dataset::DataSet::parse`], configured by
//! [`ingestion::TableOptions`]. Files can be read with [`dataset::DataSet::from_path`] and,
//! with the default `http` feature, fetched with `DataSet::load`.
//!
//! ## Input format
//!
//! - Lines end at `\n`; `\r` is stripped.
//! - Cells are separated by `,` and trimmed. There is no quoting.
//! - Blank lines are ignored wherever they occur. The first remaining line is the header.
//! - Every data row must have as many cells as the header.
//!
//! ## Column types
//!
//! Cells start out as [`types::Value::Utf8`] and are converted per column by a
//! [`coercion::TypeSpec`]: `number`, `bigint`, `boolean`, `object` (JSON), `string`,
//! `identity` (the default) or a custom function. Empty cells become
//! [`types::Value::Undefined`] before conversion.
//!
//! ## Quick example
//!
//! ```rust
//! use rust_tabular_dataset::coercion::TypeSpec;
//! use rust_tabular_dataset::dataset::DataSet;
//! use rust_tabular_dataset::ingestion::TableOptions;
//! use rust_tabular_dataset::processing::SortOrder;
//! use rust_tabular_dataset::types::Value;
//!
//! # fn main() -> Result<(), rust_tabular_dataset::DatasetError> {
//! let opts = TableOptions::new().with_type("a", TypeSpec::Number);
//! let mut ds = DataSet::parse("a,b\n1,x\n2,y\n1,z\n", &opts)?;
//!
//! ds.sort_by(&[("a", SortOrder::Descending)])?;
//! assert_eq!(ds.rows()[0], vec![Value::Number(2.0), Value::from("y")]);
//!
//! ds.encode_column("b")?;
//! assert_eq!(ds.decode_cell("b", 0)?, Value::from("y"));
//!
//! let groups = ds.group_by(&["a"])?;
//! assert_eq!(groups.get(&Value::Number(1.0)).map(|g| g.len()), Some(2));
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`dataset`]: the [`dataset::DataSet`] table and its column, encoding and row operations
//! - [`header`]: the column catalog (name ↔ index, coercer, encoder)
//! - [`coercion`]: type tags and coercers
//! - [`encoding`]: [`encoding::LabelEncoder`]
//! - [`processing`]: multi-key grouping, sorting and filtering
//! - [`ingestion`]: tokenizer, options, file/HTTP loaders and load observers
//! - [`types`]: the [`types::Value`] cell type
//! - [`error`]: the crate error type

pub mod coercion;
pub mod dataset;
pub mod encoding;
pub mod error;
pub mod header;
pub mod ingestion;
pub mod processing;
pub mod types;

pub use dataset::DataSet;
pub use error::{DatasetError, DatasetResult};
