//! Turning text into datasets.
//!
//! - [`csv`]: comma-separated tokenizer producing raw string records
//! - [`options`]: [`TableOptions`], the knobs for types, encoders, exclusions and slicing
//! - [`file`]: [`load_from_path`] for local files
//! - [`http`]: [`load`] / [`load_request`] for remote files (feature `http`)
//! - [`observability`]: the [`LoadObserver`] hook that loaders report to

pub mod csv;
pub mod file;
#[cfg(feature = "http")]
pub mod http;
pub mod observability;
pub mod options;

pub use file::load_from_path;
#[cfg(feature = "http")]
pub use http::{load, load_request};
pub use observability::{
    severity_for_error, CompositeObserver, LoadContext, LoadObserver, LoadSeverity, LoadStats,
    TracingObserver,
};
pub use options::{SliceWindow, TableOptions};
