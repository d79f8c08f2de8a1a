//! Options controlling how text becomes a [`crate::dataset::DataSet`].

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Deserializer};

use crate::coercion::TypeSpec;
use crate::error::DatasetResult;

use super::observability::{LoadObserver, LoadSeverity};

/// Half-open window `[start, end)` over data rows (the header is not counted).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub struct SliceWindow {
    pub start: usize,
    /// `None` runs to the last row.
    #[serde(default)]
    pub end: Option<usize>,
}

impl SliceWindow {
    /// Window over data rows `start..end`; `None` runs to the end.
    pub fn new(start: usize, end: Option<usize>) -> Self {
        Self { start, end }
    }

    /// Clamp the window to `len` items and return it as a range.
    pub fn bounds(&self, len: usize) -> std::ops::Range<usize> {
        let end = self.end.map_or(len, |e| e.min(len));
        let start = self.start.min(end);
        start..end
    }

    /// Keep only the items inside the window.
    pub fn apply<T>(&self, items: Vec<T>) -> Vec<T> {
        let range = self.bounds(items.len());
        items
            .into_iter()
            .skip(range.start)
            .take(range.end - range.start)
            .collect()
    }
}

/// Options for [`crate::dataset::DataSet::parse`] and the loaders.
///
/// Use [`Default`] for common cases. The serializable part can be read from JSON:
///
/// ```rust
/// use rust_tabular_dataset::ingestion::TableOptions;
///
/// let opts = TableOptions::from_json(
///     r#"{"types": {"age": "number"}, "encoders": ["city"], "excluded": "id"}"#,
/// )
/// .unwrap();
/// assert_eq!(opts.excluded, vec!["id".to_string()]);
/// assert_eq!(opts.types["age"].name(), "number");
/// ```
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct TableOptions {
    /// Per-column type overrides; unnamed columns keep values as parsed.
    pub types: HashMap<String, TypeSpec>,
    /// Columns that are label-encoded while rows are ingested.
    pub encoders: Vec<String>,
    /// Columns dropped before coercion. Accepts a single name or a list.
    #[serde(deserialize_with = "one_or_many")]
    pub excluded: Vec<String>,
    /// Row window applied to the data rows.
    pub slice: Option<SliceWindow>,
    /// Optional observer for load outcomes.
    #[serde(skip)]
    pub observer: Option<Arc<dyn LoadObserver>>,
    /// Severity threshold at which `on_alert` is invoked.
    #[serde(skip)]
    pub alert_at_or_above: LoadSeverity,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            types: HashMap::new(),
            encoders: Vec::new(),
            excluded: Vec::new(),
            slice: None,
            observer: None,
            alert_at_or_above: LoadSeverity::Critical,
        }
    }
}

impl fmt::Debug for TableOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableOptions")
            .field("types", &self.types)
            .field("encoders", &self.encoders)
            .field("excluded", &self.excluded)
            .field("slice", &self.slice)
            .field("observer_set", &self.observer.is_some())
            .field("alert_at_or_above", &self.alert_at_or_above)
            .finish()
    }
}

impl TableOptions {
    /// Same as [`Default::default`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Deserialize the data-shaping options from JSON. Observer fields keep their defaults.
    pub fn from_json(json: &str) -> DatasetResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Declare the type of `column`.
    pub fn with_type(mut self, column: impl Into<String>, spec: TypeSpec) -> Self {
        self.types.insert(column.into(), spec);
        self
    }

    /// Label-encode `column` while parsing.
    pub fn with_encoder(mut self, column: impl Into<String>) -> Self {
        self.encoders.push(column.into());
        self
    }

    /// Drop `column` after parsing the header.
    pub fn exclude(mut self, column: impl Into<String>) -> Self {
        self.excluded.push(column.into());
        self
    }

    /// Keep only data rows `start..end`.
    pub fn with_slice(mut self, start: usize, end: Option<usize>) -> Self {
        self.slice = Some(SliceWindow::new(start, end));
        self
    }

    /// Report load outcomes to `observer`, alerting at or above the given severity.
    pub fn with_observer(mut self, observer: Arc<dyn LoadObserver>, alert_at_or_above: LoadSeverity) -> Self {
        self.observer = Some(observer);
        self.alert_at_or_above = alert_at_or_above;
        self
    }
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(name) => vec![name],
        OneOrMany::Many(names) => names,
    })
}

#[cfg(test)]
mod tests {
    use super::{SliceWindow, TableOptions};
    use crate::error::DatasetError;
    use crate::ingestion::LoadSeverity;

    #[test]
    fn slice_window_clamps_to_length() {
        assert_eq!(SliceWindow::new(1, Some(3)).apply(vec![0, 1, 2, 3, 4]), vec![1, 2]);
        assert_eq!(SliceWindow::new(2, None).apply(vec![0, 1, 2, 3]), vec![2, 3]);
        assert_eq!(SliceWindow::new(5, Some(9)).apply(vec![0, 1]), Vec::<i32>::new());
        assert_eq!(SliceWindow::new(3, Some(1)).bounds(10), 1..1);
    }

    #[test]
    fn from_json_accepts_list_and_slice() {
        let opts = TableOptions::from_json(
            r#"{"excluded": ["a", "b"], "slice": {"start": 2}, "types": {"x": "bigint"}}"#,
        )
        .unwrap();
        assert_eq!(opts.excluded, vec!["a", "b"]);
        assert_eq!(opts.slice, Some(SliceWindow::new(2, None)));
        assert_eq!(opts.types["x"].name(), "bigint");
        assert!(opts.encoders.is_empty());
        assert_eq!(opts.alert_at_or_above, LoadSeverity::Critical);
    }

    #[test]
    fn from_json_rejects_unknown_type_tags() {
        let err = TableOptions::from_json(r#"{"types": {"x": "decimal"}}"#).unwrap_err();
        assert!(matches!(err, DatasetError::Config(_)));
    }

    #[test]
    fn builder_helpers_accumulate() {
        let opts = TableOptions::new()
            .with_encoder("city")
            .exclude("id")
            .with_slice(0, Some(10));
        assert_eq!(opts.encoders, vec!["city"]);
        assert_eq!(opts.excluded, vec!["id"]);
        assert_eq!(opts.slice.map(|s| s.end), Some(Some(10)));
        assert!(format!("{opts:?}").contains("observer_set: false"));
    }
}
