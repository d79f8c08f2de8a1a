//! Local file loading.

use std::path::Path;

use crate::dataset::DataSet;
use crate::error::{DatasetError, DatasetResult};

use super::observability::{report, LoadContext, LoadStats};
use super::options::TableOptions;

/// Read `path` as UTF-8 text and parse it with [`DataSet::parse`].
///
/// When an observer is configured it receives the outcome. A missing or unreadable file is
/// reported as [`super::LoadSeverity::Critical`].
pub fn load_from_path(path: impl AsRef<Path>, options: &TableOptions) -> DatasetResult<DataSet> {
    let path = path.as_ref();
    let ctx = LoadContext::new(path.display().to_string());

    let result = std::fs::read_to_string(path)
        .map_err(DatasetError::from)
        .and_then(|text| DataSet::parse(&text, options));

    report(options, &ctx, &result, stats_of);
    result
}

pub(crate) fn stats_of(ds: &DataSet) -> LoadStats {
    LoadStats {
        rows: ds.row_count(),
        columns: ds.column_count(),
    }
}
