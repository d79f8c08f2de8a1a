//! Load outcome reporting.
//!
//! [`crate::dataset::DataSet::from_path`] and the HTTP loaders report to the observer set
//! on [`super::TableOptions`]:
//!
//! - `on_success` with row/column counts
//! - `on_failure` with a computed [`LoadSeverity`]
//! - `on_alert` when that severity is at or above `alert_at_or_above`

use std::fmt;
use std::sync::Arc;

use crate::error::{DatasetError, DatasetResult};

use super::options::TableOptions;

/// Severity classification used for observer callbacks and alerting thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LoadSeverity {
    Info,
    /// Non-fatal.
    Warning,
    /// The load failed because of its input.
    Error,
    /// The source itself could not be reached or read.
    Critical,
}

/// Where a load came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadContext {
    /// File path or URL.
    pub source: String,
}

impl LoadContext {
    /// Context for a load from `source`.
    pub fn new(source: impl Into<String>) -> Self {
        Self { source: source.into() }
    }
}

/// Minimal stats reported on a successful load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadStats {
    pub rows: usize,
    pub columns: usize,
}

/// Observer interface for load outcomes.
pub trait LoadObserver: Send + Sync {
    fn on_success(&self, _ctx: &LoadContext, _stats: LoadStats) {}

    fn on_failure(&self, _ctx: &LoadContext, _severity: LoadSeverity, _error: &DatasetError) {}

    /// Called when a failure meets the alert threshold.
    ///
    /// Default behavior forwards to [`Self::on_failure`].
    fn on_alert(&self, ctx: &LoadContext, severity: LoadSeverity, error: &DatasetError) {
        self.on_failure(ctx, severity, error)
    }
}

/// Fans callbacks out to several observers.
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn LoadObserver>>,
}

impl CompositeObserver {
    pub fn new(observers: Vec<Arc<dyn LoadObserver>>) -> Self {
        Self { observers }
    }
}

impl fmt::Debug for CompositeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeObserver")
            .field("observers_len", &self.observers.len())
            .finish()
    }
}

impl LoadObserver for CompositeObserver {
    fn on_success(&self, ctx: &LoadContext, stats: LoadStats) {
        for o in &self.observers {
            o.on_success(ctx, stats);
        }
    }

    fn on_failure(&self, ctx: &LoadContext, severity: LoadSeverity, error: &DatasetError) {
        for o in &self.observers {
            o.on_failure(ctx, severity, error);
        }
    }

    fn on_alert(&self, ctx: &LoadContext, severity: LoadSeverity, error: &DatasetError) {
        for o in &self.observers {
            o.on_alert(ctx, severity, error);
        }
    }
}

/// Emits load events as `tracing` events under the `dataset::load` target.
#[derive(Debug, Default)]
pub struct TracingObserver;

impl LoadObserver for TracingObserver {
    fn on_success(&self, ctx: &LoadContext, stats: LoadStats) {
        tracing::info!(
            target: "dataset::load",
            source = %ctx.source,
            rows = stats.rows,
            columns = stats.columns,
            "dataset loaded"
        );
    }

    fn on_failure(&self, ctx: &LoadContext, severity: LoadSeverity, error: &DatasetError) {
        tracing::warn!(
            target: "dataset::load",
            source = %ctx.source,
            severity = ?severity,
            error = %error,
            "dataset load failed"
        );
    }

    fn on_alert(&self, ctx: &LoadContext, severity: LoadSeverity, error: &DatasetError) {
        tracing::error!(
            target: "dataset::load",
            source = %ctx.source,
            severity = ?severity,
            error = %error,
            "dataset load alert"
        );
    }
}

/// Transport failures are critical; anything wrong with the content is an error.
pub fn severity_for_error(e: &DatasetError) -> LoadSeverity {
    match e {
        DatasetError::Io(_) => LoadSeverity::Critical,
        DatasetError::Csv(err) => match err.kind() {
            ::csv::ErrorKind::Io(_) => LoadSeverity::Critical,
            _ => LoadSeverity::Error,
        },
        #[cfg(feature = "http")]
        DatasetError::Http(_) => LoadSeverity::Critical,
        DatasetError::HttpStatus { .. } => LoadSeverity::Critical,
        _ => LoadSeverity::Error,
    }
}

/// Report `result` to the configured observer, if any.
pub(crate) fn report<T>(
    options: &TableOptions,
    ctx: &LoadContext,
    result: &DatasetResult<T>,
    stats: impl FnOnce(&T) -> LoadStats,
) {
    let Some(obs) = options.observer.as_ref() else {
        return;
    };
    match result {
        Ok(value) => obs.on_success(ctx, stats(value)),
        Err(e) => {
            let sev = severity_for_error(e);
            obs.on_failure(ctx, sev, e);
            if sev >= options.alert_at_or_above {
                obs.on_alert(ctx, sev, e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{severity_for_error, LoadSeverity};
    use crate::error::DatasetError;

    #[test]
    fn transport_errors_are_critical() {
        let io = DatasetError::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert_eq!(severity_for_error(&io), LoadSeverity::Critical);

        let status = DatasetError::HttpStatus { status: 404, url: "http://x/".to_string() };
        assert_eq!(severity_for_error(&status), LoadSeverity::Critical);
    }

    #[test]
    fn content_errors_are_errors() {
        let fmt = DatasetError::Format { line: 3, message: "ragged".to_string() };
        assert_eq!(severity_for_error(&fmt), LoadSeverity::Error);

        let missing = DatasetError::ColumnNotFound { name: "a".to_string() };
        assert_eq!(severity_for_error(&missing), LoadSeverity::Error);
    }

    #[test]
    fn severities_are_ordered() {
        assert!(LoadSeverity::Info < LoadSeverity::Warning);
        assert!(LoadSeverity::Error < LoadSeverity::Critical);
    }
}
