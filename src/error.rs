use thiserror::Error;

/// Convenience result type for dataset operations.
pub type DatasetResult<T> = Result<T, DatasetError>;

/// Error type returned by dataset construction, column, encoding and grouping operations.
///
/// This is a single error enum shared across parsing, the column catalog, label encoding
/// and loading.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// Underlying I/O error (e.g. file not found, permission denied).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV tokenizer error.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[cfg(feature = "http")]
    /// Transport-level HTTP failure (feature-gated behind `http`).
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered, but not with a success status.
    #[error("http request to '{url}' failed with status {status}")]
    HttpStatus { status: u16, url: String },

    /// A column name is not part of the header.
    #[error("column not found: '{name}'")]
    ColumnNotFound { name: String },

    /// A column with this name is already registered.
    #[error("duplicate column: '{name}'")]
    DuplicateColumn { name: String },

    /// A code was decoded that the encoder has never handed out.
    #[error("encoded index {index} out of range (encoder knows {len} values)")]
    EncodingRange { index: usize, len: usize },

    /// One-hot encoding was requested for a value the encoder has never seen.
    #[error("value {value} has not been encoded")]
    UnknownLabel { value: String },

    /// The column has no label encoder to decode with.
    #[error("column '{column}' is not label-encoded")]
    NotEncoded { column: String },

    /// A cell of an encoded column does not hold a non-negative integer code.
    #[error("column '{column}' holds '{raw}', which is not an encoded index")]
    InvalidCode { column: String, raw: String },

    /// A value could not be converted by the column's coercer.
    #[error("failed to coerce value at row {row} column '{column}': {message} (raw='{raw}')")]
    Coercion {
        row: usize,
        column: String,
        raw: String,
        message: String,
    },

    /// A row or value list does not match the expected width or row count.
    #[error("expected {expected} values, found {found}")]
    LengthMismatch { expected: usize, found: usize },

    /// Options could not be deserialized.
    #[error("invalid options: {0}")]
    Config(#[from] serde_json::Error),

    /// The input text does not have a consistent tabular shape.
    #[error("malformed input at line {line}: {message}")]
    Format { line: usize, message: String },
}
