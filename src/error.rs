use thiserror::Error;

/// Convenience result type for the fallible edges of the crate (record I/O, config, engine setup).
pub type FlattenResult<T> = Result<T, FlattenError>;

/// Error type returned by record reading/writing, mapping loading and engine construction.
///
/// Projection itself never fails; see [`crate::processing::project`].
#[derive(Debug, Error)]
pub enum FlattenError {
    /// Underlying I/O error (e.g. file not found, permission denied).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Input is not valid JSON, or does not have the shape of a record / field mapping.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Well-formed JSON whose outer layout is not a record, a list of records, or NDJSON.
    #[error("schema mismatch: {message}")]
    SchemaMismatch { message: String },

    /// Invalid [`crate::execution::ExecutionOptions`] or thread pool setup failure.
    #[error("configuration error: {message}")]
    Configuration { message: String },
}
