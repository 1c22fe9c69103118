use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the pipeline and the read-side lookup layer.
///
/// Row-level problems (a record that cannot be joined or parsed) are not
/// errors: those rows are dropped or coerced to a missing sentinel where
/// each component documents it. Only a completely unavailable input table
/// is fatal, and it must be detected before any artifact is written.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A required input table is missing or unreadable. Fatal.
    #[error("required input table unavailable: {path:?}: {reason}")]
    MissingInput { path: PathBuf, reason: String },

    /// A field failed to parse where a sentinel is not acceptable.
    #[error("failed to parse {field}: {value:?}")]
    ParseFailure { field: &'static str, value: String },

    /// A query-time miss: the key is absent from a produced aggregate.
    /// Distinct from an empty-but-successful result on purpose.
    #[error("not found: {0}")]
    NotFound(String),

    /// A storefront fetch failed for one row. Recoverable per-row.
    #[error("storefront fetch failed for item {item_id}: {reason}")]
    FetchFailure { item_id: u64, reason: String },
}

impl PipelineError {
    pub fn missing_input(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::MissingInput {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub fn not_found(what: impl ToString) -> Self {
        Self::NotFound(what.to_string())
    }
}
