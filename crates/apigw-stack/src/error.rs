use thiserror::Error;

/// Convenient result alias for stack definition operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level stack definition error type.
#[derive(Debug, Error)]
pub enum Error {
    /// A configuration value failed validation.
    #[error("invalid configuration: {field} {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    /// Wrapper for IO errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Wrapper for JSON (de)serialization errors.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field,
            reason: reason.into(),
        }
    }
}
