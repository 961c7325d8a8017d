use thiserror::Error;

#[derive(Debug, Error)]
pub enum SpongeKitError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Division undefined in {context}")]
    DivisionUndefined { context: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl SpongeKitError {
    pub(crate) fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        SpongeKitError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for SpongeKitError {
    fn from(e: serde_json::Error) -> Self {
        SpongeKitError::SerializationError(e.to_string())
    }
}
