use thiserror::Error;

#[derive(Debug, Error)]
pub enum TradeBiasError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl TradeBiasError {
    pub(crate) fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        TradeBiasError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for TradeBiasError {
    fn from(e: serde_json::Error) -> Self {
        TradeBiasError::SerializationError(e.to_string())
    }
}
