use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChannelProfitError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for ChannelProfitError {
    fn from(e: serde_json::Error) -> Self {
        ChannelProfitError::SerializationError(e.to_string())
    }
}
