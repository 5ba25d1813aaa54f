/// Typed errors for the echo transforms.
/// Classifies errors as recoverable (the HTTP layer substitutes the fallback
/// payload) or unrecoverable (no defined recovery).
#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    // Recoverable — the caller substitutes the fallback payload
    #[error("payload is not a JSON object: {source}")]
    InvalidPayload { source: serde_json::Error },
    #[error("echo serialization failed: {source}")]
    Serialize { source: serde_json::Error },

    // Unrecoverable — the fallback payload itself failed to serialize
    #[error("fallback serialization failed: {source}")]
    FallbackSerialization { source: serde_json::Error },
}

impl TransformError {
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::FallbackSerialization { .. })
    }

    /// Short classification string for logging.
    pub fn error_kind(&self) -> &'static str {
        match self {
            Self::InvalidPayload { .. } => "invalid_payload",
            Self::Serialize { .. } => "serialize",
            Self::FallbackSerialization { .. } => "fallback_serialization",
        }
    }
}
