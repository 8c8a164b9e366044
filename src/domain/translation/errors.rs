// ============================================================================
// Translation Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum TranslationError {
    /// Not retryable without a code change
    #[error("The topic: {0} is not recognized.")]
    UnknownTopic(String),

    /// Every missing field is listed, not just the first one found
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<String>),

    #[error("The {0} is required in the payload")]
    MissingUserId(&'static str),

    #[error("Invalid value for field {field}: {reason}")]
    InvalidField { field: String, reason: String },

    #[error("Malformed payload: {0}")]
    Malformed(#[from] serde_json::Error),
}

impl TranslationError {
    /// Whether the sender can fix the payload and redeliver
    pub fn is_retryable(&self) -> bool {
        !matches!(self, TranslationError::UnknownTopic(_))
    }
}
