use thiserror::Error;

#[derive(Debug, Error)]
pub enum AutoFinError {
    #[error("Invalid input: {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("No eligible plans: {0}")]
    NoEligiblePlans(String),

    #[error("Scoring failed for plan '{plan_id}': {reason}")]
    ScoringFailure { plan_id: String, reason: String },

    #[error("Invalid configuration: {field}: {reason}")]
    InvalidConfig { field: String, reason: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl AutoFinError {
    pub(crate) fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        AutoFinError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// A Decimal computation on `field` left the representable range.
    pub(crate) fn overflow(field: impl Into<String>) -> Self {
        AutoFinError::InvalidInput {
            field: field.into(),
            reason: "Arithmetic overflow".into(),
        }
    }
}

impl From<serde_json::Error> for AutoFinError {
    fn from(e: serde_json::Error) -> Self {
        AutoFinError::SerializationError(e.to_string())
    }
}
