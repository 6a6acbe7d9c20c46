//! Error types shared by the order-management crates.

use thiserror::Error;

/// Order-management error kinds.
///
/// Every core operation returns one of these; the request adapter maps
/// them onto its transport's status codes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OmsError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
}

impl OmsError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Short label for metrics and logs.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::NotFound(_) => "not_found",
            Self::Conflict(_) => "conflict",
            Self::InvalidTransition(_) => "invalid_transition",
        }
    }
}

/// Result type alias for order-management operations.
pub type OmsResult<T> = std::result::Result<T, OmsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = OmsError::not_found("order missing-id");
        assert_eq!(err.to_string(), "Not found: order missing-id");
        assert!(err.is_not_found());
        assert_eq!(err.kind(), "not_found");
    }
}
