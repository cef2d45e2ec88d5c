//! Error types for the resource store

use thiserror::Error;

/// Result type for store operations
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors surfaced by the store and by payload validation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// No record with this identifier is currently held
    #[error("{collection} record not found: {id}")]
    NotFound { collection: &'static str, id: String },

    /// Payload failed required-field or type constraints
    #[error("Validation error: {0}")]
    Validation(String),
}

impl StoreError {
    /// Create a not found error
    pub fn not_found(collection: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            collection,
            id: id.to_string(),
        }
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Validation(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        let err = StoreError::not_found("tasks", 42);
        assert_eq!(err.to_string(), "tasks record not found: 42");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_validation_display() {
        let err = StoreError::validation("title must not be empty");
        assert_eq!(err.to_string(), "Validation error: title must not be empty");
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_error_from_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: StoreError = json_err.into();
        assert!(matches!(err, StoreError::Validation(_)));
    }
}
