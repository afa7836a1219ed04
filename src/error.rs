//! Custom error types for bizdesk
//!
//! This module defines the error hierarchy for the application using thiserror
//! for ergonomic error definitions.

use thiserror::Error;

use crate::models::EntityKind;

/// The main error type for bizdesk operations
#[derive(Error, Debug)]
pub enum BizdeskError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Validation errors for data models
    #[error("Validation error: {0}")]
    Validation(String),

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// Duplicate entity errors
    #[error("{entity_type} already exists: {identifier}")]
    Duplicate {
        entity_type: &'static str,
        identifier: String,
    },

    /// A document or order cannot move to the requested state
    #[error("Cannot move {entity_type} from {from} to {to}")]
    InvalidTransition {
        entity_type: &'static str,
        from: String,
        to: String,
    },

    /// Attempt to rewrite or remove an append-only record
    #[error("Record is immutable: {0}")]
    Immutable(String),

    /// Credential hashing/verification errors
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Export errors
    #[error("Export error: {0}")]
    Export(String),

    /// Storage errors
    #[error("Storage error: {0}")]
    Storage(String),
}

impl BizdeskError {
    /// Create a "not found" error for any entity kind
    pub fn not_found(kind: EntityKind, identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: kind.type_name(),
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for clients
    pub fn client_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Client",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for users
    pub fn user_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "User",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for quotes
    pub fn quote_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Quote",
            identifier: identifier.into(),
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

impl From<std::io::Error> for BizdeskError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for BizdeskError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Result type alias for bizdesk operations
pub type BizdeskResult<T> = Result<T, BizdeskError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = BizdeskError::Config("test error".into());
        assert_eq!(err.to_string(), "Configuration error: test error");
    }

    #[test]
    fn test_not_found_error() {
        let err = BizdeskError::client_not_found("Acme");
        assert_eq!(err.to_string(), "Client not found: Acme");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_invalid_transition_error() {
        let err = BizdeskError::InvalidTransition {
            entity_type: "WebOrder",
            from: "shipped".into(),
            to: "pending".into(),
        };
        assert_eq!(
            err.to_string(),
            "Cannot move WebOrder from shipped to pending"
        );
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: BizdeskError = io_err.into();
        assert!(matches!(err, BizdeskError::Io(_)));
    }
}
