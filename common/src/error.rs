//! Error types for the purchase conversion pipeline.

use crate::TransactionId;
use thiserror::Error;

/// Main error type for purchase operations.
#[derive(Error, Debug)]
pub enum PurchaseError {
    /// Request or record failed validation.
    #[error("Validation failed: {message}")]
    Validation {
        message: String,
        field: Option<String>,
    },

    /// Transaction does not exist.
    #[error("Transaction with ID {0} not found")]
    TransactionNotFound(TransactionId),

    /// The exchange rate provider answered with a non-success status.
    #[error("Exchange rate service returned status {status_code}")]
    ExternalService { status_code: u16 },

    /// The exchange rate provider could not be reached or returned garbage.
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Storage collaborator failure.
    #[error("Storage error: {0}")]
    StorageError(String),

    /// Caller deadline exceeded.
    #[error("Operation timed out: {0}")]
    Timeout(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl PurchaseError {
    /// Create a validation error without a field.
    pub fn validation(message: impl Into<String>) -> Self {
        PurchaseError::Validation {
            message: message.into(),
            field: None,
        }
    }

    /// Create a validation error naming the offending field.
    pub fn invalid_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        PurchaseError::Validation {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Check if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            PurchaseError::ExternalService { .. }
                | PurchaseError::NetworkError(_)
                | PurchaseError::Timeout(_)
        )
    }

    /// Status code reported by the exchange rate provider, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            PurchaseError::ExternalService { status_code } => Some(*status_code),
            _ => None,
        }
    }

    /// Get a stable error code for callers.
    pub fn error_code(&self) -> &'static str {
        match self {
            PurchaseError::Validation { .. } => "VALIDATION_FAILED",
            PurchaseError::TransactionNotFound(_) => "TRANSACTION_NOT_FOUND",
            PurchaseError::ExternalService { .. } => "EXTERNAL_SERVICE_ERROR",
            PurchaseError::NetworkError(_) => "NETWORK_ERROR",
            PurchaseError::StorageError(_) => "STORAGE_ERROR",
            PurchaseError::Timeout(_) => "TIMEOUT",
            PurchaseError::ConfigurationError(_) => "CONFIGURATION_ERROR",
            PurchaseError::InternalError(_) => "INTERNAL_ERROR",
        }
    }
}

/// Result type alias for purchase operations.
pub type Result<T> = std::result::Result<T, PurchaseError>;
