//! FX error types.

use purchase_common::PurchaseError;
use thiserror::Error;

/// Errors that abort an exchange rate fetch.
#[derive(Debug, Error)]
pub enum FxError {
    /// Provider answered with a non-success HTTP status.
    #[error("Exchange rate service call failed with status {status_code}")]
    ExternalService { status_code: u16 },

    /// Request could not be sent or the connection failed.
    #[error("Exchange rate transport error: {0}")]
    Transport(String),

    /// Response body was not a rate page.
    #[error("Invalid exchange rate response: {0}")]
    Decode(String),

    /// Request timed out.
    #[error("Exchange rate request timed out")]
    Timeout,

    /// Query parameters are unusable.
    #[error("Invalid rate query: {0}")]
    InvalidQuery(String),

    /// Source configuration is unusable.
    #[error("Invalid rate source configuration: {0}")]
    Configuration(String),
}

impl FxError {
    /// Status code returned by the provider, if this is a status failure.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            FxError::ExternalService { status_code } => Some(*status_code),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for FxError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FxError::Timeout
        } else if err.is_decode() {
            FxError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            FxError::ExternalService {
                status_code: status.as_u16(),
            }
        } else {
            FxError::Transport(err.to_string())
        }
    }
}

impl From<FxError> for PurchaseError {
    fn from(err: FxError) -> Self {
        match err {
            FxError::ExternalService { status_code } => {
                PurchaseError::ExternalService { status_code }
            }
            FxError::Timeout => PurchaseError::Timeout("exchange rate request".to_string()),
            FxError::Transport(msg) | FxError::Decode(msg) => PurchaseError::NetworkError(msg),
            FxError::InvalidQuery(msg) => PurchaseError::validation(msg),
            FxError::Configuration(msg) => PurchaseError::ConfigurationError(msg),
        }
    }
}

/// Result type for FX operations.
pub type FxResult<T> = Result<T, FxError>;

/// Why a single raw rate record was dropped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("unparsable record date {0:?}")]
    InvalidDate(String),

    #[error("unparsable exchange rate {0:?}")]
    InvalidRate(String),

    #[error("missing field {0}")]
    MissingField(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_passthrough() {
        let err: PurchaseError = FxError::ExternalService { status_code: 429 }.into();
        assert_eq!(err.status_code(), Some(429));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_invalid_query_becomes_validation() {
        let err: PurchaseError = FxError::InvalidQuery("empty currency".into()).into();
        assert!(matches!(err, PurchaseError::Validation { .. }));
    }
}
