use crate::{api::ApiError, session::StoreError};
use thiserror::Error;

/// Errors surfaced by the signup flow. Each one is terminal to the operation
/// that produced it only; the flow stays resumable.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum FlowError {
    /// Malformed local input; no request was sent.
    #[error("{0}")]
    Validation(String),
    #[error("Please enter a valid 6-digit OTP")]
    InvalidOtpFormat,
    /// Non-success status from the service; the message is shown verbatim.
    #[error("{0}")]
    ServiceRejection(String),
    /// The request could not complete. `detail` is for logs only.
    #[error("An error occurred. Please try again.")]
    Transport { detail: String },
    /// Verification succeeded without a token.
    #[error("Verification failed")]
    ProtocolViolation,
    #[error("Could not update the session store: {0}")]
    Store(String),
}

impl FlowError {
    /// Maps an API failure, using `fallback` when the service gave no message.
    #[must_use]
    pub fn from_api(err: ApiError, fallback: &str) -> Self {
        match err {
            ApiError::Http { message, .. } => {
                Self::ServiceRejection(message.unwrap_or_else(|| fallback.to_string()))
            }
            other => Self::Transport {
                detail: other.to_string(),
            },
        }
    }

    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }
}

impl From<StoreError> for FlowError {
    fn from(err: StoreError) -> Self {
        Self::Store(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_message_is_verbatim_with_fallback() {
        let with_message = ApiError::Http {
            status: 401,
            message: Some("Invalid code".to_string()),
        };
        assert_eq!(
            FlowError::from_api(with_message, "Verification failed").to_string(),
            "Invalid code"
        );

        let without_message = ApiError::Http {
            status: 500,
            message: None,
        };
        assert_eq!(
            FlowError::from_api(without_message, "Failed to send OTP").to_string(),
            "Failed to send OTP"
        );
    }

    #[test]
    fn transport_failures_are_generic_and_retryable() {
        let err = FlowError::from_api(
            ApiError::Timeout("Request timed out.".to_string()),
            "Failed to send OTP",
        );
        assert!(err.is_retryable());
        assert_eq!(err.to_string(), "An error occurred. Please try again.");
        assert!(!FlowError::InvalidOtpFormat.is_retryable());
    }
}
