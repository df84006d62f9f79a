//! Errors produced at the verification service boundary.

use thiserror::Error;

/// Failure detail the server attaches to a rejected verification.
///
/// Decoded from the error body of `verify_otp`; every field is optional
/// on the wire and absent fields are read as their zero values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApiFailure {
    /// The session was locked after too many failed attempts
    pub locked: bool,
    /// Failed attempts recorded so far
    pub failed_attempts: Option<u32>,
    /// Attempts left before lockout
    pub remaining_tries: Option<u32>,
    /// Where to send the payer after a lockout, when the server says so
    pub redirect_url: Option<String>,
}

/// Error returned by a [`CheckoutApi`](crate::services::CheckoutApi) implementation.
///
/// `Http` carries the message already extracted from the response body
/// (the server's `error` field, falling back to `message`, falling back
/// to a generic phrase). `Transport` covers everything that never
/// produced a server response.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    #[error("{message}")]
    Http {
        status: u16,
        message: String,
        failure: Option<ApiFailure>,
    },

    #[error("{message}")]
    Transport { message: String },
}

impl ApiError {
    /// HTTP status code, when a response was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            ApiError::Transport { .. } => None,
        }
    }

    /// The extracted error message.
    pub fn message(&self) -> &str {
        match self {
            ApiError::Http { message, .. } => message,
            ApiError::Transport { message } => message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_is_present_only_for_http_errors() {
        let http = ApiError::Http {
            status: 429,
            message: "Rate limited".to_string(),
            failure: None,
        };
        let transport = ApiError::Transport {
            message: "connection refused".to_string(),
        };

        assert_eq!(http.status(), Some(429));
        assert_eq!(transport.status(), None);
    }

    #[test]
    fn test_message_passes_through() {
        let err = ApiError::Http {
            status: 400,
            message: "Invalid OTP".to_string(),
            failure: Some(ApiFailure {
                locked: false,
                failed_attempts: Some(1),
                remaining_tries: Some(2),
                redirect_url: None,
            }),
        };
        assert_eq!(err.message(), "Invalid OTP");
        assert_eq!(err.to_string(), "Invalid OTP");
    }
}
