//! Checkout flow error types and error handling.

mod api;

// Re-export all error types and utilities
pub use api::{ApiError, ApiFailure};

use thiserror::Error;

/// Errors surfaced by the checkout flow controller.
///
/// Display strings double as the user-facing messages, so variants that
/// reach the payer render the exact text the verification flow shows.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FlowError {
    /// The session could not be resolved or is in a terminal status
    #[error("{reason}")]
    SessionUnresolvable { reason: String },

    /// The contact value failed local validation
    #[error("{message}")]
    InvalidContact { field: String, message: String },

    /// The server rate-limited code generation (HTTP 429)
    #[error("Too many requests. Please wait before requesting another OTP.")]
    Throttled,

    /// The merchant account cannot send codes (HTTP 402)
    #[error("Insufficient balance. Please contact support.")]
    QuotaExhausted,

    /// Code generation failed for any other server-reported reason
    #[error("{message}")]
    GenerationFailed { message: String },

    /// Submit was attempted before every digit slot was filled
    #[error("Please enter complete OTP")]
    IncompleteCode { filled: usize, expected: usize },

    /// The server rejected the code but attempts remain
    #[error("{message} ({remaining_tries} tries left)")]
    VerificationFailed {
        message: String,
        remaining_tries: u32,
        failed_attempts: u32,
    },

    /// The attempt budget is spent and the session is locked
    #[error("{message}")]
    Locked {
        message: String,
        redirect_url: Option<String>,
    },

    /// The request never produced a server response
    #[error("{message}")]
    Transport { message: String },

    /// The same kind of request is already in flight
    #[error("{action} is already in progress")]
    ActionPending { action: String },

    /// The contact is preset by the merchant and cannot be changed
    #[error("The contact method is fixed for this checkout")]
    ContactLocked,

    /// The operation does not apply to the current flow state
    #[error("{operation} is not available in the current flow state")]
    InvalidState { operation: String },
}

pub type FlowResult<T> = Result<T, FlowError>;
