//! Boundary traits the checkout flow controller depends on

use async_trait::async_trait;

use crate::domain::entities::{CheckoutSession, ContactMethod};
use crate::errors::ApiError;

use super::types::{FlowNotice, OtpIssued, VerifyReceipt};

/// Client for the GateKeep verification service.
///
/// Implementations own transport, serialization, and error-body
/// decoding; the controller only sees domain types and [`ApiError`].
#[async_trait]
pub trait CheckoutApi: Send + Sync {
    /// Resolve a checkout session from its opaque token.
    ///
    /// # Arguments
    /// * `session_token` - token from the checkout URL
    ///
    /// # Returns
    /// * `Ok(CheckoutSession)` - the session as the server sees it
    /// * `Err(ApiError)` - HTTP failure or transport failure
    async fn fetch_session(&self, session_token: &str) -> Result<CheckoutSession, ApiError>;

    /// Ask the server to issue and deliver a one-time code.
    ///
    /// # Arguments
    /// * `session_token` - session the code belongs to
    /// * `contact` - where to deliver the code
    /// * `code_length` - number of digits to issue
    ///
    /// # Returns
    /// * `Ok(OtpIssued)` - reference and expiry of the issued code
    /// * `Err(ApiError)` - rejection (429 throttle, 402 quota, other) or
    ///   transport failure
    async fn generate_code(
        &self,
        session_token: &str,
        contact: &ContactMethod,
        code_length: usize,
    ) -> Result<OtpIssued, ApiError>;

    /// Submit a complete code for verification.
    ///
    /// # Arguments
    /// * `session_token` - session being verified
    /// * `reference` - reference of the code being answered
    /// * `code` - the digits the payer entered
    ///
    /// # Returns
    /// * `Ok(VerifyReceipt)` - the server accepted the submission
    /// * `Err(ApiError)` - rejection carrying the attempt counters and
    ///   lockout detail, or transport failure
    async fn verify_code(
        &self,
        session_token: &str,
        reference: &str,
        code: &str,
    ) -> Result<VerifyReceipt, ApiError>;
}

/// Sink for user-facing flow notices.
///
/// Called from the controller and from countdown tasks, so
/// implementations must tolerate concurrent calls.
pub trait FlowNotifier: Send + Sync {
    fn notify(&self, notice: FlowNotice);
}

/// Performs the navigation a completed or locked flow schedules.
pub trait Navigator: Send + Sync {
    fn navigate(&self, url: &str);
}
