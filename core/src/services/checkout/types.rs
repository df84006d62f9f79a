//! Result and notification types for the checkout flow

use std::fmt;

use chrono::{DateTime, Utc};

use crate::domain::entities::{ContactMethod, SessionStatus};

/// Which step of the flow the payer is on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowState {
    /// Collecting a phone number or email to send the code to
    CollectingContact,
    /// A code was requested; collecting digits and counting down
    AwaitingCode,
    /// Verification succeeded or the session was already completed
    Completed,
    /// The attempt budget is spent and the server locked the session
    Locked,
}

/// How the flow was entered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowMode {
    /// The payer picks the contact the code is sent to
    Standard,
    /// The merchant preset the contact; code is requested at bootstrap
    Direct,
}

/// Result of a successful code generation call
#[derive(Debug, Clone, PartialEq)]
pub struct OtpIssued {
    /// Server-issued reference identifying the code
    pub reference: String,
    /// When the code expires
    pub expires_at: DateTime<Utc>,
}

/// Receiver details echoed back with a successful verification
#[derive(Debug, Clone, PartialEq)]
pub struct ReceiverDetails {
    /// Contact the code was delivered to
    pub receiver: String,
    /// Account holder name, when the server knows one
    pub name: Option<String>,
    /// Account email, when the server knows one
    pub email: Option<String>,
    /// Delivery channel name
    pub kind: String,
    /// Code reference that was verified
    pub reference: String,
}

/// Result of a successful verification call
#[derive(Debug, Clone, PartialEq)]
pub struct VerifyReceipt {
    /// Whether the server marked the session verified
    pub verified: bool,
    /// Where to send the payer next, when the merchant configured one
    pub redirect_url: Option<String>,
    /// Receiver details, when the server attached them
    pub details: Option<ReceiverDetails>,
}

/// Outcome of [`CheckoutFlow::bootstrap`](super::CheckoutFlow::bootstrap)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootstrapOutcome {
    /// The session resolved and the flow is ready
    Ready { mode: FlowMode, state: FlowState },
    /// A newer action superseded this bootstrap; its result was discarded
    Superseded,
}

/// Outcome of [`CheckoutFlow::request_code`](super::CheckoutFlow::request_code)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestOutcome {
    /// A code is on its way to `destination`
    Sent { destination: String },
    /// A newer action superseded this request; its result was discarded
    Superseded,
}

/// Outcome of [`CheckoutFlow::resend_code`](super::CheckoutFlow::resend_code)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResendOutcome {
    /// A fresh code is on its way
    Sent,
    /// The cooldown has not elapsed; nothing was sent
    CooldownActive { seconds_left: u64 },
    /// A newer action superseded this resend; its result was discarded
    Superseded,
}

/// Outcome of [`CheckoutFlow::submit_code`](super::CheckoutFlow::submit_code)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Verification succeeded and the flow is complete
    Completed {
        redirect_url: Option<String>,
        receiver_name: Option<String>,
    },
    /// A newer action superseded this submit; its result was discarded
    Superseded,
}

/// User-facing event published by the flow controller.
///
/// The `Display` impl renders the exact message the checkout shows, so
/// front ends can print notices verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowNotice {
    /// A code was sent; `destination` is set for direct checkouts
    CodeSent { destination: Option<String> },
    /// A fresh code replaced the previous one
    CodeResent,
    /// The active code passed its expiry deadline
    CodeExpired,
    /// The session could not be loaded
    SessionLoadFailed { message: String },
    /// The session is in a terminal status and cannot be verified
    SessionClosed { status: SessionStatus },
    /// Code generation was rejected by the server
    GenerationFailed { message: String },
    /// A request never produced a server response
    TransportFailure { message: String },
    /// Submit was attempted with empty digit slots
    IncompleteCode,
    /// The server rejected the code but attempts remain
    VerificationFailed { message: String, remaining_tries: u32 },
    /// Verification succeeded and a redirect is scheduled
    VerificationSucceeded { name: Option<String> },
    /// The attempt budget is spent and the session is locked
    LockedOut { message: String },
}

impl fmt::Display for FlowNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlowNotice::CodeSent { destination: Some(destination) } => {
                write!(f, "OTP sent to {}", destination)
            }
            FlowNotice::CodeSent { destination: None } => write!(f, "OTP sent successfully!"),
            FlowNotice::CodeResent => write!(f, "OTP resent successfully!"),
            FlowNotice::CodeExpired => {
                write!(f, "OTP has expired. Please request a new one.")
            }
            FlowNotice::SessionLoadFailed { message } => write!(f, "{}", message),
            FlowNotice::SessionClosed { status } => match status {
                SessionStatus::Expired => write!(f, "This checkout session has expired"),
                SessionStatus::Cancelled => write!(f, "This checkout session was cancelled"),
                _ => write!(f, "This checkout session is {}", status),
            },
            FlowNotice::GenerationFailed { message } => write!(f, "{}", message),
            FlowNotice::TransportFailure { message } => write!(f, "{}", message),
            FlowNotice::IncompleteCode => write!(f, "Please enter complete OTP"),
            FlowNotice::VerificationFailed { message, remaining_tries } => {
                write!(f, "{} ({} tries left)", message, remaining_tries)
            }
            FlowNotice::VerificationSucceeded { name: Some(name) } => {
                write!(f, "Welcome {}! Redirecting...", name)
            }
            FlowNotice::VerificationSucceeded { name: None } => {
                write!(f, "Verification successful! Redirecting...")
            }
            FlowNotice::LockedOut { message } => write!(f, "{}", message),
        }
    }
}

/// Read-only view of the flow for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowSnapshot {
    /// Current step
    pub state: FlowState,
    /// Standard or direct entry
    pub mode: FlowMode,
    /// Merchant project name, once the session resolved
    pub project_name: Option<String>,
    /// Contact the code goes to, once one is bound
    pub contact: Option<ContactMethod>,
    /// Digit slots of the active challenge
    pub slots: Vec<Option<char>>,
    /// Filled slot count
    pub filled_slots: usize,
    /// Attempts left, while a challenge is active
    pub remaining_tries: Option<u32>,
    /// Failed attempts recorded, while a challenge is active
    pub failed_attempts: Option<u32>,
    /// Seconds before resend unlocks
    pub cooldown_seconds: u64,
    /// Code expiry countdown rendered as `m:ss`
    pub expiry_display: Option<String>,
    /// Seconds before the code expires
    pub expiry_seconds_left: Option<i64>,
    /// First name extracted from the verification receipt
    pub verified_name: Option<String>,
    /// A generation request is in flight
    pub generating: bool,
    /// A verification request is in flight
    pub verifying: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notice_messages_match_checkout_copy() {
        assert_eq!(
            FlowNotice::CodeSent { destination: None }.to_string(),
            "OTP sent successfully!"
        );
        assert_eq!(
            FlowNotice::CodeSent { destination: Some("0501234567".to_string()) }.to_string(),
            "OTP sent to 0501234567"
        );
        assert_eq!(FlowNotice::CodeResent.to_string(), "OTP resent successfully!");
        assert_eq!(
            FlowNotice::CodeExpired.to_string(),
            "OTP has expired. Please request a new one."
        );
        assert_eq!(
            FlowNotice::IncompleteCode.to_string(),
            "Please enter complete OTP"
        );
    }

    #[test]
    fn test_verification_notices_include_name_and_tries() {
        assert_eq!(
            FlowNotice::VerificationSucceeded { name: Some("Ama".to_string()) }.to_string(),
            "Welcome Ama! Redirecting..."
        );
        assert_eq!(
            FlowNotice::VerificationSucceeded { name: None }.to_string(),
            "Verification successful! Redirecting..."
        );
        assert_eq!(
            FlowNotice::VerificationFailed {
                message: "Invalid OTP".to_string(),
                remaining_tries: 2
            }
            .to_string(),
            "Invalid OTP (2 tries left)"
        );
    }

    #[test]
    fn test_session_closed_notices_name_the_status() {
        assert_eq!(
            FlowNotice::SessionClosed { status: SessionStatus::Expired }.to_string(),
            "This checkout session has expired"
        );
        assert_eq!(
            FlowNotice::SessionClosed { status: SessionStatus::Cancelled }.to_string(),
            "This checkout session was cancelled"
        );
        assert_eq!(
            FlowNotice::SessionClosed { status: SessionStatus::Failed }.to_string(),
            "This checkout session is failed"
        );
    }
}
