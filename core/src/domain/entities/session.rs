//! Checkout session entity resolved from the verification service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::contact::ContactMethod;

/// Lifecycle status of a checkout session as reported by the server.
///
/// Only `Pending` sessions accept verification; every other status is
/// terminal and the flow refuses to start on one.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    /// Session is awaiting verification
    Pending,
    /// Verification already succeeded for this session
    Completed,
    /// Verification failed terminally on the server side
    Failed,
    /// Session passed its expiry deadline before verification
    Expired,
    /// Merchant or payer cancelled the session
    Cancelled,
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionStatus::Pending => "pending",
            SessionStatus::Completed => "completed",
            SessionStatus::Failed => "failed",
            SessionStatus::Expired => "expired",
            SessionStatus::Cancelled => "cancelled",
        };
        write!(f, "{}", name)
    }
}

/// Checkout session entity for hosted OTP verification.
///
/// A session is created server-side by the merchant integration and
/// resolved by the client from an opaque session token. It carries the
/// merchant display name and, for direct checkouts, a preset contact
/// the code must be delivered to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSession {
    /// Opaque token identifying this session
    pub session_token: String,

    /// Merchant project name shown to the payer
    pub project_name: String,

    /// Current lifecycle status
    pub status: SessionStatus,

    /// Preset delivery phone number, when the merchant fixed one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,

    /// Preset delivery email, when the merchant fixed one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// When the session itself expires
    pub expires_at: DateTime<Utc>,

    /// Merchant-supplied metadata echoed back by the server
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

impl CheckoutSession {
    /// Check if the session still accepts verification.
    ///
    /// # Returns
    /// * `bool` - true only while the session is pending
    pub fn is_open(&self) -> bool {
        self.status == SessionStatus::Pending
    }

    /// Contact method preset by the merchant, if any.
    ///
    /// A session carrying a phone number or email enters the direct flow:
    /// the payer never picks a contact and the code is sent to the preset
    /// destination. Phone wins when both are present. Empty strings count
    /// as unset.
    ///
    /// # Returns
    /// * `Option<ContactMethod>` - the preset contact, or None for the
    ///   standard flow where the payer enters one
    pub fn preset_contact(&self) -> Option<ContactMethod> {
        if let Some(phone) = self.phone_number.as_deref() {
            if !phone.is_empty() {
                return Some(ContactMethod::Phone(phone.to_string()));
            }
        }
        if let Some(email) = self.email.as_deref() {
            if !email.is_empty() {
                return Some(ContactMethod::Email(email.to_string()));
            }
        }
        None
    }
}
