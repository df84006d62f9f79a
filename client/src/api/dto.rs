//! Wire types for the checkout verification endpoints
//!
//! Field names follow the service's camelCase JSON. Conversions into the
//! domain types live here so the HTTP client stays a thin transport.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use gk_core::services::checkout::{OtpIssued, ReceiverDetails, VerifyReceipt};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateOtpRequest {
    pub session_token: String,
    pub phone_number: String, // empty when the code goes to email
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub size: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateOtpResponse {
    pub message: String,
    pub reference: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyOtpRequest {
    pub session_token: String,
    pub reference: String,
    pub otp: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiverDetailsDto {
    pub receiver: String,
    pub name: Option<String>,
    pub email: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    pub reference: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyOtpResponse {
    pub message: String,
    pub verified: bool,
    pub redirect_url: Option<String>,
    pub details: Option<ReceiverDetailsDto>,
}

/// Error body shape shared by every checkout endpoint.
///
/// Verification rejections additionally carry the attempt counters and
/// the lockout flag.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub error: Option<String>,
    pub message: Option<String>,
    pub locked: Option<bool>,
    pub failed_attempts: Option<u32>,
    pub remaining_tries: Option<u32>,
    pub redirect_url: Option<String>,
}

impl ErrorBody {
    /// User-facing message: `error` wins over `message`, with a generic
    /// fallback when the server sent neither. Blank fields count as absent.
    pub fn resolved_message(&self) -> String {
        self.error
            .clone()
            .filter(|text| !text.is_empty())
            .or_else(|| self.message.clone().filter(|text| !text.is_empty()))
            .unwrap_or_else(|| "An error occurred".to_string())
    }
}

impl From<GenerateOtpResponse> for OtpIssued {
    fn from(response: GenerateOtpResponse) -> Self {
        Self {
            reference: response.reference,
            expires_at: response.expires_at,
        }
    }
}

impl From<ReceiverDetailsDto> for ReceiverDetails {
    fn from(dto: ReceiverDetailsDto) -> Self {
        Self {
            receiver: dto.receiver,
            name: dto.name,
            email: dto.email,
            kind: dto.kind,
            reference: dto.reference,
        }
    }
}

impl From<VerifyOtpResponse> for VerifyReceipt {
    fn from(response: VerifyOtpResponse) -> Self {
        Self {
            verified: response.verified,
            redirect_url: response.redirect_url,
            details: response.details.map(ReceiverDetails::from),
        }
    }
}
