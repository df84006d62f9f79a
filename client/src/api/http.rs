//! HTTP implementation of the checkout verification API
//!
//! Talks to the hosted checkout endpoints over HTTPS and maps responses
//! onto the domain types:
//!
//! - Success bodies decode into [`CheckoutSession`], [`OtpIssued`], and
//!   [`VerifyReceipt`]
//! - Rejections decode into [`ApiError::Http`] with the server's message
//!   and, for verification, the attempt counters and lockout flag
//! - Requests that never produce a server response map to
//!   [`ApiError::Transport`]

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use gk_core::domain::entities::{CheckoutSession, ContactMethod};
use gk_core::errors::{ApiError, ApiFailure};
use gk_core::services::checkout::{CheckoutApi, OtpIssued, VerifyReceipt};
use gk_shared::config::ApiConfig;

use crate::ClientError;

use super::dto::{
    ErrorBody, GenerateOtpRequest, GenerateOtpResponse, VerifyOtpRequest, VerifyOtpResponse,
};

/// HTTP client for the GateKeep verification service
pub struct HttpCheckoutApi {
    client: reqwest::Client,
    config: ApiConfig,
}

impl HttpCheckoutApi {
    /// Create a new client for the configured verification service
    ///
    /// # Arguments
    ///
    /// * `config` - Base URL and request timeout for the service
    pub fn new(config: ApiConfig) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout))
            .build()
            .map_err(|err| ClientError::Config(format!("Failed to build HTTP client: {}", err)))?;

        debug!(
            "Verification service client initialized for {}",
            config.trimmed_base_url()
        );

        Ok(Self { client, config })
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self, ClientError> {
        Self::new(ApiConfig::from_env())
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.config.trimmed_base_url(), path)
    }

    fn transport(err: reqwest::Error) -> ApiError {
        ApiError::Transport {
            message: err.to_string(),
        }
    }

    /// Decode a success body, treating undecodable payloads as transport
    /// failures since no usable server answer arrived.
    async fn decode<T>(response: reqwest::Response) -> Result<T, ApiError>
    where
        T: serde::de::DeserializeOwned,
    {
        response.json::<T>().await.map_err(|err| ApiError::Transport {
            message: format!("Failed to decode response: {}", err),
        })
    }

    /// Read a rejection's status and error body.
    async fn read_rejection(response: reqwest::Response) -> Result<(u16, ErrorBody), ApiError> {
        let status = response.status().as_u16();
        let text = response.text().await.map_err(|err| ApiError::Transport {
            message: format!("Failed to read error response: {}", err),
        })?;
        let body: ErrorBody = serde_json::from_str(&text).map_err(|err| {
            warn!("Undecodable error body from verification service: {}", err);
            ApiError::Transport {
                message: format!("Failed to decode error response: {}", err),
            }
        })?;
        Ok((status, body))
    }
}

#[async_trait]
impl CheckoutApi for HttpCheckoutApi {
    async fn fetch_session(&self, session_token: &str) -> Result<CheckoutSession, ApiError> {
        let url = self.endpoint(&format!("/api/checkout/{}", session_token));
        debug!("Fetching checkout session {}", session_token);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(Self::transport)?;

        if response.status().is_success() {
            Self::decode(response).await
        } else {
            let (status, body) = Self::read_rejection(response).await?;
            warn!("Session lookup rejected with status {}", status);
            Err(ApiError::Http {
                status,
                message: body.resolved_message(),
                failure: None,
            })
        }
    }

    async fn generate_code(
        &self,
        session_token: &str,
        contact: &ContactMethod,
        code_length: usize,
    ) -> Result<OtpIssued, ApiError> {
        let request = match contact {
            ContactMethod::Phone(value) => GenerateOtpRequest {
                session_token: session_token.to_string(),
                phone_number: value.clone(),
                email: None,
                size: code_length,
            },
            ContactMethod::Email(value) => GenerateOtpRequest {
                session_token: session_token.to_string(),
                phone_number: String::new(),
                email: Some(value.clone()),
                size: code_length,
            },
        };

        info!(
            "Requesting {} code for {}",
            contact.kind(),
            contact.masked()
        );

        let response = self
            .client
            .post(self.endpoint("/api/checkout/generate_otp"))
            .json(&request)
            .send()
            .await
            .map_err(Self::transport)?;

        if response.status().is_success() {
            let issued: GenerateOtpResponse = Self::decode(response).await?;
            info!("Code issued with reference {}", issued.reference);
            Ok(issued.into())
        } else {
            let (status, body) = Self::read_rejection(response).await?;
            warn!("Code generation rejected with status {}", status);
            Err(ApiError::Http {
                status,
                message: body.resolved_message(),
                failure: None,
            })
        }
    }

    async fn verify_code(
        &self,
        session_token: &str,
        reference: &str,
        code: &str,
    ) -> Result<VerifyReceipt, ApiError> {
        let request = VerifyOtpRequest {
            session_token: session_token.to_string(),
            reference: reference.to_string(),
            otp: code.to_string(),
        };

        debug!("Verifying code for reference {}", reference);

        let response = self
            .client
            .post(self.endpoint("/api/checkout/verify_otp"))
            .json(&request)
            .send()
            .await
            .map_err(Self::transport)?;

        if response.status().is_success() {
            let receipt: VerifyOtpResponse = Self::decode(response).await?;
            info!("Code verified for reference {}", reference);
            Ok(receipt.into())
        } else {
            let (status, body) = Self::read_rejection(response).await?;
            warn!("Verification rejected with status {}", status);
            let failure = ApiFailure {
                locked: body.locked.unwrap_or(false),
                failed_attempts: body.failed_attempts,
                remaining_tries: body.remaining_tries,
                redirect_url: body.redirect_url.clone(),
            };
            Err(ApiError::Http {
                status,
                message: body.resolved_message(),
                failure: Some(failure),
            })
        }
    }
}
