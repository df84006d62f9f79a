//! # GateKeep Client
//!
//! HTTP client for the GateKeep verification service. This crate provides
//! the concrete implementation of the checkout API boundary defined in
//! `gk_core`, talking to the hosted checkout endpoints:
//!
//! - `GET /api/checkout/{session_token}` - resolve a checkout session
//! - `POST /api/checkout/generate_otp` - issue a one-time code
//! - `POST /api/checkout/verify_otp` - verify a submitted code
//!
//! Server rejections are decoded into structured errors carrying the
//! user-facing message and, for verification, the server's attempt
//! counters and lockout flag.

/// Verification service API - wire types and the HTTP implementation
pub mod api;

pub use api::HttpCheckoutApi;

/// Client-specific error types
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
