//! Checkout flow service for hosted OTP verification
//!
//! This module provides the complete client-side checkout workflow including:
//! - Session resolution and flow bootstrap (standard and direct modes)
//! - Contact collection with Ghana phone and email validation
//! - Code generation, resend with cooldown, and verification
//! - Expiry countdown and scheduled redirect handling
//! - Server-authoritative attempt tracking and lockout

mod config;
mod controller;
mod countdown;
mod traits;
mod types;

pub mod clock;

#[cfg(test)]
mod tests;

pub use clock::{Clock, MockClock, SystemClock};
pub use config::CheckoutFlowConfig;
pub use controller::CheckoutFlow;
pub use countdown::{ExpiryCountdown, ExpiryTick, ResendCooldown};
pub use traits::{CheckoutApi, FlowNotifier, Navigator};
pub use types::{
    BootstrapOutcome, FlowMode, FlowNotice, FlowSnapshot, FlowState, OtpIssued, ReceiverDetails,
    RequestOutcome, ResendOutcome, SubmitOutcome, VerifyReceipt,
};
