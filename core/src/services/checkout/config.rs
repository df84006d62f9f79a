//! Configuration for the checkout flow controller

use crate::domain::entities::challenge::{DEFAULT_CODE_LENGTH, INITIAL_REMAINING_TRIES};

/// Configuration for the checkout flow controller
#[derive(Debug, Clone)]
pub struct CheckoutFlowConfig {
    /// Number of digits requested per one-time code
    pub code_length: usize,
    /// Verification attempts granted with a fresh code
    pub initial_remaining_tries: u32,
    /// Minimum seconds between code resend requests
    pub resend_cooldown_seconds: u64,
    /// Delay before navigating to the redirect URL after success
    pub success_redirect_delay_ms: u64,
    /// Delay before navigating to the redirect URL after a lockout
    pub lockout_redirect_delay_ms: u64,
}

impl Default for CheckoutFlowConfig {
    fn default() -> Self {
        Self {
            code_length: DEFAULT_CODE_LENGTH,
            initial_remaining_tries: INITIAL_REMAINING_TRIES,
            resend_cooldown_seconds: 60,
            success_redirect_delay_ms: 1500,
            lockout_redirect_delay_ms: 3000,
        }
    }
}

impl CheckoutFlowConfig {
    /// Override the number of digits per code.
    pub fn with_code_length(mut self, code_length: usize) -> Self {
        self.code_length = code_length;
        self
    }

    /// Override the resend cooldown.
    pub fn with_resend_cooldown(mut self, seconds: u64) -> Self {
        self.resend_cooldown_seconds = seconds;
        self
    }
}
