//! Active OTP challenge issued for a checkout session.

use chrono::{DateTime, Duration, Utc};

use crate::domain::value_objects::CodeInput;

/// Number of digits in a one-time code unless the flow overrides it
pub const DEFAULT_CODE_LENGTH: usize = 6;

/// Verification attempts granted when a fresh code is issued
pub const INITIAL_REMAINING_TRIES: u32 = 3;

/// A one-time code challenge the payer is currently answering.
///
/// Created when the verification service issues a code and replaced
/// wholesale on resend. The attempt counters mirror what the server
/// reports; the client never decrements them on its own.
#[derive(Debug, Clone, PartialEq)]
pub struct OtpChallenge {
    /// Server-issued reference identifying this code
    pub reference: String,

    /// Deadline after which the code stops being accepted
    pub expires_at: DateTime<Utc>,

    /// Digits entered so far
    pub digits: CodeInput,

    /// Verification attempts left before lockout
    pub remaining_tries: u32,

    /// Failed attempts recorded against this session
    pub failed_attempts: u32,
}

impl OtpChallenge {
    /// Create a challenge for a freshly issued code.
    ///
    /// # Arguments
    /// * `reference` - server-issued code reference
    /// * `expires_at` - when the code expires
    /// * `code_length` - number of digit slots to collect
    /// * `initial_tries` - attempt budget granted with the code
    pub fn new(
        reference: String,
        expires_at: DateTime<Utc>,
        code_length: usize,
        initial_tries: u32,
    ) -> Self {
        Self {
            reference,
            expires_at,
            digits: CodeInput::new(code_length),
            remaining_tries: initial_tries,
            failed_attempts: 0,
        }
    }

    /// Apply the counters from a failed verification response.
    ///
    /// The server is authoritative for both counters; missing values are
    /// read as zero. Entered digits are discarded so the payer retypes
    /// the code from scratch.
    pub fn record_failure(&mut self, failed_attempts: u32, remaining_tries: u32) {
        self.failed_attempts = failed_attempts;
        self.remaining_tries = remaining_tries;
        self.digits.clear();
    }

    /// Zero the attempt budget after a server-side lockout.
    pub fn lock(&mut self) {
        self.remaining_tries = 0;
    }

    /// Check whether the attempt budget is spent.
    pub fn is_exhausted(&self) -> bool {
        self.remaining_tries == 0
    }

    /// Time left before the code expires, clamped to zero.
    ///
    /// # Arguments
    /// * `now` - current instant from the flow clock
    pub fn time_until_expiry(&self, now: DateTime<Utc>) -> Duration {
        let remaining = self.expires_at - now;
        if remaining < Duration::zero() {
            Duration::zero()
        } else {
            remaining
        }
    }
}
