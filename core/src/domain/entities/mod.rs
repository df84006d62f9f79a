//! Domain entities representing core checkout objects.

pub mod challenge;
pub mod contact;
pub mod session;

// Re-export commonly used types
pub use challenge::{OtpChallenge, DEFAULT_CODE_LENGTH, INITIAL_REMAINING_TRIES};
pub use contact::ContactMethod;
pub use session::{CheckoutSession, SessionStatus};
