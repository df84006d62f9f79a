//! Business services containing the checkout flow logic.

pub mod checkout;

// Re-export commonly used types
pub use checkout::{
    BootstrapOutcome, CheckoutApi, CheckoutFlow, CheckoutFlowConfig, Clock, ExpiryCountdown,
    ExpiryTick, FlowMode, FlowNotice, FlowNotifier, FlowSnapshot, FlowState, MockClock, Navigator,
    OtpIssued, ReceiverDetails, RequestOutcome, ResendCooldown, ResendOutcome, SubmitOutcome,
    SystemClock, VerifyReceipt,
};
