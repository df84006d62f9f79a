//! Tests for the checkout flow service
//!
//! Covers the flow controller state machine, countdown timers, and the
//! notices surfaced to the payer, using mock collaborators and paused
//! tokio time.
