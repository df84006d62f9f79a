//! # GateKeep Core
//!
//! Core checkout flow logic for the GateKeep client.
//! This crate contains domain entities, the checkout flow controller,
//! the API boundary traits, and error types that form the foundation
//! of the hosted OTP verification flow.

pub mod domain;
pub mod errors;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::*;
pub use errors::*;
pub use services::*;
