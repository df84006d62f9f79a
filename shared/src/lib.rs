//! Shared utilities for the GateKeep checkout client
//!
//! This crate provides common functionality used across the workspace:
//! - Verification service endpoint configuration
//! - Contact validation (Ghana phone numbers, email addresses)
//! - Masking helpers for logs and display

pub mod config;
pub mod utils;

// Re-export commonly used items at crate root
pub use config::ApiConfig;
pub use utils::{email, phone};
