//! Configuration module
//!
//! Settings are read from the environment with sensible defaults, so the
//! checkout client works out of the box and can be repointed per deployment:
//! - `api` - Verification service endpoint and request timeout

pub mod api;

// Re-export commonly used types
pub use api::ApiConfig;
