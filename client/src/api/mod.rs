//! Verification service API client
//!
//! The wire types mirror the checkout endpoints' JSON shapes; the HTTP
//! client maps them onto the domain types consumed by the flow
//! controller.

pub mod dto;

mod http;

pub use http::HttpCheckoutApi;
