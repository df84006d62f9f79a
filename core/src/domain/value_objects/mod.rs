//! Value objects representing immutable domain concepts.

pub mod code_input;

// Re-export commonly used types
pub use code_input::CodeInput;
