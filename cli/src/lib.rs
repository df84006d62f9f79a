// Library exports for testing and external use

pub mod prompt;
pub mod terminal;
