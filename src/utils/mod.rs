//! Utility modules

pub mod lenient;
pub mod memory_backend;
pub mod validation;
pub mod wire;

pub use memory_backend::*;
pub use validation::*;
