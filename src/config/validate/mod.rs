//! Configuration validation
//!
//! Validates run specifications for correctness before execution.

mod error;
mod validator;

#[cfg(test)]
mod proptests;

pub use error::ValidationError;
pub use validator::validate_config;
