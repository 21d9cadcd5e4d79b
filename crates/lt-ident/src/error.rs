//! Error types for identification.

use thiserror::Error;

pub type IdentResult<T> = Result<T, IdentError>;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum IdentError {
    #[error("Insufficient data: need at least {needed} samples, got {got}")]
    InsufficientData { needed: usize, got: usize },

    #[error("Optimization failed: no finite loss anywhere in the search")]
    NonFiniteLoss,

    #[error("Optimization failed: {what}")]
    Numeric { what: &'static str },
}
