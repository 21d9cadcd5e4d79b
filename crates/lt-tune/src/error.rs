//! Error types for tuning operations.

use thiserror::Error;

pub type TuneResult<T> = Result<T, TuneError>;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum TuneError {
    #[error("Invalid model: process gain is zero, loop is uncontrollable")]
    ZeroGain,

    #[error("Invalid model: time constant must be positive, got {tau}")]
    NonPositiveTau { tau: f64 },
}
