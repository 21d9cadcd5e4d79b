//! Error types for KPI computation.

use thiserror::Error;

pub type KpiResult<T> = Result<T, KpiError>;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum KpiError {
    /// Aggressiveness is a ratio of normalized movements; a zero span or
    /// zero error movement leaves it undefined.
    #[error("Degenerate range: {what}")]
    DegenerateRange { what: &'static str },
}
