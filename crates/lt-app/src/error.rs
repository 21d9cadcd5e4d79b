//! Error types for the lt-app service layer.

use thiserror::Error;

/// Unified error surface for frontends, wrapping the backend crates.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Core error: {0}")]
    Core(#[from] lt_core::CoreError),

    #[error("Identification error: {0}")]
    Ident(#[from] lt_ident::IdentError),

    #[error("Tuning error: {0}")]
    Tune(#[from] lt_tune::TuneError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type AppResult<T> = Result<T, AppError>;
