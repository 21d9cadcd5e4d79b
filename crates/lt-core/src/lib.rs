//! lt-core: stable foundation for looptune.
//!
//! Contains:
//! - numeric (Real + tolerances + float helpers)
//! - model (FOPDT process model + PID gain value types)
//! - series (validated loop time-series value type)
//! - config (engine configuration + validation)
//! - error (shared error types)

pub mod config;
pub mod error;
pub mod model;
pub mod numeric;
pub mod series;

// Re-exports: nice ergonomics for downstream crates
pub use config::{EngineConfig, TauCMultipliers};
pub use error::{CoreError, CoreResult};
pub use model::{FopdtModel, PidGains};
pub use numeric::*;
pub use series::TimeSeries;
