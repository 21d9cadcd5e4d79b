//! Control-loop performance indices.
//!
//! Computed from the measured trajectory, never from a simulation:
//! integral absolute/squared error, total variation of the controller
//! output (valve-wear proxy), an aggressiveness index relating OP
//! movement to error movement, and step-response figures (overshoot,
//! settling time) for the largest setpoint step in the record.

pub mod error;
pub mod metrics;

pub use error::{KpiError, KpiResult};
pub use metrics::{compute_kpi, KpiReport, NominalRanges};
