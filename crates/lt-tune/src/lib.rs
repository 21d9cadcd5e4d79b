//! SIMC-based PID tuning and the bounded-step safety governor.
//!
//! [`tune`] maps an identified FOPDT model plus a robustness mode to PI
//! gains via closed-form SIMC algebra. [`governor::bounded_step`] wraps
//! any proposed parameter change in a damped, bounded update so that
//! iterative re-tuning walks toward the target without overshooting it.

pub mod error;
pub mod governor;
pub mod simc;

pub use error::{TuneError, TuneResult};
pub use governor::{bounded_step, suggest, GainField, TuningSuggestion};
pub use simc::{tune, TuningMode};
