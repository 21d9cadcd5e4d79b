//! Shared application service layer for looptune.
//!
//! One entry point, [`analyze`], runs the whole engine over a recorded
//! trajectory: identification, SIMC tuning (governed when current gains
//! are supplied), performance indices, diagnostics and the data
//! sufficiency check, composed into a single [`LoopAnalysis`] value for
//! whatever frontend is asking.

pub mod engine;
pub mod error;
pub mod sufficiency;

pub use engine::{analyze, LoopAnalysis};
pub use error::{AppError, AppResult};
pub use sufficiency::{check_sufficiency, SufficiencyCheck};
