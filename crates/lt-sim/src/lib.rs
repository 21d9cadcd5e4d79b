//! Deterministic FOPDT process simulation.
//!
//! Two entry points:
//! - [`predict`]: open-loop response of an [`lt_core::FopdtModel`] to a
//!   recorded input trajectory. This is the inner loop of identification
//!   and must stay cheap and total: bad parameter guesses produced by the
//!   optimizer are answered with a guarded, bounded trajectory instead of
//!   NaNs.
//! - [`simulate_closed_loop`]: discrete PI(D) loop around the same
//!   process recurrence, used to preview a proposed tuning before it is
//!   applied to a real loop.

pub mod closed_loop;
pub mod error;
pub mod fopdt;

pub use closed_loop::{simulate_closed_loop, ClosedLoopTrace};
pub use error::{SimError, SimResult};
pub use fopdt::predict;
