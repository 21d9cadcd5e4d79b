//! FOPDT process identification from recorded loop data.
//!
//! The loss surface is non-convex and multi-modal in dead time: theta
//! enters the simulation as a lag index, so the sum-of-squares loss has
//! plateaus and step-like jumps along that axis. A single descent from
//! one seed routinely lands in the wrong valley. Identification is
//! therefore a two-stage composition:
//!
//! 1. a coarse grid scan over dead-time candidates, fitting the smooth
//!    parameters (gain, tau, bias) for each candidate, and
//! 2. a joint damped Gauss-Newton refinement of all four parameters
//!    from the best grid seed, with bound projection and backtracking
//!    line search.
//!
//! Budget exhaustion is a partial success, not a failure: the best
//! point found is returned tagged [`Confidence::Low`].

pub mod error;
pub mod identify;
pub mod loss;
pub mod optimize;

pub use error::{IdentError, IdentResult};
pub use identify::{identify, Confidence, IdentifiedModel};
pub use optimize::{gauss_newton, GaussNewtonConfig, GaussNewtonResult};
