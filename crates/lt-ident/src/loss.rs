//! Simulation-error loss for FOPDT fitting.

use lt_core::{FopdtModel, Real};
use lt_sim::predict;
use nalgebra::DVector;

/// Residual clip bound: keeps the squared loss finite for wild guesses
/// (1e10^2 = 1e20, far below f64 overflow).
const RESIDUAL_CLIP: Real = 1e10;

/// Loss at or above this counts as infeasible in the grid scan.
pub const LOSS_INFEASIBLE: Real = 1e30;

/// Residual vector `pv_measured - pv_predicted`, clipped element-wise.
pub fn residuals(model: &FopdtModel, op: &[Real], pv: &[Real], dt: Real) -> DVector<Real> {
    let pred = predict(model, op, dt);
    DVector::from_iterator(
        pv.len(),
        pv.iter().zip(&pred).map(|(m, p)| {
            let r = m - p;
            if r.is_finite() {
                r.clamp(-RESIDUAL_CLIP, RESIDUAL_CLIP)
            } else {
                RESIDUAL_CLIP
            }
        }),
    )
}
