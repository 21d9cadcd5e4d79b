//! Open-loop FOPDT response prediction.

use lt_core::{FopdtModel, Real};

/// Largest per-step PV change the recurrence will apply. Wild optimizer
/// guesses (huge gain, tiny tau) otherwise overflow to infinity mid-fit.
const MAX_STEP: Real = 1e5;

/// Simulate the FOPDT response to an input trajectory sampled at `dt`.
///
/// Forward Euler on `tau * dy/dt = gain * (u - u0) - (y - bias)` with the
/// input delayed by `floor(theta / dt)` samples:
///
/// `y[k] = y[k-1] + (dt / max(tau, dt)) * (gain*(u[k-1-d] - u0) - (y[k-1] - bias))`
///
/// Indices before the start of the record use the first input sample
/// (zero-order hold of the initial condition). The `max(tau, dt)` floor
/// keeps the discrete update stable when the optimizer proposes
/// `tau < dt`: it caps the effective update rate at one sample per step.
///
/// Pure and deterministic; always returns `input.len()` samples.
pub fn predict(model: &FopdtModel, input: &[Real], dt: Real) -> Vec<Real> {
    let n = input.len();
    let mut pv = vec![model.bias; n];
    if n < 2 || dt <= 0.0 {
        return pv;
    }

    let delay_steps = (model.theta.max(0.0) / dt).floor() as usize;
    let u0 = input[0];
    let safe_tau = model.tau.max(dt);

    for k in 1..n {
        let u = match (k - 1).checked_sub(delay_steps) {
            Some(i) => input[i],
            None => u0,
        };
        let mut drive = model.gain * (u - u0) - (pv[k - 1] - model.bias);
        if !drive.is_finite() {
            drive = 0.0;
        }
        let change = ((drive / safe_tau) * dt).clamp(-MAX_STEP, MAX_STEP);
        let next = pv[k - 1] + change;
        pv[k] = if next.is_finite() { next } else { pv[k - 1] };
    }
    pv
}
