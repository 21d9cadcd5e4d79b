//! Damped Gauss-Newton least-squares refinement.
//!
//! Small bound-constrained solver for the identification problem:
//! forward-difference Jacobian, Levenberg-style diagonal damping on the
//! normal equations, backtracking line search, and projection of each
//! trial point onto box bounds. The dead-time axis of the loss is a
//! staircase, so callers pass a per-parameter finite-difference floor
//! large enough to step across one stair.

use nalgebra::{DMatrix, DVector};

use crate::error::{IdentError, IdentResult};

/// Solver knobs. Defaults are sized for 3-4 parameter FOPDT fits.
#[derive(Debug, Clone)]
pub struct GaussNewtonConfig {
    /// Iteration cap.
    pub max_iterations: usize,
    /// Stop when the relative loss improvement drops below this.
    pub loss_tol: f64,
    /// Line search backtracking factor.
    pub line_search_beta: f64,
    /// Maximum line search iterations.
    pub max_line_search_iters: usize,
    /// Relative finite-difference step.
    pub fd_epsilon: f64,
}

impl Default for GaussNewtonConfig {
    fn default() -> Self {
        Self {
            max_iterations: 40,
            loss_tol: 1e-10,
            line_search_beta: 0.5,
            max_line_search_iters: 12,
            fd_epsilon: 1e-6,
        }
    }
}

/// Refinement outcome. `converged == false` means the iteration cap was
/// hit; `x` is still the best point found.
#[derive(Debug, Clone)]
pub struct GaussNewtonResult {
    pub x: DVector<f64>,
    pub loss: f64,
    pub iterations: usize,
    pub converged: bool,
}

/// Forward-difference Jacobian of the residual vector.
///
/// Column step is `max(fd_epsilon * |x_j|, fd_floor_j)`: `fd_floor` is an
/// absolute minimum step per parameter, so a caller can force the probe
/// to cross one full stair of a staircase axis (one sample interval
/// along the dead-time axis).
fn finite_difference_jacobian<F>(
    x: &DVector<f64>,
    r0: &DVector<f64>,
    residual_fn: &F,
    epsilon: f64,
    fd_floor: &DVector<f64>,
) -> DMatrix<f64>
where
    F: Fn(&DVector<f64>) -> DVector<f64>,
{
    let n = x.len();
    let m = r0.len();
    let mut jac = DMatrix::zeros(m, n);

    for j in 0..n {
        let dx = (epsilon * x[j].abs()).max(fd_floor[j]);
        let mut x_pert = x.clone();
        x_pert[j] += dx;
        let r_pert = residual_fn(&x_pert);
        let col = (r_pert - r0) / dx;
        for i in 0..m {
            jac[(i, j)] = col[i];
        }
    }
    jac
}

fn project(x: &mut DVector<f64>, lower: &DVector<f64>, upper: &DVector<f64>) {
    for j in 0..x.len() {
        x[j] = x[j].clamp(lower[j], upper[j]);
    }
}

/// Minimize `|residual_fn(x)|^2` subject to `lower <= x <= upper`.
pub fn gauss_newton<F>(
    x0: DVector<f64>,
    residual_fn: F,
    lower: &DVector<f64>,
    upper: &DVector<f64>,
    fd_floor: &DVector<f64>,
    config: &GaussNewtonConfig,
) -> IdentResult<GaussNewtonResult>
where
    F: Fn(&DVector<f64>) -> DVector<f64>,
{
    let n = x0.len();
    if lower.len() != n || upper.len() != n || fd_floor.len() != n {
        return Err(IdentError::Numeric {
            what: "bound vectors must match parameter count",
        });
    }

    let mut x = x0;
    project(&mut x, lower, upper);
    let mut r = residual_fn(&x);
    let mut loss = r.norm_squared();

    for iter in 0..config.max_iterations {
        let jac = finite_difference_jacobian(&x, &r, &residual_fn, config.fd_epsilon, fd_floor);

        // Normal equations with escalating diagonal damping. Plateaus in
        // the loss produce zero Jacobian columns, so undamped J'J is
        // routinely singular here.
        let jtj = jac.transpose() * &jac;
        let jtr = jac.transpose() * &r;
        let scale = (jtj.trace() / n as f64).max(1e-12);

        let mut dx = None;
        let mut lambda = 1e-8 * scale;
        for _ in 0..6 {
            let mut damped = jtj.clone();
            for j in 0..n {
                damped[(j, j)] += lambda;
            }
            if let Some(chol) = damped.cholesky() {
                dx = Some(chol.solve(&(-&jtr)));
                break;
            }
            lambda *= 100.0;
        }
        let dx = match dx {
            Some(dx) => dx,
            // Nothing solvable: report the best point so far
            None => {
                return Ok(GaussNewtonResult {
                    x,
                    loss,
                    iterations: iter,
                    converged: false,
                });
            }
        };

        // Backtracking line search with bound projection
        let mut alpha = 1.0;
        let mut improved = false;
        let mut x_new = x.clone();
        let mut r_new = r.clone();
        let mut loss_new = loss;
        for _ in 0..config.max_line_search_iters {
            let mut trial = &x + alpha * &dx;
            project(&mut trial, lower, upper);
            let r_trial = residual_fn(&trial);
            let loss_trial = r_trial.norm_squared();
            if loss_trial.is_finite() && loss_trial < loss {
                x_new = trial;
                r_new = r_trial;
                loss_new = loss_trial;
                improved = true;
                break;
            }
            alpha *= config.line_search_beta;
        }

        if !improved {
            // No descent direction left: converged to a (possibly flat)
            // local minimum
            return Ok(GaussNewtonResult {
                x,
                loss,
                iterations: iter,
                converged: true,
            });
        }

        let rel_improvement = (loss - loss_new) / loss.max(1e-300);
        x = x_new;
        r = r_new;
        loss = loss_new;

        if rel_improvement < config.loss_tol {
            return Ok(GaussNewtonResult {
                x,
                loss,
                iterations: iter + 1,
                converged: true,
            });
        }
    }

    Ok(GaussNewtonResult {
        x,
        loss,
        iterations: config.max_iterations,
        converged: false,
    })
}
