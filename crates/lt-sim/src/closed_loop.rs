//! Closed-loop PI(D) trajectory preview.
//!
//! Runs a discrete PID in deviation variables around the FOPDT
//! recurrence from [`crate::fopdt`]. Used to preview how a proposed
//! tuning would behave on the identified model before anyone touches
//! the real loop.

use serde::{Deserialize, Serialize};

use lt_core::{FopdtModel, PidGains, Real};

use crate::error::{SimError, SimResult};

/// One simulated closed-loop trajectory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClosedLoopTrace {
    pub t: Vec<Real>,
    pub sp: Vec<Real>,
    pub pv: Vec<Real>,
    pub op: Vec<Real>,
}

/// Simulate a PID loop around `model` tracking `setpoints` at fixed `dt`.
///
/// Controller output is in deviation form (starts at 0) and clamped to
/// `op_limits`; the integral is back-calculated on saturation so it does
/// not wind up. Derivative is a plain backward difference on the error,
/// active only when `gains.td > 0`.
pub fn simulate_closed_loop(
    model: &FopdtModel,
    gains: &PidGains,
    setpoints: &[Real],
    dt: Real,
    op_limits: (Real, Real),
) -> SimResult<ClosedLoopTrace> {
    if dt <= 0.0 {
        return Err(SimError::InvalidArg {
            what: "dt must be positive",
        });
    }
    if setpoints.len() < 2 {
        return Err(SimError::InvalidArg {
            what: "at least 2 setpoint samples required",
        });
    }
    let (op_min, op_max) = op_limits;
    if op_min >= op_max {
        return Err(SimError::InvalidArg {
            what: "op_limits min must be below max",
        });
    }

    let n = setpoints.len();
    let mut t = vec![0.0; n];
    let mut pv = vec![0.0; n];
    let mut op = vec![0.0; n];

    let delay_steps = (model.theta.max(0.0) / dt).floor() as usize;
    let safe_tau = model.tau.max(dt);

    let mut integral = 0.0;
    let mut prev_error = 0.0;

    for k in 0..n {
        t[k] = k as Real * dt;

        // Process update from the previous (delayed) OP
        if k > 0 {
            let op_delayed = match (k - 1).checked_sub(delay_steps) {
                Some(i) => op[i],
                None => 0.0,
            };
            let drive = model.gain * op_delayed - (pv[k - 1] - model.bias);
            pv[k] = pv[k - 1] + (drive / safe_tau) * dt;
        } else {
            pv[k] = model.bias;
        }

        let error = setpoints[k] - pv[k];

        let p = gains.kc * error;
        if gains.ti > 0.0 {
            integral += (gains.kc * dt / gains.ti) * error;
        }
        let d = if gains.td > 0.0 && k > 0 {
            (gains.kc * gains.td / dt) * (error - prev_error)
        } else {
            0.0
        };

        let raw = p + integral + d;
        let clamped = raw.clamp(op_min, op_max);
        // Back-calculate the integral so it agrees with the clamped OP
        if gains.ti > 0.0 && clamped != raw {
            integral = clamped - p - d;
        }
        op[k] = clamped;
        prev_error = error;
    }

    Ok(ClosedLoopTrace {
        t,
        sp: setpoints.to_vec(),
        pv,
        op,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step_sp(n: usize, level: Real) -> Vec<Real> {
        vec![level; n]
    }

    #[test]
    fn rejects_bad_arguments() {
        let m = FopdtModel::new(1.0, 5.0, 0.0, 0.0);
        let g = PidGains::pi(1.0, 10.0);
        assert!(simulate_closed_loop(&m, &g, &[1.0, 1.0], 0.0, (0.0, 100.0)).is_err());
        assert!(simulate_closed_loop(&m, &g, &[1.0], 1.0, (0.0, 100.0)).is_err());
        assert!(simulate_closed_loop(&m, &g, &[1.0, 1.0], 1.0, (100.0, 0.0)).is_err());
    }

    #[test]
    fn pi_loop_tracks_setpoint() {
        let m = FopdtModel::new(2.0, 10.0, 2.0, 0.0);
        // SIMC moderate gains for this model
        let g = PidGains::pi(0.625, 10.0);
        let trace =
            simulate_closed_loop(&m, &g, &step_sp(2000, 5.0), 0.1, (-100.0, 100.0)).unwrap();
        let last = trace.pv[trace.pv.len() - 1];
        assert!((last - 5.0).abs() < 0.05, "PV settled at {last}");
    }

    #[test]
    fn output_respects_limits() {
        let m = FopdtModel::new(0.1, 50.0, 5.0, 0.0);
        let g = PidGains::pi(50.0, 1.0); // absurdly hot tuning
        let trace = simulate_closed_loop(&m, &g, &step_sp(500, 10.0), 0.5, (0.0, 100.0)).unwrap();
        assert!(trace.op.iter().all(|v| (0.0..=100.0).contains(v)));
    }

    #[test]
    fn trace_columns_have_equal_length() {
        let m = FopdtModel::new(1.0, 5.0, 1.0, 20.0);
        let g = PidGains::pi(1.0, 5.0);
        let trace = simulate_closed_loop(&m, &g, &step_sp(50, 25.0), 1.0, (0.0, 100.0)).unwrap();
        assert_eq!(trace.t.len(), 50);
        assert_eq!(trace.sp.len(), 50);
        assert_eq!(trace.pv.len(), 50);
        assert_eq!(trace.op.len(), 50);
    }
}
