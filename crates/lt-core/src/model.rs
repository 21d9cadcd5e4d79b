//! Shared process-model and controller-parameter value types.
//!
//! These are pure data: `lt-ident` creates [`FopdtModel`], `lt-sim`
//! integrates it, `lt-tune` maps it to [`PidGains`]. Keeping them here
//! avoids dependency cycles between those crates.

use serde::{Deserialize, Serialize};

use crate::numeric::Real;

/// First-order-plus-dead-time process model.
///
/// `tau * dy/dt = gain * (u - u0) - (y - bias)`, with the input delayed
/// by `theta` seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FopdtModel {
    /// Process gain (PV units per OP unit).
    pub gain: Real,
    /// Time constant in seconds, positive.
    pub tau: Real,
    /// Dead time in seconds, non-negative.
    pub theta: Real,
    /// Output bias: PV level at zero input deviation.
    pub bias: Real,
}

impl FopdtModel {
    pub fn new(gain: Real, tau: Real, theta: Real, bias: Real) -> Self {
        Self {
            gain,
            tau,
            theta,
            bias,
        }
    }

    /// Rough time-to-steady-state, 4*tau + theta. Used by the data
    /// sufficiency check.
    pub fn settling_horizon(&self) -> Real {
        4.0 * self.tau + self.theta
    }
}

/// PID controller parameters in gain / integral-time / derivative-time
/// form. `td == 0.0` for the PI rule used by the SIMC tuner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PidGains {
    /// Controller gain.
    pub kc: Real,
    /// Integral time in seconds.
    pub ti: Real,
    /// Derivative time in seconds.
    pub td: Real,
}

impl PidGains {
    pub fn pi(kc: Real, ti: Real) -> Self {
        Self { kc, ti, td: 0.0 }
    }

    /// Proportional band, PB = 100 / kc. Some DCS vendors expose gain
    /// in this form. Near-zero gain maps to the conventional 9999.9.
    pub fn proportional_band(&self) -> Real {
        if self.kc.abs() > 1e-9 {
            100.0 / self.kc
        } else {
            9999.9
        }
    }

    /// Build gains from a proportional band figure.
    pub fn from_proportional_band(pb: Real, ti: Real, td: Real) -> Self {
        let kc = if pb.abs() > 1e-9 { 100.0 / pb } else { 0.0 };
        Self { kc, ti, td }
    }
}
