//! Closed-form SIMC tuning rule.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use lt_core::{EngineConfig, FopdtModel, PidGains, Real};

use crate::error::{TuneError, TuneResult};

/// Gain magnitude below which a model counts as uncontrollable.
const GAIN_EPS: Real = 1e-6;

/// Robustness/speed trade-off selected by the caller.
///
/// Each mode is a multiplier on dead time for the closed-loop time
/// constant `tau_c`: slower closed loops tolerate more model error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TuningMode {
    Conservative,
    Moderate,
    Aggressive,
}

impl TuningMode {
    pub fn multiplier(&self, cfg: &EngineConfig) -> Real {
        match self {
            TuningMode::Conservative => cfg.tau_c_multipliers.conservative,
            TuningMode::Moderate => cfg.tau_c_multipliers.moderate,
            TuningMode::Aggressive => cfg.tau_c_multipliers.aggressive,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TuningMode::Conservative => "conservative",
            TuningMode::Moderate => "moderate",
            TuningMode::Aggressive => "aggressive",
        }
    }
}

impl FromStr for TuningMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "conservative" => Ok(TuningMode::Conservative),
            "moderate" => Ok(TuningMode::Moderate),
            "aggressive" => Ok(TuningMode::Aggressive),
            other => Err(format!("unknown tuning mode: {other}")),
        }
    }
}

/// Derive PI gains from an FOPDT model via the SIMC rule.
///
/// `tau_c = multiplier(mode) * theta`, with a `0.1 * tau` floor when the
/// model has no dead time (a zero closed-loop time constant would demand
/// infinite gain). Then:
///
/// - `kc = (1 / gain) * tau / (tau_c + theta)`
/// - `ti = min(tau, 4 * (tau_c + theta))`
/// - `td = 0` (PI form)
pub fn tune(model: &FopdtModel, mode: TuningMode, cfg: &EngineConfig) -> TuneResult<PidGains> {
    if model.gain.abs() < GAIN_EPS {
        return Err(TuneError::ZeroGain);
    }
    if model.tau <= 0.0 {
        return Err(TuneError::NonPositiveTau { tau: model.tau });
    }

    let theta = model.theta.max(0.0);
    let tau_c = if theta > 0.0 {
        mode.multiplier(cfg) * theta
    } else {
        0.1 * model.tau
    };

    let kc = (1.0 / model.gain) * model.tau / (tau_c + theta);
    let ti = model.tau.min(4.0 * (tau_c + theta));
    Ok(PidGains::pi(kc, ti))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simc_worked_example() {
        // K=2, tau=10, theta=2, moderate: tau_c = 3*2 = 6
        // kc = (1/2) * 10 / (6+2) = 0.625, ti = min(10, 32) = 10
        let model = FopdtModel::new(2.0, 10.0, 2.0, 0.0);
        let cfg = EngineConfig::default();
        let gains = tune(&model, TuningMode::Moderate, &cfg).unwrap();
        assert!((gains.kc - 0.625).abs() < 1e-12);
        assert!((gains.ti - 10.0).abs() < 1e-12);
        assert_eq!(gains.td, 0.0);
    }

    #[test]
    fn conservative_is_gentler_than_aggressive() {
        let model = FopdtModel::new(1.0, 8.0, 3.0, 0.0);
        let cfg = EngineConfig::default();
        let cons = tune(&model, TuningMode::Conservative, &cfg).unwrap();
        let aggr = tune(&model, TuningMode::Aggressive, &cfg).unwrap();
        assert!(cons.kc < aggr.kc);
    }

    #[test]
    fn zero_dead_time_uses_tau_floor() {
        let model = FopdtModel::new(1.0, 10.0, 0.0, 0.0);
        let cfg = EngineConfig::default();
        let gains = tune(&model, TuningMode::Moderate, &cfg).unwrap();
        // tau_c = 0.1 * tau = 1: kc = 10 / 1 = 10, ti = min(10, 4) = 4
        assert!((gains.kc - 10.0).abs() < 1e-12);
        assert!((gains.ti - 4.0).abs() < 1e-12);
    }

    #[test]
    fn zero_gain_is_rejected() {
        let model = FopdtModel::new(0.0, 10.0, 2.0, 0.0);
        let cfg = EngineConfig::default();
        assert_eq!(
            tune(&model, TuningMode::Moderate, &cfg).unwrap_err(),
            TuneError::ZeroGain
        );
    }

    #[test]
    fn non_positive_tau_is_rejected() {
        let model = FopdtModel::new(1.0, 0.0, 2.0, 0.0);
        let cfg = EngineConfig::default();
        assert!(matches!(
            tune(&model, TuningMode::Moderate, &cfg).unwrap_err(),
            TuneError::NonPositiveTau { .. }
        ));
    }

    #[test]
    fn negative_gain_process_gets_negative_controller_gain() {
        let model = FopdtModel::new(-2.0, 10.0, 2.0, 0.0);
        let cfg = EngineConfig::default();
        let gains = tune(&model, TuningMode::Moderate, &cfg).unwrap();
        assert!(gains.kc < 0.0);
    }

    #[test]
    fn mode_parses_case_insensitively() {
        assert_eq!(
            "Moderate".parse::<TuningMode>().unwrap(),
            TuningMode::Moderate
        );
        assert!("sporty".parse::<TuningMode>().is_err());
    }
}
