//! Engine configuration.
//!
//! Every policy constant of the engine lives here rather than as a
//! literal at the point of use: grid-search shape, optimizer budget,
//! diagnostic thresholds and the safe-step fraction. A config is
//! validated once at the service boundary and then borrowed by every
//! stage of an analysis.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::numeric::Real;

/// Closed-loop time-constant multipliers on dead time, per tuning mode.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TauCMultipliers {
    pub conservative: Real,
    pub moderate: Real,
    pub aggressive: Real,
}

impl Default for TauCMultipliers {
    fn default() -> Self {
        Self {
            conservative: 10.0,
            moderate: 3.0,
            aggressive: 1.0,
        }
    }
}

/// Engine-wide configuration with validated defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Iteration cap for the local refinement stage of identification.
    pub max_iterations: usize,
    /// Number of dead-time candidates in the global scan.
    pub theta_grid_points: usize,
    /// Dead-time search horizon as a fraction of series duration.
    pub theta_search_fraction: Real,
    /// SIMC closed-loop speed multipliers.
    pub tau_c_multipliers: TauCMultipliers,
    /// PV standard deviation below which a signal counts as flat.
    pub noise_floor: Real,
    /// Accumulated OP travel that should have moved a healthy process.
    pub op_threshold: Real,
    /// Aggressiveness index above which (strictly) the loop is flagged.
    pub aggressiveness_alert_threshold: Real,
    /// Half-width of the "sustained oscillation" band around decay ratio 1.
    pub decay_tolerance: Real,
    /// Decay ratio below which the loop counts as over-damped.
    pub overdamped_ratio: Real,
    /// Maximum per-step relative change the safety governor allows.
    pub max_step_fraction: Real,
    /// Minimum number of samples identification will accept.
    pub min_samples: usize,
    /// RMS residual relative to PV span above which a converged fit is
    /// still reported as low confidence.
    pub residual_floor_fraction: Real,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_iterations: 60,
            theta_grid_points: 15,
            theta_search_fraction: 0.4,
            tau_c_multipliers: TauCMultipliers::default(),
            noise_floor: 0.1,
            op_threshold: 1.0,
            aggressiveness_alert_threshold: 5.0,
            decay_tolerance: 0.1,
            overdamped_ratio: 0.25,
            max_step_fraction: 0.2,
            min_samples: 10,
            residual_floor_fraction: 0.05,
        }
    }
}

impl EngineConfig {
    /// Check every field against its admissible range.
    pub fn validate(&self) -> CoreResult<()> {
        if self.max_iterations == 0 {
            return Err(CoreError::Config {
                what: "max_iterations must be at least 1",
            });
        }
        if self.theta_grid_points < 2 {
            return Err(CoreError::Config {
                what: "theta_grid_points must be at least 2",
            });
        }
        if !(self.theta_search_fraction > 0.0 && self.theta_search_fraction < 1.0) {
            return Err(CoreError::Config {
                what: "theta_search_fraction must be in (0, 1)",
            });
        }
        let m = &self.tau_c_multipliers;
        if m.conservative <= 0.0 || m.moderate <= 0.0 || m.aggressive <= 0.0 {
            return Err(CoreError::Config {
                what: "tau_c multipliers must be positive",
            });
        }
        if !(self.noise_floor > 0.0) {
            return Err(CoreError::Config {
                what: "noise_floor must be positive",
            });
        }
        if !(self.op_threshold > 0.0) {
            return Err(CoreError::Config {
                what: "op_threshold must be positive",
            });
        }
        if !(self.aggressiveness_alert_threshold > 0.0) {
            return Err(CoreError::Config {
                what: "aggressiveness_alert_threshold must be positive",
            });
        }
        if !(self.decay_tolerance > 0.0 && self.decay_tolerance < 0.5) {
            return Err(CoreError::Config {
                what: "decay_tolerance must be in (0, 0.5)",
            });
        }
        if !(self.overdamped_ratio > 0.0 && self.overdamped_ratio < 1.0 - self.decay_tolerance) {
            return Err(CoreError::Config {
                what: "overdamped_ratio must sit below the sustained band",
            });
        }
        if !(self.max_step_fraction > 0.0 && self.max_step_fraction <= 1.0) {
            return Err(CoreError::Config {
                what: "max_step_fraction must be in (0, 1]",
            });
        }
        if self.min_samples < 4 {
            return Err(CoreError::Config {
                what: "min_samples must be at least 4",
            });
        }
        if !(self.residual_floor_fraction > 0.0) {
            return Err(CoreError::Config {
                what: "residual_floor_fraction must be positive",
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        EngineConfig::default().validate().unwrap();
    }

    #[test]
    fn rejects_zero_iteration_budget() {
        let cfg = EngineConfig {
            max_iterations: 0,
            ..Default::default()
        };
        assert!(matches!(
            cfg.validate().unwrap_err(),
            CoreError::Config { .. }
        ));
    }

    #[test]
    fn rejects_out_of_range_search_fraction() {
        let cfg = EngineConfig {
            theta_search_fraction: 1.5,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rejects_negative_multiplier() {
        let cfg = EngineConfig {
            tau_c_multipliers: TauCMultipliers {
                conservative: -1.0,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn yaml_round_trip_with_partial_overrides() {
        // serde(default) lets a config file override only some fields
        let cfg: EngineConfig = serde_yaml::from_str("max_iterations: 20\n").unwrap();
        assert_eq!(cfg.max_iterations, 20);
        assert_eq!(cfg.theta_grid_points, 15);
    }
}
