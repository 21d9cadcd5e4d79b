//! Control-loop pathology diagnostics.
//!
//! Operates on the measured trajectory only, independent of the
//! identifier and tuner. Absence of a pathology is a valid outcome:
//! these functions return `Option`/`bool` findings, never errors.

pub mod health;
pub mod oscillation;
pub mod stiction;

pub use health::{screen_health, HealthIssue, HealthReport, HealthStatus};
pub use oscillation::{diagnose_oscillation, OscillationClass, OscillationReport};
pub use stiction::diagnose_stiction;

use serde::{Deserialize, Serialize};

use lt_core::{EngineConfig, TimeSeries};

/// Combined diagnostic findings for one trajectory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosisReport {
    pub oscillation: Option<OscillationReport>,
    pub stiction_risk: bool,
    pub health: HealthReport,
}

/// Run every diagnostic over a series and fold oscillation severity
/// into the health verdict.
pub fn diagnose(series: &TimeSeries, cfg: &EngineConfig) -> DiagnosisReport {
    let error = series.error();
    let oscillation = diagnose_oscillation(&error, series.mean_dt(), cfg);
    let stiction_risk = diagnose_stiction(
        series.controller_output(),
        series.process_value(),
        cfg.noise_floor,
        cfg.op_threshold,
    );
    let mut health = screen_health(series, cfg);

    if let Some(report) = &oscillation {
        match report.classification {
            OscillationClass::Divergent => {
                health.issues.push(HealthIssue::DivergentOscillation);
                health.status = health.status.max(HealthStatus::Critical);
            }
            OscillationClass::Sustained => {
                health.issues.push(HealthIssue::SustainedOscillation);
                health.status = health.status.max(HealthStatus::Warning);
            }
            OscillationClass::Convergent | OscillationClass::OverDamped => {}
        }
    }
    if stiction_risk {
        health.issues.push(HealthIssue::StictionRisk);
        health.status = health.status.max(HealthStatus::Warning);
    }

    DiagnosisReport {
        oscillation,
        stiction_risk,
        health,
    }
}
