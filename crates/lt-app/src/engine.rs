//! Full-analysis orchestration.

use serde::{Deserialize, Serialize};
use tracing::info;

use lt_core::{EngineConfig, FopdtModel, PidGains, Real, TimeSeries};
use lt_diag::{diagnose, DiagnosisReport};
use lt_ident::{identify, Confidence};
use lt_kpi::{compute_kpi, KpiError, KpiReport};
use lt_tune::{suggest, tune, TuningMode, TuningSuggestion};

use crate::error::AppResult;
use crate::sufficiency::{check_sufficiency, SufficiencyCheck};

/// Composite result of one engine run: the structured value the
/// reporting frontend consumes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoopAnalysis {
    pub model: FopdtModel,
    pub confidence: Confidence,
    /// RMS simulation residual of the fit, PV units.
    pub rms_residual: Real,
    /// SIMC target gains for the selected mode.
    pub gains: PidGains,
    /// Governed next step, present when current gains were supplied.
    pub suggestion: Option<TuningSuggestion>,
    /// None when the aggressiveness ratio was undefined for this record
    /// (constant setpoint with no nominal ranges supplied).
    pub kpi: Option<KpiReport>,
    pub diagnosis: DiagnosisReport,
    pub sufficiency: SufficiencyCheck,
}

/// Run identification, tuning, KPIs and diagnostics over one record.
///
/// KPI degenerate-range failures are demoted to an absent KPI block:
/// a constant-setpoint record is a legitimate thing to diagnose, just
/// not to score. Every other failure propagates.
pub fn analyze(
    series: &TimeSeries,
    mode: TuningMode,
    cfg: &EngineConfig,
    current: Option<PidGains>,
) -> AppResult<LoopAnalysis> {
    cfg.validate()?;

    let fit = identify(series, cfg)?;
    let gains = tune(&fit.model, mode, cfg)?;
    let suggestion = current.map(|cur| suggest(&cur, &gains, cfg.max_step_fraction));

    let kpi = match compute_kpi(series, cfg, None) {
        Ok(report) => Some(report),
        Err(KpiError::DegenerateRange { .. }) => None,
    };
    let diagnosis = diagnose(series, cfg);
    let sufficiency = check_sufficiency(series, &fit.model);

    info!(
        mode = mode.as_str(),
        gain = fit.model.gain,
        tau = fit.model.tau,
        theta = fit.model.theta,
        kc = gains.kc,
        ti = gains.ti,
        confidence = ?fit.confidence,
        health = ?diagnosis.health.status,
        "loop analysis complete"
    );

    Ok(LoopAnalysis {
        model: fit.model,
        confidence: fit.confidence,
        rms_residual: fit.rms_residual,
        gains,
        suggestion,
        kpi,
        diagnosis,
        sufficiency,
    })
}
