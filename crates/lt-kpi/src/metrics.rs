//! KPI computation over one measured trajectory.

use serde::{Deserialize, Serialize};

use lt_core::{EngineConfig, Real, TimeSeries};

use crate::error::{KpiError, KpiResult};

/// Caller-supplied nominal spans, overriding the observed max-min spans
/// in the aggressiveness normalization. Useful when the record covers
/// only a sliver of the instrument range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NominalRanges {
    pub op_span: Real,
    pub sp_span: Real,
}

/// Performance indices for one trajectory. All integrals use the
/// left-sample convention: the error at sample k is weighted by the
/// interval `t[k+1] - t[k]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiReport {
    /// Integral of absolute error, PV units * seconds.
    pub iae: Real,
    /// Integral of squared error.
    pub ise: Real,
    /// Total variation of OP: accumulated valve travel.
    pub tv: Real,
    /// Normalized OP movement per normalized error movement.
    pub aggressiveness: Real,
    /// True when aggressiveness strictly exceeds the alert threshold:
    /// the loop risks amplifying high-frequency noise.
    pub aggressive_flag: bool,
    /// Overshoot after the largest setpoint step, percent of step size.
    /// None when the setpoint never steps.
    pub overshoot_pct: Option<Real>,
    /// Time to enter and stay inside the 5% band after the largest
    /// setpoint step.
    pub settling_time: Option<Real>,
    /// Mean sample interval.
    pub avg_dt: Real,
    /// Largest sample interval.
    pub max_dt: Real,
}

/// Compute every index over the full series.
///
/// Fails with [`KpiError::DegenerateRange`] when the setpoint span or
/// the error movement is zero; the aggressiveness ratio is undefined
/// there and silently reporting 0 would hide a dead sensor.
pub fn compute_kpi(
    series: &TimeSeries,
    cfg: &EngineConfig,
    ranges: Option<&NominalRanges>,
) -> KpiResult<KpiReport> {
    let t = series.t();
    let sp = series.setpoint();
    let pv = series.process_value();
    let op = series.controller_output();
    let error = series.error();
    let n = series.len();

    let mut iae = 0.0;
    let mut ise = 0.0;
    for k in 0..n - 1 {
        let dt_k = t[k + 1] - t[k];
        iae += error[k].abs() * dt_k;
        ise += error[k] * error[k] * dt_k;
    }

    let tv: Real = op.windows(2).map(|w| (w[1] - w[0]).abs()).sum();
    let error_tv: Real = error.windows(2).map(|w| (w[1] - w[0]).abs()).sum();

    let (op_span, sp_span) = match ranges {
        Some(r) => (r.op_span, r.sp_span),
        None => (observed_span(op), observed_span(sp)),
    };
    if sp_span <= 0.0 {
        return Err(KpiError::DegenerateRange {
            what: "setpoint span is zero",
        });
    }
    if error_tv <= 0.0 {
        return Err(KpiError::DegenerateRange {
            what: "error never moved",
        });
    }

    // A controller that never moved is quiescent, not degenerate
    let aggressiveness = if op_span > 0.0 {
        (tv / op_span) / (error_tv / sp_span)
    } else {
        0.0
    };
    // Exclusive boundary: exactly at the threshold does not alarm
    let aggressive_flag = aggressiveness > cfg.aggressiveness_alert_threshold;

    let (overshoot_pct, settling_time) = step_response(t, sp, pv);

    Ok(KpiReport {
        iae,
        ise,
        tv,
        aggressiveness,
        aggressive_flag,
        overshoot_pct,
        settling_time,
        avg_dt: series.mean_dt(),
        max_dt: series.max_dt(),
    })
}

fn observed_span(values: &[Real]) -> Real {
    let min = values.iter().copied().fold(Real::INFINITY, Real::min);
    let max = values.iter().copied().fold(Real::NEG_INFINITY, Real::max);
    max - min
}

/// Overshoot and 5%-band settling time after the largest setpoint step.
fn step_response(t: &[Real], sp: &[Real], pv: &[Real]) -> (Option<Real>, Option<Real>) {
    let n = t.len();
    let mut step_idx = 0;
    let mut step_size: Real = 0.0;
    for k in 1..n {
        let d = sp[k] - sp[k - 1];
        if d.abs() > step_size.abs() {
            step_size = d;
            step_idx = k;
        }
    }
    if step_size.abs() < 1e-9 || n - step_idx < 5 {
        return (None, None);
    }

    let target = sp[step_idx];
    let post_pv = &pv[step_idx..];
    let overshoot = if step_size > 0.0 {
        let max_pv = post_pv.iter().copied().fold(Real::NEG_INFINITY, Real::max);
        (max_pv - target).max(0.0)
    } else {
        let min_pv = post_pv.iter().copied().fold(Real::INFINITY, Real::min);
        (target - min_pv).max(0.0)
    };
    let overshoot_pct = overshoot / step_size.abs() * 100.0;

    let band = 0.05 * step_size.abs();
    let mut settling = 0.0;
    for k in step_idx..n {
        if (pv[k] - target).abs() > band {
            settling = t[k] - t[step_idx];
        }
    }
    (Some(overshoot_pct), Some(settling))
}
