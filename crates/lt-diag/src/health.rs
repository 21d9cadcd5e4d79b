//! Loop health screen: saturation, noise, steady-state offset.
//!
//! Cheap threshold checks over the measured trajectory that catch the
//! pathologies a tuning change cannot fix. These run before anyone
//! trusts an identification or a tuning recommendation built on the
//! same data.

use serde::{Deserialize, Serialize};

use lt_core::{std_dev, EngineConfig, Real, TimeSeries};

/// Overall loop verdict, ordered by severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum HealthStatus {
    Healthy,
    Warning,
    Critical,
}

/// Individual findings feeding the verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthIssue {
    /// Output pinned at its upper limit while the PV lags the setpoint.
    SaturationHigh,
    /// Output pinned at its lower limit while the PV overshoots.
    SaturationLow,
    /// Measurement noise large relative to the setpoint span.
    HighNoise,
    /// Persistent error in the trailing window of the record.
    SteadyStateOffset,
    SustainedOscillation,
    DivergentOscillation,
    StictionRisk,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub issues: Vec<HealthIssue>,
    /// Standard deviation of the PV around its 5-sample moving average.
    pub noise_std: Real,
}

fn mean(values: &[Real]) -> Real {
    values.iter().sum::<Real>() / values.len() as Real
}

/// Centered moving average, window 5, edges padded with the raw signal.
fn smooth(values: &[Real]) -> Vec<Real> {
    let n = values.len();
    let mut out = values.to_vec();
    if n < 5 {
        return out;
    }
    for (k, o) in out.iter_mut().enumerate().take(n - 2).skip(2) {
        *o = (values[k - 2] + values[k - 1] + values[k] + values[k + 1] + values[k + 2]) / 5.0;
    }
    out
}

/// Screen one trajectory for saturation, noise and offset.
pub fn screen_health(series: &TimeSeries, _cfg: &EngineConfig) -> HealthReport {
    let n = series.len();
    let sp = series.setpoint();
    let pv = series.process_value();
    let op = series.controller_output();
    let error = series.error();

    let sp_mean = mean(sp);
    let err_threshold = (0.01 * sp_mean.abs()).max(0.5);

    let mut issues = Vec::new();

    // 1. Actuator saturation: pinned at an observed extreme while the
    //    error says the loop still wants more
    let op_max = op.iter().copied().fold(Real::NEG_INFINITY, Real::max);
    let op_min = op.iter().copied().fold(Real::INFINITY, Real::min);
    let op_range = {
        let r = op_max - op_min;
        if r < 1e-6 { 1.0 } else { r }
    };
    let tol = (0.01 * op_range).max(0.1);

    let mut high = 0usize;
    let mut low = 0usize;
    for k in 0..n {
        if op[k] >= op_max - tol && error[k] > err_threshold {
            high += 1;
        }
        if op[k] <= op_min + tol && error[k] < -err_threshold {
            low += 1;
        }
    }
    if high as Real / n as Real > 0.1 {
        issues.push(HealthIssue::SaturationHigh);
    }
    if low as Real / n as Real > 0.1 {
        issues.push(HealthIssue::SaturationLow);
    }

    // 2. Noise level relative to the setpoint span
    let smoothed = smooth(pv);
    let residual: Vec<Real> = pv.iter().zip(&smoothed).map(|(p, s)| p - s).collect();
    let noise_std = std_dev(&residual);

    let sp_span = {
        let min = sp.iter().copied().fold(Real::INFINITY, Real::min);
        let max = sp.iter().copied().fold(Real::NEG_INFINITY, Real::max);
        let span = max - min;
        if span > 0.0 {
            span
        } else if sp_mean.abs() > 0.0 {
            0.1 * sp_mean.abs()
        } else {
            1.0
        }
    };
    if 3.0 * noise_std > 0.05 * sp_span {
        issues.push(HealthIssue::HighNoise);
    }

    // 3. Steady-state offset over the trailing 20% of the record, only
    //    when the setpoint held still there
    let window = n / 5;
    if window > 5 {
        let sp_seg = &sp[n - window..];
        let err_seg = &error[n - window..];
        if std_dev(sp_seg) < 0.01 * sp_mean.abs() {
            let avg = mean(err_seg);
            if avg.abs() > (0.02 * sp_mean.abs()).max(1.0) {
                issues.push(HealthIssue::SteadyStateOffset);
            }
        }
    }

    let status = if issues.is_empty() {
        HealthStatus::Healthy
    } else {
        HealthStatus::Warning
    };
    HealthReport {
        status,
        issues,
        noise_std,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(sp: Vec<Real>, pv: Vec<Real>, op: Vec<Real>) -> TimeSeries {
        let t: Vec<Real> = (0..sp.len()).map(|i| i as Real).collect();
        TimeSeries::new(t, sp, pv, op).unwrap()
    }

    #[test]
    fn constant_offset_is_reported() {
        let n = 100;
        let s = series(vec![50.0; n], vec![45.0; n], vec![50.0; n]);
        let r = screen_health(&s, &EngineConfig::default());
        assert!(r.issues.contains(&HealthIssue::SteadyStateOffset));
        assert_eq!(r.status, HealthStatus::Warning);
    }

    #[test]
    fn high_saturation_is_reported() {
        // OP pegged at 100 the whole record, PV far below SP
        let n = 100;
        let s = series(vec![80.0; n], vec![60.0; n], vec![100.0; n]);
        let r = screen_health(&s, &EngineConfig::default());
        assert!(r.issues.contains(&HealthIssue::SaturationHigh));
    }

    #[test]
    fn noisy_pv_is_reported() {
        let n = 200;
        let pv: Vec<Real> = (0..n)
            .map(|i| 50.0 + 2.0 * (2.5 * i as Real).sin())
            .collect();
        let s = series(vec![50.0; n], pv, vec![40.0; n]);
        let r = screen_health(&s, &EngineConfig::default());
        assert!(r.issues.contains(&HealthIssue::HighNoise));
        assert!(r.noise_std > 0.0);
    }

    #[test]
    fn well_behaved_loop_is_healthy() {
        let n = 100;
        let pv: Vec<Real> = (0..n)
            .map(|i| 50.0 - 2.0 * (-(i as Real) / 5.0).exp())
            .collect();
        let op: Vec<Real> = (0..n).map(|i| 30.0 + 0.05 * i as Real).collect();
        let r = screen_health(&series(vec![50.0; n], pv, op), &EngineConfig::default());
        assert_eq!(r.status, HealthStatus::Healthy);
        assert!(r.issues.is_empty());
    }
}
