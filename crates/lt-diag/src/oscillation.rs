//! Oscillation decay analysis of the control error.

use serde::{Deserialize, Serialize};

use lt_core::{EngineConfig, Real};

/// Damping classification by decay ratio `R`.
///
/// Bands (exclusive of the sustained tolerance window around 1.0):
/// `R < overdamped_ratio` over-damped, `R < 1 - tol` convergent,
/// `|R - 1| <= tol` sustained, `R > 1 + tol` divergent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OscillationClass {
    OverDamped,
    Convergent,
    Sustained,
    Divergent,
}

/// Findings for a detected oscillation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OscillationReport {
    /// First full-period estimate (twice the first half-period), seconds.
    pub period1: Real,
    /// Second full-period estimate.
    pub period2: Real,
    /// Mean ratio of same-polarity peaks two half-periods apart.
    pub decay_ratio: Real,
    pub classification: OscillationClass,
}

/// Scan the error signal for an oscillatory decay pattern.
///
/// Zero crossings split the signal into half-period segments; the peak
/// magnitude of each segment feeds the decay ratio. Fewer than three
/// crossings (or three crossing-bounded peaks) means no reportable
/// oscillation: returns `None`, not an error. Only segments bounded on
/// the right by a crossing contribute a peak; the trailing partial
/// segment is discarded.
pub fn diagnose_oscillation(
    error: &[Real],
    dt: Real,
    cfg: &EngineConfig,
) -> Option<OscillationReport> {
    if error.len() < 3 || dt <= 0.0 {
        return None;
    }

    // Crossing at i: sign changes between samples i and i+1
    let crossings: Vec<usize> = error
        .windows(2)
        .enumerate()
        .filter(|(_, w)| w[0].is_sign_negative() != w[1].is_sign_negative())
        .map(|(i, _)| i)
        .collect();
    if crossings.len() < 3 {
        return None;
    }

    // Peak magnitude per segment: [0..=c0], (c0..=c1], (c1..=c2], ...
    let mut peaks = Vec::with_capacity(crossings.len());
    let mut start = 0;
    for &c in &crossings {
        let peak = error[start..=c]
            .iter()
            .map(|e| e.abs())
            .fold(0.0, Real::max);
        peaks.push(peak);
        start = c + 1;
    }
    if peaks.len() < 3 {
        return None;
    }

    // Same-polarity peaks sit two half-periods apart
    let ratios: Vec<Real> = (0..peaks.len() - 2)
        .filter(|&i| peaks[i] > 0.0)
        .map(|i| peaks[i + 2] / peaks[i])
        .collect();
    if ratios.is_empty() {
        return None;
    }
    let decay_ratio = ratios.iter().sum::<Real>() / ratios.len() as Real;

    let period1 = 2.0 * (crossings[1] - crossings[0]) as Real * dt;
    let period2 = 2.0 * (crossings[2] - crossings[1]) as Real * dt;

    let tol = cfg.decay_tolerance;
    let classification = if decay_ratio < cfg.overdamped_ratio {
        OscillationClass::OverDamped
    } else if (decay_ratio - 1.0).abs() <= tol {
        OscillationClass::Sustained
    } else if decay_ratio < 1.0 - tol {
        OscillationClass::Convergent
    } else {
        OscillationClass::Divergent
    };

    Some(OscillationReport {
        period1,
        period2,
        decay_ratio,
        classification,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> EngineConfig {
        EngineConfig::default()
    }

    #[test]
    fn worked_example_decay_ratio() {
        // Crossings after indices 1, 4, 7; peaks 1.2, 0.8, 0.9;
        // R = 0.9 / 1.2 = 0.75 -> convergent
        let error = [1.2, 0.5, -0.3, -0.8, -0.2, 0.4, 0.9, 0.1, -0.5];
        let report = diagnose_oscillation(&error, 1.0, &cfg()).unwrap();
        assert!((report.decay_ratio - 0.75).abs() < 1e-12);
        assert_eq!(report.classification, OscillationClass::Convergent);
        // Half-periods of 3 samples each
        assert_eq!(report.period1, 6.0);
        assert_eq!(report.period2, 6.0);
    }

    #[test]
    fn too_few_crossings_is_no_finding() {
        let error = [1.0, 0.5, -0.5, -1.0, -0.5]; // one crossing
        assert!(diagnose_oscillation(&error, 1.0, &cfg()).is_none());
    }

    #[test]
    fn monotone_error_is_no_finding() {
        let error: Vec<Real> = (0..50).map(|i| 10.0 - 0.1 * i as Real).collect();
        assert!(diagnose_oscillation(&error, 1.0, &cfg()).is_none());
    }

    #[test]
    fn sustained_oscillation_detected() {
        // Constant-amplitude sine: decay ratio ~ 1
        let error: Vec<Real> = (0..200).map(|i| (0.5 * i as Real).sin()).collect();
        let report = diagnose_oscillation(&error, 0.5, &cfg()).unwrap();
        assert_eq!(report.classification, OscillationClass::Sustained);
        assert!((report.decay_ratio - 1.0).abs() < 0.05);
    }

    #[test]
    fn growing_oscillation_is_divergent() {
        let error: Vec<Real> = (0..200)
            .map(|i| 1.25f64.powi((i / 12) as i32) * (0.5 * i as Real).sin())
            .collect();
        let report = diagnose_oscillation(&error, 1.0, &cfg()).unwrap();
        assert_eq!(report.classification, OscillationClass::Divergent);
    }

    #[test]
    fn heavily_damped_ringing_is_over_damped() {
        // Amplitude collapses by >4x per period
        let error: Vec<Real> = (0..100)
            .map(|i| 10.0 * 0.8f64.powi(i as i32) * (0.5 * i as Real).sin())
            .collect();
        let report = diagnose_oscillation(&error, 1.0, &cfg()).unwrap();
        assert_eq!(report.classification, OscillationClass::OverDamped);
    }

    #[test]
    fn dead_time_scaled_periods() {
        let error = [1.2, 0.5, -0.3, -0.8, -0.2, 0.4, 0.9, 0.1, -0.5];
        let report = diagnose_oscillation(&error, 0.5, &cfg()).unwrap();
        assert_eq!(report.period1, 3.0);
    }
}
