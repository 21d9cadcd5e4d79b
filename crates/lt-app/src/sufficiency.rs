//! Data coverage check against the identified process time scale.

use serde::{Deserialize, Serialize};

use lt_core::{FopdtModel, Real, TimeSeries};

/// Safety margin over one settling horizon the record should cover.
const COVERAGE_MARGIN: Real = 1.2;

/// Whether the record is long enough to trust a tuning built on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SufficiencyCheck {
    pub is_sufficient: bool,
    /// Duration the process time scale asks for, seconds.
    pub required_duration: Real,
    pub current_duration: Real,
    pub message: String,
}

/// Compare record duration against the model's settling horizon
/// (4*tau + theta) with a 20% margin. A record cut short mid-transient
/// biases the fitted gain and therefore the tuning.
pub fn check_sufficiency(series: &TimeSeries, model: &FopdtModel) -> SufficiencyCheck {
    let required = COVERAGE_MARGIN * model.settling_horizon();
    let current = series.duration();

    if current < required {
        let shortage = required - current;
        SufficiencyCheck {
            is_sufficient: false,
            required_duration: required,
            current_duration: current,
            message: format!(
                "record too short: process needs ~{required:.1} s of coverage, \
                 have {current:.1} s; collect at least {shortage:.1} s more"
            ),
        }
    } else {
        SufficiencyCheck {
            is_sufficient: true,
            required_duration: required,
            current_duration: current,
            message: "record covers the process response".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series_of(duration_samples: usize) -> TimeSeries {
        let n = duration_samples + 1;
        let t: Vec<Real> = (0..n).map(|i| i as Real).collect();
        TimeSeries::new(t, vec![1.0; n], vec![1.0; n], vec![1.0; n]).unwrap()
    }

    #[test]
    fn long_record_is_sufficient() {
        // horizon = 4*10 + 2 = 42, required = 50.4
        let model = FopdtModel::new(1.0, 10.0, 2.0, 0.0);
        let check = check_sufficiency(&series_of(100), &model);
        assert!(check.is_sufficient);
    }

    #[test]
    fn short_record_is_flagged_with_shortage() {
        let model = FopdtModel::new(1.0, 10.0, 2.0, 0.0);
        let check = check_sufficiency(&series_of(30), &model);
        assert!(!check.is_sufficient);
        assert!((check.required_duration - 50.4).abs() < 1e-9);
        assert!(check.message.contains("too short"));
    }
}
