//! Validated control-loop time series.
//!
//! A [`TimeSeries`] holds one recorded trajectory of a single loop:
//! time stamps, setpoint (SP), process value (PV) and controller output
//! (OP), all in the caller's engineering units. The engine borrows it
//! read-only; nothing in the engine mutates or retains a series.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::numeric::Real;

/// One recorded loop trajectory. Columns have equal length and `t` is
/// strictly increasing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    t: Vec<Real>,
    setpoint: Vec<Real>,
    process_value: Vec<Real>,
    controller_output: Vec<Real>,
}

impl TimeSeries {
    /// Build a series from raw columns, validating shape and monotonicity.
    pub fn new(
        t: Vec<Real>,
        setpoint: Vec<Real>,
        process_value: Vec<Real>,
        controller_output: Vec<Real>,
    ) -> CoreResult<Self> {
        let n = t.len();
        if n < 2 {
            return Err(CoreError::Series {
                what: "at least 2 samples required",
            });
        }
        if setpoint.len() != n || process_value.len() != n || controller_output.len() != n {
            return Err(CoreError::Series {
                what: "column lengths differ",
            });
        }
        for cols in [&t, &setpoint, &process_value, &controller_output] {
            if cols.iter().any(|v| !v.is_finite()) {
                return Err(CoreError::Series {
                    what: "non-finite sample",
                });
            }
        }
        if t.windows(2).any(|w| w[1] <= w[0]) {
            return Err(CoreError::Series {
                what: "time must be strictly increasing",
            });
        }
        Ok(Self {
            t,
            setpoint,
            process_value,
            controller_output,
        })
    }

    pub fn len(&self) -> usize {
        self.t.len()
    }

    pub fn is_empty(&self) -> bool {
        false // constructor enforces >= 2 samples
    }

    pub fn t(&self) -> &[Real] {
        &self.t
    }

    pub fn setpoint(&self) -> &[Real] {
        &self.setpoint
    }

    pub fn process_value(&self) -> &[Real] {
        &self.process_value
    }

    pub fn controller_output(&self) -> &[Real] {
        &self.controller_output
    }

    /// Total recorded duration in seconds.
    pub fn duration(&self) -> Real {
        self.t[self.t.len() - 1] - self.t[0]
    }

    /// Mean sample interval.
    pub fn mean_dt(&self) -> Real {
        self.duration() / (self.len() - 1) as Real
    }

    /// Largest sample interval. Large gaps degrade identification quality.
    pub fn max_dt(&self) -> Real {
        self.t
            .windows(2)
            .map(|w| w[1] - w[0])
            .fold(0.0, Real::max)
    }

    /// Control error e_k = sp_k - pv_k.
    pub fn error(&self) -> Vec<Real> {
        self.setpoint
            .iter()
            .zip(&self.process_value)
            .map(|(sp, pv)| sp - pv)
            .collect()
    }
}
