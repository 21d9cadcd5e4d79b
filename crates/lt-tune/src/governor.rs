//! Bounded-step parameter update policy.
//!
//! The discrete analogue of a damped Newton update: however far the
//! proposed value is from the current one, the realized step never
//! exceeds a fixed fraction of the current magnitude. For any sequence
//! of proposals converging to a fixed target, the realized sequence
//! converges monotonically toward it. Independent of any tuning rule,
//! so future rules inherit the same guarantee.

use serde::{Deserialize, Serialize};

use lt_core::{PidGains, Real};

/// Clamp a proposed parameter change to at most `max_fraction` of the
/// current magnitude.
///
/// `old == 0.0` adopts the proposal directly: there is no magnitude to
/// scale a step by, and a loop being commissioned has to start somewhere.
pub fn bounded_step(old: Real, proposed: Real, max_fraction: Real) -> Real {
    if old == 0.0 {
        return proposed;
    }
    let max_step = max_fraction * old.abs();
    let delta = (proposed - old).clamp(-max_step, max_step);
    old + delta
}

/// Which gain fields had their step clamped by the governor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GainField {
    Kc,
    Ti,
    Td,
}

/// A staged tuning move: where the loop is, where the rule says it
/// should end up, and the one bounded step to take next.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TuningSuggestion {
    pub current: PidGains,
    pub target: PidGains,
    pub next_step: PidGains,
    /// Fields where the target is further than one step away.
    pub limited: Vec<GainField>,
}

/// Apply the safety governor to every gain field.
pub fn suggest(current: &PidGains, target: &PidGains, max_fraction: Real) -> TuningSuggestion {
    let mut limited = Vec::new();
    let mut step = |old: Real, proposed: Real, field: GainField| {
        let next = bounded_step(old, proposed, max_fraction);
        if (next - proposed).abs() > 1e-9 * proposed.abs().max(1.0) {
            limited.push(field);
        }
        next
    };

    let kc = step(current.kc, target.kc, GainField::Kc);
    let ti = step(current.ti, target.ti, GainField::Ti);
    let td = step(current.td, target.td, GainField::Td);

    TuningSuggestion {
        current: *current,
        target: *target,
        next_step: PidGains { kc, ti, td },
        limited,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn clamps_large_increase() {
        // old=10, proposed=20, 20% cap: result is 12, not 20
        assert_eq!(bounded_step(10.0, 20.0, 0.2), 12.0);
    }

    #[test]
    fn clamps_large_decrease() {
        assert_eq!(bounded_step(10.0, 1.0, 0.2), 8.0);
    }

    #[test]
    fn passes_small_change_through() {
        assert_eq!(bounded_step(10.0, 11.0, 0.2), 11.0);
    }

    #[test]
    fn zero_current_adopts_proposal() {
        assert_eq!(bounded_step(0.0, 4.2, 0.2), 4.2);
    }

    #[test]
    fn negative_current_is_handled_by_magnitude() {
        // old=-10, 20% cap: step limit 2, proposed 0 -> -8
        assert_eq!(bounded_step(-10.0, 0.0, 0.2), -8.0);
    }

    #[test]
    fn suggestion_flags_limited_fields() {
        let current = PidGains::pi(1.0, 100.0);
        let target = PidGains::pi(2.0, 105.0);
        let s = suggest(&current, &target, 0.2);
        assert_eq!(s.next_step.kc, 1.2);
        assert_eq!(s.next_step.ti, 105.0);
        assert_eq!(s.limited, vec![GainField::Kc]);
    }

    #[test]
    fn repeated_steps_converge_to_target() {
        let mut kc = 1.0;
        for _ in 0..40 {
            kc = bounded_step(kc, 5.0, 0.2);
        }
        assert!((kc - 5.0).abs() < 1e-9);
    }

    proptest! {
        // |new - old| <= fraction * |old| whenever old != 0
        #[test]
        fn step_bound_invariant(
            old in -1e3f64..1e3,
            proposed in -1e3f64..1e3,
            fraction in 0.01f64..1.0,
        ) {
            prop_assume!(old != 0.0);
            let new = bounded_step(old, proposed, fraction);
            prop_assert!((new - old).abs() <= fraction * old.abs() + 1e-12);
        }

        // The realized value never moves past the proposal
        #[test]
        fn never_overshoots_proposal(
            old in -1e3f64..1e3,
            proposed in -1e3f64..1e3,
            fraction in 0.01f64..1.0,
        ) {
            let new = bounded_step(old, proposed, fraction);
            let lo = old.min(proposed) - 1e-12;
            let hi = old.max(proposed) + 1e-12;
            prop_assert!(new >= lo && new <= hi);
        }
    }
}
