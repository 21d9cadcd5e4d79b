//! Valve stiction (stick-slip) detection.

use lt_core::{std_dev, Real};

/// Trailing window length for the local PV flatness test.
const FLAT_WINDOW: usize = 5;

/// PV jump threshold as a multiple of the noise floor.
const JUMP_FACTOR: Real = 4.0;

/// Look for the stick-slip signature: the PV sits flat while the
/// controller keeps pushing the output, then snaps once the accumulated
/// output change exceeds `op_threshold`.
///
/// `noise_floor` is the local PV standard deviation below which the
/// signal counts as flat; a breakaway jump must exceed four times it.
/// This is a heuristic screen, not a proof; a true positive needs a
/// valve travel test to confirm.
pub fn diagnose_stiction(
    op: &[Real],
    pv: &[Real],
    noise_floor: Real,
    op_threshold: Real,
) -> bool {
    let n = pv.len();
    if op.len() != n || n <= FLAT_WINDOW || noise_floor <= 0.0 || op_threshold <= 0.0 {
        return false;
    }

    // OP travel accumulated over the current flat stretch
    let mut travel = 0.0;
    for k in FLAT_WINDOW..n {
        let window = &pv[k - FLAT_WINDOW..k];
        let flat = std_dev(window) < noise_floor;
        let jump = (pv[k] - pv[k - 1]).abs();

        if flat {
            travel += (op[k] - op[k - 1]).abs();
            if travel >= op_threshold && jump > JUMP_FACTOR * noise_floor {
                return true;
            }
        } else {
            travel = 0.0;
        }
    }
    false
}
