//! SWR, reflection coefficient and mismatch loss derivation.
//!
//! All functions here are pure. Physically impossible inputs (more reflected
//! than forward power) are not errors: they saturate to the off-scale values
//! the display understands, [`SWR_CEILING`] and a reflection coefficient of 1.

use crate::SWR_CEILING;
use serde::{Deserialize, Serialize};

/// Quantities derived from one forward/reverse power pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Derivation {
    pub swr: f64,
    pub reflection_coefficient: f64,
    pub power_loss_percent: f64,
}

/// Round `value` to `places` decimal places.
pub fn round_to(value: f64, places: i32) -> f64 {
    let scale = 10f64.powi(places);
    (value * scale).round() / scale
}

/// Compute the standing wave ratio from forward and reverse power.
///
/// Returns 1.0 with no reflected power and [`SWR_CEILING`] when reverse
/// power reaches or exceeds forward power. Finite ratios above the ceiling
/// are clamped to it.
pub fn compute_swr(forward: f64, reverse: f64) -> f64 {
    if reverse <= 0.0 {
        return 1.0;
    }
    // rho reaches 1 at equal power and the ratio diverges
    if forward <= reverse {
        return SWR_CEILING;
    }

    let rho = (reverse / forward).sqrt();
    let swr = round_to((1.0 + rho) / (1.0 - rho), 2);

    if swr.is_finite() && swr <= SWR_CEILING {
        swr
    } else {
        SWR_CEILING
    }
}

/// Compute the reflection coefficient rho, rounded to 4 decimal places.
pub fn compute_reflection_coefficient(forward: f64, reverse: f64) -> f64 {
    if reverse <= 0.0 {
        return 0.0;
    }
    if forward <= reverse {
        return 1.0;
    }

    let rho = round_to((reverse / forward).sqrt(), 4);
    if rho.is_finite() {
        rho.clamp(0.0, 1.0)
    } else {
        1.0
    }
}

/// Percentage of incident power lost to reflection, rounded to 2 decimal places.
pub fn compute_power_loss_percent(reflection_coefficient: f64) -> f64 {
    let rho = reflection_coefficient;
    let loss = (1.0 - (1.0 - rho * rho)) * 100.0;
    round_to(loss, 2).clamp(0.0, 100.0)
}

/// Derive all metrics for one tick.
///
/// Loss is computed from the rounded reflection coefficient so the three
/// published numbers agree with each other.
pub fn derive(forward: f64, reverse: f64) -> Derivation {
    let reflection_coefficient = compute_reflection_coefficient(forward, reverse);

    Derivation {
        swr: compute_swr(forward, reverse),
        reflection_coefficient,
        power_loss_percent: compute_power_loss_percent(reflection_coefficient),
    }
}
