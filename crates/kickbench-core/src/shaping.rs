//! Bounded reward shaping primitives
//!
//! [`tolerance`] maps a scalar error into `[0, 1]`: exactly `1.0` inside a
//! target interval and decaying smoothly outside of it, with the decay curve
//! chosen by a [`Sigmoid`] and scaled so that one `margin` beyond the nearer
//! bound the output equals `value_at_margin`.
//!
//! [`hamacher_product`] is the fuzzy conjunction used to combine independent
//! sub-scores without introducing discontinuities.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::{RLError, Result};

/// Output of a tolerance curve at exactly one margin beyond the bounds.
///
/// The task rewards use this default, so one margin out a term still reads
/// 0.1 rather than near zero. Pass a smaller value to [`tolerance_with`] for
/// a sharper falloff.
pub const DEFAULT_VALUE_AT_MARGIN: f64 = 0.1;

/// Decay curve family used outside of the tolerance bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sigmoid {
    /// `exp(-x^2 / 2)` scaled
    Gaussian,
    /// `1 / cosh(x)` scaled
    Hyperbolic,
    /// `1 / (x^2 + 1)` scaled: fast initial decay followed by a long tail
    LongTail,
    /// `1 / (|x| + 1)` scaled
    Reciprocal,
    /// Raised cosine with bounded support
    Cosine,
    /// Linear ramp with bounded support
    Linear,
    /// Inverted parabola with bounded support
    Quadratic,
    /// `1 - tanh(x)^2` scaled
    TanhSquared,
}

impl Sigmoid {
    /// Whether the curve reaches exactly zero at a finite distance.
    #[must_use]
    pub fn has_bounded_support(self) -> bool {
        matches!(self, Self::Cosine | Self::Linear | Self::Quadratic)
    }

    /// Evaluate the curve at normalized distance `x` (distance in margins).
    ///
    /// Returns `value_at_1` at `x == 1` and `1.0` at `x == 0`.
    pub fn evaluate(self, x: f64, value_at_1: f64) -> Result<f64> {
        let valid = if self.has_bounded_support() {
            (0.0..1.0).contains(&value_at_1)
        } else {
            value_at_1 > 0.0 && value_at_1 < 1.0
        };
        if !valid {
            return Err(RLError::InvalidArgument(format!(
                "value_at_margin {value_at_1} is out of range for {self:?}"
            )));
        }

        let value = match self {
            Self::Gaussian => {
                let scale = (-2.0 * value_at_1.ln()).sqrt();
                (-0.5 * (x * scale).powi(2)).exp()
            }
            Self::Hyperbolic => {
                let scale = (1.0 / value_at_1).acosh();
                1.0 / (x * scale).cosh()
            }
            Self::LongTail => {
                let scale = (1.0 / value_at_1 - 1.0).sqrt();
                1.0 / ((x * scale).powi(2) + 1.0)
            }
            Self::Reciprocal => {
                let scale = 1.0 / value_at_1 - 1.0;
                1.0 / (x.abs() * scale + 1.0)
            }
            Self::Cosine => {
                let scale = (2.0 * value_at_1 - 1.0).acos() / PI;
                let scaled = x * scale;
                if scaled.abs() < 1.0 {
                    (1.0 + (PI * scaled).cos()) / 2.0
                } else {
                    0.0
                }
            }
            Self::Linear => {
                let scaled = x * (1.0 - value_at_1);
                if scaled.abs() < 1.0 {
                    1.0 - scaled
                } else {
                    0.0
                }
            }
            Self::Quadratic => {
                let scaled = x * (1.0 - value_at_1).sqrt();
                if scaled.abs() < 1.0 {
                    1.0 - scaled * scaled
                } else {
                    0.0
                }
            }
            Self::TanhSquared => {
                let scale = (1.0 - value_at_1).sqrt().atanh();
                1.0 - (x * scale).tanh().powi(2)
            }
        };
        Ok(value)
    }
}

/// Tolerance with the default value at margin.
///
/// See [`tolerance_with`].
pub fn tolerance(x: f64, bounds: (f64, f64), margin: f64, sigmoid: Sigmoid) -> Result<f64> {
    tolerance_with(x, bounds, margin, sigmoid, DEFAULT_VALUE_AT_MARGIN)
}

/// Map `x` into `[0, 1]`: `1.0` when `lower <= x <= upper`, otherwise the
/// `sigmoid` evaluated at the distance to the nearer bound divided by
/// `margin`.
///
/// A zero margin turns the function into a hard indicator of the bounds.
///
/// # Errors
///
/// Returns [`RLError::InvalidArgument`] when `lower > upper`, when `margin`
/// is negative or NaN, or when `value_at_margin` is out of range for the
/// chosen curve.
pub fn tolerance_with(
    x: f64,
    bounds: (f64, f64),
    margin: f64,
    sigmoid: Sigmoid,
    value_at_margin: f64,
) -> Result<f64> {
    let (lower, upper) = bounds;
    if lower > upper {
        return Err(RLError::InvalidArgument(format!(
            "lower bound {lower} exceeds upper bound {upper}"
        )));
    }
    if margin.is_nan() || margin < 0.0 {
        return Err(RLError::InvalidArgument(format!(
            "margin must be non-negative, got {margin}"
        )));
    }

    let in_bounds = lower <= x && x <= upper;
    if in_bounds {
        return Ok(1.0);
    }
    if margin == 0.0 {
        return Ok(0.0);
    }

    let distance = if x < lower { lower - x } else { x - upper };
    sigmoid.evaluate(distance / margin, value_at_margin)
}

/// Hamacher product of two membership values in `[0, 1]`.
///
/// `a * b / (a + b - a * b)`, defined as `0` when both inputs are `0`.
///
/// # Panics
///
/// Panics if either input or the result lies outside `[0, 1]`; shaping
/// terms fed into this operator are bounded by construction.
#[must_use]
pub fn hamacher_product(a: f64, b: f64) -> f64 {
    assert!(
        (0.0..=1.0).contains(&a) && (0.0..=1.0).contains(&b),
        "hamacher product inputs must lie in [0, 1], got {a} and {b}"
    );
    let denominator = a + b - a * b;
    let product = if denominator > 0.0 {
        a * b / denominator
    } else {
        0.0
    };
    assert_unit_interval("hamacher product", product);
    product
}

/// Assert that a shaping term lies in `[0, 1]`.
///
/// # Panics
///
/// Panics with the term name when the value is outside the interval or NaN.
#[track_caller]
pub fn assert_unit_interval(name: &str, value: f64) {
    assert!(
        (0.0..=1.0).contains(&value),
        "{name} must lie in [0, 1], got {value}"
    );
}
