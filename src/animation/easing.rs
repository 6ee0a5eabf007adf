//! Easing curves for convergence interpolation.
//!
//! Every curve maps normalized time in `[0, 1]` onto progress in `[0, 1]`
//! with `f(0) = 0` and `f(1) = 1`, and exposes its analytic derivative so
//! callers can convert between end deltas and velocities.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Easing function variants for convergence curves.
#[derive(
    Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    /// Linear interpolation (no easing).
    Linear,
    /// Quadratic ease-in (slow start, fast end).
    QuadraticIn,
    /// Quadratic ease-out (fast start, slow end).
    QuadraticOut,
    /// Cubic ease-out: `1 - (1 - t)³`.
    CubicOut,
    /// Cubic Bezier-style curve with configurable inner control points.
    /// Formula: c1·3t(1-t)² + c2·3(1-t)t² + t³
    CubicHermite {
        /// First inner control value.
        c1: f64,
        /// Second inner control value.
        c2: f64,
    },
}

impl Easing {
    /// The decelerating curve used for camera motion.
    pub const EASE_OUT: Easing = Easing::CubicOut;

    /// Evaluate the easing function at time t.
    ///
    /// Input t is clamped to [0.0, 1.0].
    #[inline]
    #[must_use]
    pub fn evaluate(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);

        match *self {
            Easing::Linear => t,
            Easing::QuadraticIn => t * t,
            Easing::QuadraticOut => {
                let omt = 1.0 - t;
                1.0 - omt * omt
            }
            Easing::CubicOut => {
                let omt = 1.0 - t;
                1.0 - omt * omt * omt
            }
            Easing::CubicHermite { c1, c2 } => {
                let omt = 1.0 - t;
                c1 * 3.0 * t * omt * omt + c2 * 3.0 * omt * t * t + t * t * t
            }
        }
    }

    /// First derivative `f'(t)`, with t clamped to [0.0, 1.0].
    #[inline]
    #[must_use]
    pub fn derivative(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);

        match *self {
            Easing::Linear => 1.0,
            Easing::QuadraticIn => 2.0 * t,
            Easing::QuadraticOut => 2.0 * (1.0 - t),
            Easing::CubicOut => {
                let omt = 1.0 - t;
                3.0 * omt * omt
            }
            Easing::CubicHermite { c1, c2 } => {
                let omt = 1.0 - t;
                3.0 * c1 * (omt * omt - 2.0 * t * omt)
                    + 3.0 * c2 * (2.0 * t * omt - t * t)
                    + 3.0 * t * t
            }
        }
    }

    /// Slope of the curve at the start of an animation.
    ///
    /// An animation over `duration` covering `delta` starts with velocity
    /// `delta * derivate_at0 / duration`.
    #[inline]
    #[must_use]
    pub fn derivate_at0(&self) -> f64 {
        self.derivative(0.0)
    }
}

impl Default for Easing {
    #[inline]
    fn default() -> Self {
        Self::EASE_OUT
    }
}
