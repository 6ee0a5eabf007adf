//! Conversion between orbit angles and unit directions.
//!
//! `u` is the azimuth around the Y axis and `v` the polar angle measured
//! from +Y, so `v = 0` looks straight down and `v = π/2` is level. The
//! mapping follows the UV-sphere convention: a direction `d` has
//! `u = π - atan2(d.z, d.x)` and `v = π/2 - asin(d.y)`.

use std::f64::consts::{FRAC_PI_2, PI, TAU};

use glam::DVec3;

/// Orbit angles `(u, v)` of a direction. Zero vectors map to the level
/// view along -X.
#[must_use]
pub fn uv_from_direction(direction: DVec3) -> (f64, f64) {
    let d = direction.normalize_or(DVec3::NEG_X);
    let u = PI - d.z.atan2(d.x);
    let v = FRAC_PI_2 - d.y.clamp(-1.0, 1.0).asin();
    (u, v)
}

/// Unit direction of the orbit angles `(u, v)`.
#[must_use]
pub fn direction_from_uv(u: f64, v: f64) -> DVec3 {
    let (sin_u, cos_u) = u.sin_cos();
    let (sin_v, cos_v) = v.sin_cos();
    DVec3::new(-sin_v * cos_u, cos_v, sin_v * sin_u)
}

/// The angle equivalent to `target` (mod 2π) closest to `current`, so an
/// animation between them never spins round more than half a turn.
#[must_use]
pub fn nearest_turn(current: f64, target: f64) -> f64 {
    ((current - target) / TAU).round() * TAU + target
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: DVec3, b: DVec3) {
        assert!((a - b).length() < 1e-9, "{a} != {b}");
    }

    #[test]
    fn round_trip_directions() {
        for dir in [
            DVec3::new(-1.0, 0.3, 0.0),
            DVec3::new(0.2, -0.9, 0.4),
            DVec3::new(0.0, 0.0, 1.0),
            DVec3::new(3.0, 1.0, -2.0),
        ] {
            let (u, v) = uv_from_direction(dir);
            assert_close(direction_from_uv(u, v), dir.normalize());
        }
    }

    #[test]
    fn level_view_has_half_pi_polar_angle() {
        let (u, v) = uv_from_direction(DVec3::NEG_X);
        assert!((v - FRAC_PI_2).abs() < 1e-12);
        assert!((u - PI).abs() < 1e-12 || (u + PI).abs() < 1e-12 || u.abs() < 1e-12);
        assert_close(direction_from_uv(u, v), DVec3::NEG_X);
    }

    #[test]
    fn zero_direction_falls_back() {
        let (u, v) = uv_from_direction(DVec3::ZERO);
        assert_close(direction_from_uv(u, v), DVec3::NEG_X);
    }

    #[test]
    fn nearest_turn_stays_within_half_turn() {
        let current = 7.0 * TAU + 0.1;
        let target = nearest_turn(current, 0.3);
        assert!((target - current).abs() <= PI);
        assert!(((target - 0.3) / TAU - ((target - 0.3) / TAU).round()).abs() < 1e-9);
        assert_eq!(nearest_turn(0.0, 1.0), 1.0);
    }
}
