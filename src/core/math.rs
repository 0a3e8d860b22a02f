//! Unit conversions and closed-form differential drive kinematics.
//!
//! Everything here is pure. Division by a zero speed yields a non-finite
//! value; the `*_duration_*` helpers report that as `None` so callers can
//! reject the motion instead of sleeping forever.

use std::f32::consts::{PI, TAU};

/// Normalize angle to (-π, π].
///
/// -π itself maps to +π so every heading has exactly one representation.
///
/// # Example
/// ```
/// use gati::core::math::normalize_angle;
/// use std::f32::consts::PI;
///
/// assert!((normalize_angle(3.0 * PI) - PI).abs() < 1e-5);
/// assert_eq!(normalize_angle(-PI), PI);
/// ```
#[inline]
pub fn normalize_angle(angle: f32) -> f32 {
    let mut a = angle % TAU;
    if a > PI {
        a -= TAU;
    } else if a <= -PI {
        a += TAU;
    }
    a
}

/// Inclusive range check that also rejects NaN.
#[inline]
pub fn in_range(value: f32, min: f32, max: f32) -> bool {
    value >= min && value <= max
}

// ============================================================================
// Unit conversions
// ============================================================================

#[inline]
pub fn meters_to_millimeters(meters: f32) -> f32 {
    meters * 1000.0
}

#[inline]
pub fn millimeters_to_meters(millimeters: f32) -> f32 {
    millimeters / 1000.0
}

#[inline]
pub fn meters_per_s_to_mm_per_s(m_per_s: f32) -> f32 {
    m_per_s * 1000.0
}

#[inline]
pub fn mm_per_s_to_meters_per_s(mm_per_s: f32) -> f32 {
    mm_per_s / 1000.0
}

/// Convert a speed in m/s to the motor's device units (1 unit = 1 mm/s).
///
/// Rounds to the nearest unit so that 0.1 m/s is 100 even when the f32
/// product lands a hair below it.
#[inline]
pub fn meters_per_s_to_device_speed(m_per_s: f32) -> i16 {
    meters_per_s_to_mm_per_s(m_per_s).round() as i16
}

/// Convert seconds to whole milliseconds, rounded.
///
/// Returns `None` for negative or non-finite input and for anything a
/// `u32` millisecond delay cannot hold.
#[inline]
pub fn seconds_to_ms(seconds: f32) -> Option<u32> {
    let ms = (seconds * 1000.0).round();
    // u32::MAX as f32 rounds up to 2^32, so the bound is exclusive
    (ms >= 0.0 && ms < u32::MAX as f32).then(|| ms as u32)
}

// ============================================================================
// Drive kinematics
// ============================================================================

/// Time to cover `distance_m` at `speed_m_per_s`, in milliseconds.
///
/// Returns `None` when the motion never completes (zero speed) or takes
/// longer than a `u32` millisecond delay can express.
pub fn motion_duration_ms(distance_m: f32, speed_m_per_s: f32) -> Option<u32> {
    seconds_to_ms(distance_m / speed_m_per_s)
}

/// Time for an in-place rotation of `angle_rad`.
///
/// ```text
/// θ = (2v / L) · t   =>   t = θ · L / (2v)
/// ```
/// with `L` the wheelbase in mm and `v` the wheel speed in mm/s.
/// Returns `None` when the result is not finite (zero speed).
pub fn turn_duration_s(angle_rad: f32, wheelbase_mm: f32, speed_mm_per_s: f32) -> Option<f32> {
    let t = angle_rad * wheelbase_mm / (2.0 * speed_mm_per_s);
    t.is_finite().then_some(t)
}

/// Inner wheel speed for curved motion.
#[inline]
pub fn inner_wheel_speed(outer_speed: i16, turn_speed_ratio: f32) -> i16 {
    (outer_speed as f32 * turn_speed_ratio).round() as i16
}

// ============================================================================
// Odometry kinematics
// ============================================================================

/// Encoder counts per wheel revolution from counts per motor revolution and gear ratio.
#[inline]
pub fn counts_per_wheel_rev(counts_per_motor_rev: u32, motor_revs_per_wheel_rev: f32) -> f32 {
    counts_per_motor_rev as f32 * motor_revs_per_wheel_rev
}

/// Linear arc length traveled by one wheel.
///
/// ```text
/// Δ = π · D · Δcounts / counts_per_wheel_rev
/// ```
#[inline]
pub fn wheel_arc_length(delta_counts: i32, wheel_diameter_m: f32, counts_per_wheel_rev: f32) -> f32 {
    PI * wheel_diameter_m * delta_counts as f32 / counts_per_wheel_rev
}

/// Heading change from the wheel arc lengths.
#[inline]
pub fn heading_delta(delta_right: f32, delta_left: f32, track_width_m: f32) -> f32 {
    (delta_right - delta_left) / track_width_m
}

/// Heading change from a gyro z-rate (deg/s) integrated over `dt_s` seconds.
#[inline]
pub fn gyro_heading_delta(rate_deg_per_s: f32, dt_s: f32) -> f32 {
    rate_deg_per_s.to_radians() * dt_s
}

/// World-frame displacement of the robot center for the given heading.
#[inline]
pub fn planar_displacement(delta_left: f32, delta_right: f32, theta: f32) -> (f32, f32) {
    let center = (delta_left + delta_right) / 2.0;
    let (sin_t, cos_t) = theta.sin_cos();
    (center * cos_t, center * sin_t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_normalize_angle_zero() {
        assert_eq!(normalize_angle(0.0), 0.0);
    }

    #[test]
    fn test_normalize_angle_boundaries() {
        assert_eq!(normalize_angle(PI), PI);
        assert_eq!(normalize_angle(-PI), PI);
    }

    #[test]
    fn test_normalize_angle_wrap() {
        assert_relative_eq!(normalize_angle(TAU), 0.0, epsilon = 1e-6);
        assert_relative_eq!(normalize_angle(3.0 * PI), PI, epsilon = 1e-5);
        assert_relative_eq!(normalize_angle(-3.0 * PI / 2.0), PI / 2.0, epsilon = 1e-6);
        assert_relative_eq!(normalize_angle(100.0 * PI + 0.5), 0.5, epsilon = 1e-4);
    }

    #[test]
    fn test_normalize_angle_just_beyond_pi() {
        let result = normalize_angle(PI + 0.001);
        assert!(result < 0.0, "Should wrap to negative: {}", result);
        assert_relative_eq!(result, -PI + 0.001, epsilon = 1e-5);
    }

    #[test]
    fn test_normalize_angle_in_range_is_identity() {
        for a in [-3.0f32, -1.0, -0.25, 0.25, 1.0, 3.0] {
            assert_eq!(normalize_angle(a).to_bits(), a.to_bits());
        }
    }

    #[test]
    fn test_in_range_rejects_nan() {
        assert!(in_range(0.0, 0.0, 1.0));
        assert!(in_range(1.0, 0.0, 1.0));
        assert!(!in_range(1.5, 0.0, 1.0));
        assert!(!in_range(f32::NAN, 0.0, 1.0));
    }

    #[test]
    fn test_speed_conversions() {
        assert_eq!(meters_per_s_to_device_speed(0.1), 100);
        assert_eq!(meters_per_s_to_device_speed(0.2), 200);
        assert_eq!(meters_per_s_to_device_speed(0.4), 400);
        assert_relative_eq!(mm_per_s_to_meters_per_s(250.0), 0.25);
        assert_relative_eq!(millimeters_to_meters(meters_to_millimeters(0.098)), 0.098);
    }

    #[test]
    fn test_seconds_to_ms() {
        assert_eq!(seconds_to_ms(0.94), Some(940));
        assert_eq!(seconds_to_ms(0.0), Some(0));
        assert_eq!(seconds_to_ms(60.0), Some(60_000));
    }

    #[test]
    fn test_seconds_to_ms_out_of_range() {
        assert_eq!(seconds_to_ms(-0.5), None);
        assert_eq!(seconds_to_ms(f32::NAN), None);
        assert_eq!(seconds_to_ms(f32::INFINITY), None);
        // 2^32 ms no longer fits a u32 delay
        assert_eq!(seconds_to_ms(4_294_967.5), None);
        assert_eq!(seconds_to_ms(4_000_000.0), Some(4_000_000_000));
    }

    #[test]
    fn test_motion_duration() {
        assert_eq!(motion_duration_ms(1.0, 0.2), Some(5000));
        assert_eq!(motion_duration_ms(0.0, 0.2), Some(0));
        assert_eq!(motion_duration_ms(1.0, 0.0), None);
        assert_eq!(motion_duration_ms(0.0, 0.0), None);
        // 100 m at 1 um/s is 10^11 ms
        assert_eq!(motion_duration_ms(100.0, 1e-6), None);
    }

    #[test]
    fn test_turn_duration() {
        // Quarter turn on a 98mm wheelbase at 100mm/s
        let t = turn_duration_s(PI / 2.0, 98.0, 100.0).unwrap();
        assert_relative_eq!(t, PI / 2.0 * 98.0 / 200.0, epsilon = 1e-6);
        assert!(turn_duration_s(1.0, 98.0, 0.0).is_none());
    }

    #[test]
    fn test_inner_wheel_speed() {
        assert_eq!(inner_wheel_speed(200, 0.5), 100);
        assert_eq!(inner_wheel_speed(200, 0.0), 0);
        assert_eq!(inner_wheel_speed(200, 1.0), 200);
    }

    #[test]
    fn test_wheel_arc_length_one_revolution() {
        let cpr = counts_per_wheel_rev(12, 75.0);
        assert_eq!(cpr, 900.0);
        assert_relative_eq!(wheel_arc_length(900, 0.032, cpr), PI * 0.032, epsilon = 1e-6);
        assert_relative_eq!(wheel_arc_length(-900, 0.032, cpr), -PI * 0.032, epsilon = 1e-6);
    }

    #[test]
    fn test_gyro_heading_delta() {
        assert_relative_eq!(gyro_heading_delta(90.0, 1.0), PI / 2.0, epsilon = 1e-6);
        assert_relative_eq!(gyro_heading_delta(-45.0, 0.5), -PI / 8.0, epsilon = 1e-6);
    }

    #[test]
    fn test_planar_displacement() {
        let (dx, dy) = planar_displacement(0.1, 0.1, PI / 2.0);
        assert_relative_eq!(dx, 0.0, epsilon = 1e-6);
        assert_relative_eq!(dy, 0.1, epsilon = 1e-6);

        let (dx, dy) = planar_displacement(-0.05, 0.05, 0.3);
        assert_eq!(dx, 0.0);
        assert_eq!(dy, 0.0);
    }
}
