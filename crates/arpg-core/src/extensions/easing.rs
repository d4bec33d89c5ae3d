// extensions/easing.rs
//
// Easing curves for the attack swing. No dependencies on Character/World.

use std::f32::consts::PI;
use serde::{Deserialize, Serialize};

/// Easing function type. Selectable from the tuning config by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    /// Constant velocity.
    Linear,
    QuadInOut,
    CubicInOut,
    /// Very strong slow start.
    QuartIn,
    /// Very strong slow end.
    QuartOut,
    /// Slow wind-up, fast middle, slow follow-through. Default swing curve.
    #[default]
    QuartInOut,
    SineInOut,
}

impl Easing {
    /// Map normalized time `t` (clamped to [0, 1]) onto the curve.
    #[inline]
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::QuadInOut => in_out(t, 2),
            Easing::CubicInOut => in_out(t, 3),
            Easing::QuartIn => t.powi(4),
            Easing::QuartOut => 1.0 - (1.0 - t).powi(4),
            Easing::QuartInOut => in_out(t, 4),
            Easing::SineInOut => -((PI * t).cos() - 1.0) / 2.0,
        }
    }
}

/// Symmetric polynomial ease-in-out of the given degree.
#[inline]
fn in_out(t: f32, degree: i32) -> f32 {
    if t < 0.5 {
        2f32.powi(degree - 1) * t.powi(degree)
    } else {
        1.0 - (-2.0 * t + 2.0).powi(degree) / 2.0
    }
}

#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Interpolate with easing.
#[inline]
pub fn ease(a: f32, b: f32, t: f32, easing: Easing) -> f32 {
    lerp(a, b, easing.apply(t))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Easing; 7] = [
        Easing::Linear,
        Easing::QuadInOut,
        Easing::CubicInOut,
        Easing::QuartIn,
        Easing::QuartOut,
        Easing::QuartInOut,
        Easing::SineInOut,
    ];

    #[test]
    fn endpoints_are_fixed() {
        for easing in ALL {
            assert!(easing.apply(0.0).abs() < 1e-6, "{:?} at 0", easing);
            assert!((easing.apply(1.0) - 1.0).abs() < 1e-6, "{:?} at 1", easing);
        }
    }

    #[test]
    fn quart_in_out_is_symmetric_and_slow_at_edges() {
        let e = Easing::QuartInOut;
        assert!((e.apply(0.5) - 0.5).abs() < 1e-6);
        assert!(e.apply(0.1) < 0.001);
        assert!((e.apply(0.25) + e.apply(0.75) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn curves_are_monotonic() {
        for easing in ALL {
            let mut prev = easing.apply(0.0);
            for i in 1..=100 {
                let v = easing.apply(i as f32 / 100.0);
                assert!(v >= prev - 1e-6, "{:?} decreased at step {}", easing, i);
                prev = v;
            }
        }
    }

    #[test]
    fn input_is_clamped() {
        assert_eq!(Easing::Linear.apply(-3.0), 0.0);
        assert_eq!(Easing::Linear.apply(3.0), 1.0);
    }

    #[test]
    fn ease_interpolates_range() {
        let mid = ease(-90.0, 90.0, 0.5, Easing::QuartInOut);
        assert!(mid.abs() < 1e-4);
    }

    #[test]
    fn parses_from_config_name() {
        let e: Easing = serde_json::from_str("\"quart_in_out\"").unwrap();
        assert_eq!(e, Easing::QuartInOut);
    }
}
