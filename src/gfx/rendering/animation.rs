//! Cube spin and the clock that drives it.

use std::time::Instant;

use cgmath::{Matrix4, Rad};

/// How the cube's world matrix evolves with elapsed time `t` (seconds).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpinProfile {
    /// Pitch by `t`, then yaw by `t`.
    TwoAxis,
    /// Pitch by `t`, yaw by `2t`, roll by `0.7t`.
    ThreeAxis,
}

impl SpinProfile {
    /// World matrix at `t` seconds. Identity at `t = 0`.
    pub fn world_at(self, t: f32) -> Matrix4<f32> {
        match self {
            SpinProfile::TwoAxis => Matrix4::from_angle_y(Rad(t)) * Matrix4::from_angle_x(Rad(t)),
            SpinProfile::ThreeAxis => {
                Matrix4::from_angle_z(Rad(0.7 * t))
                    * Matrix4::from_angle_y(Rad(2.0 * t))
                    * Matrix4::from_angle_x(Rad(t))
            }
        }
    }
}

/// Monotonic animation clock, started by the first frame that samples it.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnimationClock {
    start: Option<Instant>,
}

impl AnimationClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seconds since the first call. The first call returns `0.0`.
    pub fn elapsed_at(&mut self, now: Instant) -> f32 {
        let start = *self.start.get_or_insert(now);
        now.saturating_duration_since(start).as_secs_f32()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{SquareMatrix, Vector4};
    use std::time::Duration;

    fn approx_eq(a: Matrix4<f32>, b: Matrix4<f32>) -> bool {
        let a: [[f32; 4]; 4] = a.into();
        let b: [[f32; 4]; 4] = b.into();
        a.iter()
            .flatten()
            .zip(b.iter().flatten())
            .all(|(x, y)| (x - y).abs() < 1e-5)
    }

    #[test]
    fn test_world_is_identity_at_zero() {
        assert_eq!(SpinProfile::TwoAxis.world_at(0.0), Matrix4::identity());
        assert_eq!(SpinProfile::ThreeAxis.world_at(0.0), Matrix4::identity());
    }

    #[test]
    fn test_two_axis_applies_pitch_before_yaw() {
        let t = std::f32::consts::FRAC_PI_2;
        let world = SpinProfile::TwoAxis.world_at(t);

        // +Y pitches to +Z, then yaws to +X.
        let moved = world * Vector4::new(0.0, 1.0, 0.0, 0.0);
        assert!((moved.x - 1.0).abs() < 1e-5);
        assert!(moved.y.abs() < 1e-5);
        assert!(moved.z.abs() < 1e-5);
    }

    #[test]
    fn test_three_axis_rates() {
        let t = 0.8;
        let expected = Matrix4::from_angle_z(Rad(0.56))
            * Matrix4::from_angle_y(Rad(1.6))
            * Matrix4::from_angle_x(Rad(0.8));
        assert!(approx_eq(SpinProfile::ThreeAxis.world_at(t), expected));
    }

    #[test]
    fn test_world_is_pure_rotation() {
        let world = SpinProfile::ThreeAxis.world_at(1.3);
        assert!((world.determinant() - 1.0).abs() < 1e-4);
        assert_eq!(world.w, Vector4::new(0.0, 0.0, 0.0, 1.0));
    }

    #[test]
    fn test_clock_starts_on_first_sample() {
        let mut clock = AnimationClock::new();
        let start = Instant::now();
        assert_eq!(clock.elapsed_at(start), 0.0);

        let later = start + Duration::from_millis(1500);
        assert!((clock.elapsed_at(later) - 1.5).abs() < 1e-6);
    }

    #[test]
    fn test_clock_never_runs_backwards() {
        let mut clock = AnimationClock::new();
        let start = Instant::now() + Duration::from_secs(1);
        clock.elapsed_at(start);
        assert_eq!(clock.elapsed_at(start - Duration::from_millis(10)), 0.0);
    }
}
