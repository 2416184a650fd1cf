//! Per-frame transform state.
//!
//! Everything a frame computes on the CPU before touching the GPU: elapsed
//! time, world matrix, view matrix. Timestamps are passed in so the sequence
//! is reproducible in tests.

use std::time::Instant;

use cgmath::{Matrix4, Vector3};

use crate::gfx::camera::{look_at_lh, OrbitCamera};

use super::animation::{AnimationClock, SpinProfile};

/// Where a frame's view matrix comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewSource {
    /// Host-controlled orbit camera, rebuilt every frame.
    Orbit(OrbitCamera),
    /// Constant view matrix.
    Fixed(Matrix4<f32>),
}

impl ViewSource {
    pub fn fixed_look_at(eye: Vector3<f32>, target: Vector3<f32>) -> Self {
        ViewSource::Fixed(look_at_lh(eye, target, Vector3::unit_y()))
    }

    fn next_view(&mut self) -> Matrix4<f32> {
        match self {
            ViewSource::Orbit(camera) => {
                camera.update();
                camera.view()
            }
            ViewSource::Fixed(view) => *view,
        }
    }
}

/// Transforms used by one rendered frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameSnapshot {
    /// Zero-based frame number.
    pub index: u64,
    /// Seconds since the first frame.
    pub elapsed: f32,
    pub world: Matrix4<f32>,
    pub view: Matrix4<f32>,
    pub projection: Matrix4<f32>,
}

impl FrameSnapshot {
    pub fn view_projection(&self) -> Matrix4<f32> {
        self.projection * self.view
    }

    pub fn world_view_projection(&self) -> Matrix4<f32> {
        self.projection * self.view * self.world
    }
}

pub struct FrameState {
    spin: SpinProfile,
    clock: AnimationClock,
    view: ViewSource,
    frames: u64,
    last: Option<FrameSnapshot>,
}

impl FrameState {
    pub fn new(spin: SpinProfile, view: ViewSource) -> Self {
        Self {
            spin,
            clock: AnimationClock::new(),
            view,
            frames: 0,
            last: None,
        }
    }

    /// Computes the transforms for a frame rendered at `now`.
    ///
    /// The first call starts the animation clock. The orbit camera, if any,
    /// rebuilds its view here.
    pub fn advance(&mut self, now: Instant, projection: Matrix4<f32>) -> FrameSnapshot {
        let elapsed = self.clock.elapsed_at(now);
        let snapshot = FrameSnapshot {
            index: self.frames,
            elapsed,
            world: self.spin.world_at(elapsed),
            view: self.view.next_view(),
            projection,
        };
        self.frames += 1;
        self.last = Some(snapshot);
        snapshot
    }

    pub fn last_frame(&self) -> Option<&FrameSnapshot> {
        self.last.as_ref()
    }

    pub fn frame_count(&self) -> u64 {
        self.frames
    }

    pub fn camera(&self) -> Option<&OrbitCamera> {
        match &self.view {
            ViewSource::Orbit(camera) => Some(camera),
            ViewSource::Fixed(_) => None,
        }
    }

    pub fn camera_mut(&mut self) -> Option<&mut OrbitCamera> {
        match &mut self.view {
            ViewSource::Orbit(camera) => Some(camera),
            ViewSource::Fixed(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use cgmath::{SquareMatrix, Zero};

    use crate::gfx::camera::{projection_aspect, ProjectionParams};
    use crate::gfx::resources::ViewportState;

    #[test]
    fn test_first_frame_has_identity_world() {
        let mut state = FrameState::new(
            SpinProfile::TwoAxis,
            ViewSource::Orbit(OrbitCamera::new()),
        );
        let frame = state.advance(Instant::now(), Matrix4::identity());

        assert_eq!(frame.index, 0);
        assert_eq!(frame.elapsed, 0.0);
        assert_eq!(frame.world, Matrix4::identity());
    }

    #[test]
    fn test_default_orbit_view() {
        let mut state = FrameState::new(
            SpinProfile::TwoAxis,
            ViewSource::Orbit(OrbitCamera::new()),
        );
        let frame = state.advance(Instant::now(), Matrix4::identity());

        let mut expected = Matrix4::identity();
        expected.w.z = -0.7;
        let diff: [[f32; 4]; 4] = (frame.view - expected).into();
        assert!(diff.iter().flatten().all(|v| v.abs() < 1e-6));
    }

    #[test]
    fn test_fixed_view_ignores_camera_controls() {
        let mut state = FrameState::new(
            SpinProfile::ThreeAxis,
            ViewSource::fixed_look_at(Vector3::new(0.0, 0.0, -5.0), Vector3::zero()),
        );
        assert!(state.camera_mut().is_none());

        let frame = state.advance(Instant::now(), Matrix4::identity());
        let origin_in_view = frame.view * cgmath::Vector4::new(0.0, 0.0, 0.0, 1.0);
        assert!((origin_in_view.z - 5.0).abs() < 1e-5);
    }

    #[test]
    fn test_camera_change_applies_on_next_frame() {
        let mut state = FrameState::new(
            SpinProfile::TwoAxis,
            ViewSource::Orbit(OrbitCamera::new()),
        );
        let start = Instant::now();
        let first = state.advance(start, Matrix4::identity());

        if let Some(camera) = state.camera_mut() {
            camera.set_radius(3.0);
        }
        let second = state.advance(start, Matrix4::identity());
        assert_ne!(first.view, second.view);
        assert_eq!(state.camera().map(OrbitCamera::view), Some(second.view));
    }

    #[test]
    fn test_two_frames_at_800_by_600() {
        let mut viewport = ViewportState::new(ProjectionParams::ORBIT);
        viewport.apply_extent(800, 600);

        let mut state = FrameState::new(
            SpinProfile::TwoAxis,
            ViewSource::Orbit(OrbitCamera::new()),
        );
        let start = Instant::now();
        let first = state.advance(start, viewport.projection());
        assert!(
            (projection_aspect(&first.projection) - 4.0 / 3.0).abs() < 1e-5
        );

        let later = start + Duration::from_millis(250);
        let second = state.advance(later, viewport.projection());

        assert_eq!(second.index, 1);
        assert!((second.elapsed - 0.25).abs() < 1e-6);
        assert_eq!(second.world, SpinProfile::TwoAxis.world_at(second.elapsed));
        assert_eq!(second.view, first.view);
        assert_eq!(second.projection, first.projection);
        assert_eq!(state.last_frame(), Some(&second));
        assert_eq!(state.frame_count(), 2);
    }

    #[test]
    fn test_world_view_projection_order() {
        let mut state = FrameState::new(
            SpinProfile::ThreeAxis,
            ViewSource::fixed_look_at(Vector3::new(0.0, 0.0, -5.0), Vector3::zero()),
        );
        let projection = ProjectionParams::MINI.matrix(640, 480);
        let frame = state.advance(Instant::now(), projection);

        assert_eq!(
            frame.world_view_projection(),
            projection * frame.view * frame.world
        );
        assert_eq!(frame.view_projection(), projection * frame.view);
    }
}
