use cgmath::{Matrix4, Rad, SquareMatrix, Vector3};

use super::camera_utils::look_at_lh;

/// Orbit camera driven by spherical coordinates.
///
/// `radius`, `theta` (polar angle) and `phi` (azimuth) are the only inputs.
/// Every setter recomputes the Cartesian eye position immediately; the view
/// matrix is only rebuilt by [`update`](Self::update), and rebuilt on every call.
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitCamera {
    radius: f32,
    theta: f32,
    phi: f32,
    eye: Vector3<f32>,
    look_at: Vector3<f32>,
    up: Vector3<f32>,
    view: Matrix4<f32>,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::new()
    }
}

impl OrbitCamera {
    pub const DEFAULT_EYE: Vector3<f32> = Vector3::new(0.0, 0.0, -0.3);
    pub const DEFAULT_LOOK_AT: Vector3<f32> = Vector3::new(0.0, 0.0, 1.0);
    pub const DEFAULT_UP: Vector3<f32> = Vector3::new(0.0, 1.0, 0.0);

    pub fn new() -> Self {
        let mut camera = Self {
            radius: 0.0,
            theta: 0.0,
            phi: 0.0,
            eye: Self::DEFAULT_EYE,
            look_at: Self::DEFAULT_LOOK_AT,
            up: Self::DEFAULT_UP,
            view: Matrix4::identity(),
        };
        camera.reset();
        camera
    }

    /// Restores eye, look-at and up to their defaults and the view to identity.
    ///
    /// Orbit parameters are kept; the next setter call derives the eye from them again.
    pub fn reset(&mut self) {
        self.view = Matrix4::identity();
        self.eye = Self::DEFAULT_EYE;
        self.look_at = Self::DEFAULT_LOOK_AT;
        self.up = Self::DEFAULT_UP;
    }

    /// Rebuilds the view matrix from the current eye, look-at and up vectors.
    pub fn update(&mut self) {
        self.view = look_at_lh(self.eye + self.look_at, self.look_at, self.up);
    }

    /// Negative values are accepted and mirror the eye through the origin.
    pub fn set_radius(&mut self, radius: f32) {
        self.radius = radius;
        self.update_position();
    }

    pub fn set_theta(&mut self, theta: f32) {
        self.theta = theta;
        self.update_position();
    }

    pub fn set_phi(&mut self, phi: f32) {
        self.phi = phi;
        self.update_position();
    }

    /// Slider-friendly variant of [`set_theta`](Self::set_theta).
    pub fn set_theta_degrees(&mut self, degrees: f32) {
        self.set_theta(Rad::from(cgmath::Deg(degrees)).0);
    }

    /// Slider-friendly variant of [`set_phi`](Self::set_phi).
    pub fn set_phi_degrees(&mut self, degrees: f32) {
        self.set_phi(Rad::from(cgmath::Deg(degrees)).0);
    }

    /// Moves the look-at target along the view axis to `(0, 0, depth)`.
    pub fn set_center_depth(&mut self, depth: f32) {
        self.look_at = Vector3::new(0.0, 0.0, depth);
    }

    fn update_position(&mut self) {
        self.eye = calculate_cartesian_eye_position(self.radius, self.theta, self.phi);
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn theta(&self) -> f32 {
        self.theta
    }

    pub fn phi(&self) -> f32 {
        self.phi
    }

    pub fn eye(&self) -> Vector3<f32> {
        self.eye
    }

    pub fn look_at(&self) -> Vector3<f32> {
        self.look_at
    }

    pub fn up(&self) -> Vector3<f32> {
        self.up
    }

    pub fn view(&self) -> Matrix4<f32> {
        self.view
    }
}

/// `(r·sinθ·cosφ, r·sinφ, −r·cosθ·cosφ)`
fn calculate_cartesian_eye_position(radius: f32, theta: f32, phi: f32) -> Vector3<f32> {
    Vector3::new(
        radius * theta.sin() * phi.cos(),
        radius * phi.sin(),
        -radius * theta.cos() * phi.cos(),
    )
}
