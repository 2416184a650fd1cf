//! Left-handed transform helpers.
//!
//! All matrices use cgmath's column-vector convention (`clip = P * V * W * p`)
//! and a left-handed view space with depth mapped to `0..1`, which matches
//! wgpu's clip space directly. No GL-to-wgpu correction matrix is needed.

use cgmath::{InnerSpace, Matrix4, Rad, Vector3};

/// Perspective projection parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectionParams {
    pub fovy: Rad<f32>,
    pub znear: f32,
    pub zfar: f32,
}

impl ProjectionParams {
    /// π/4 field of view, near 0.01, far 100.
    pub const ORBIT: ProjectionParams = ProjectionParams {
        fovy: Rad(std::f32::consts::FRAC_PI_4),
        znear: 0.01,
        zfar: 100.0,
    };

    /// π/4 field of view, near 0.1, far 100.
    pub const MINI: ProjectionParams = ProjectionParams {
        fovy: Rad(std::f32::consts::FRAC_PI_4),
        znear: 0.1,
        zfar: 100.0,
    };

    pub fn matrix(&self, width: u32, height: u32) -> Matrix4<f32> {
        let aspect = width as f32 / height as f32;
        perspective_fov_lh(self.fovy, aspect, self.znear, self.zfar)
    }
}

/// Left-handed look-at view matrix: +Z points from `eye` toward `target`.
pub fn look_at_lh(eye: Vector3<f32>, target: Vector3<f32>, up: Vector3<f32>) -> Matrix4<f32> {
    let z = (target - eye).normalize();
    let x = up.cross(z).normalize();
    let y = z.cross(x);

    #[rustfmt::skip]
    let view = Matrix4::new(
        x.x,          y.x,          z.x,          0.0,
        x.y,          y.y,          z.y,          0.0,
        x.z,          y.z,          z.z,          0.0,
        -x.dot(eye),  -y.dot(eye),  -z.dot(eye),  1.0,
    );
    view
}

/// Left-handed perspective projection with depth in `0..1`.
pub fn perspective_fov_lh(fovy: Rad<f32>, aspect: f32, znear: f32, zfar: f32) -> Matrix4<f32> {
    let y_scale = 1.0 / (fovy.0 * 0.5).tan();
    let x_scale = y_scale / aspect;
    let q = zfar / (zfar - znear);

    #[rustfmt::skip]
    let projection = Matrix4::new(
        x_scale, 0.0,     0.0,         0.0,
        0.0,     y_scale, 0.0,         0.0,
        0.0,     0.0,     q,           1.0,
        0.0,     0.0,     -q * znear,  0.0,
    );
    projection
}

/// Aspect ratio encoded in a projection built by [`perspective_fov_lh`].
pub fn projection_aspect(projection: &Matrix4<f32>) -> f32 {
    projection[1][1] / projection[0][0]
}

/// Column-major copy of a matrix, the layout WGSL's `mat4x4<f32>` reads.
pub fn convert_matrix4_to_array(matrix4: Matrix4<f32>) -> [[f32; 4]; 4] {
    matrix4.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{SquareMatrix, Vector4};

    #[test]
    fn test_look_at_maps_target_onto_positive_z() {
        let eye = Vector3::new(1.0, 2.0, -3.0);
        let target = Vector3::new(0.0, 0.0, 0.0);
        let view = look_at_lh(eye, target, Vector3::unit_y());

        let eye_in_view = view * eye.extend(1.0);
        assert!(eye_in_view.truncate().magnitude() < 1e-5);

        let target_in_view = view * target.extend(1.0);
        let distance = (target - eye).magnitude();
        assert!(target_in_view.x.abs() < 1e-5);
        assert!(target_in_view.y.abs() < 1e-5);
        assert!((target_in_view.z - distance).abs() < 1e-5);
    }

    #[test]
    fn test_perspective_depth_range() {
        let proj = perspective_fov_lh(Rad(std::f32::consts::FRAC_PI_4), 1.0, 0.01, 100.0);

        let near = proj * Vector4::new(0.0, 0.0, 0.01, 1.0);
        let far = proj * Vector4::new(0.0, 0.0, 100.0, 1.0);
        assert!((near.z / near.w).abs() < 1e-5);
        assert!((far.z / far.w - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_projection_aspect() {
        let proj = ProjectionParams::ORBIT.matrix(800, 600);
        assert!((projection_aspect(&proj) - 800.0 / 600.0).abs() < 1e-5);
    }

    #[test]
    fn test_convert_is_column_major() {
        let mut m = Matrix4::identity();
        m.w.z = -0.7;
        let array = convert_matrix4_to_array(m);
        assert_eq!(array[3][2], -0.7);
        assert_eq!(array[2][3], 0.0);
    }
}
