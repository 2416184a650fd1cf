pub mod camera_utils;
pub mod orbit_camera;

// Re-export main types
pub use camera_utils::{look_at_lh, perspective_fov_lh, projection_aspect, ProjectionParams};
pub use orbit_camera::OrbitCamera;
