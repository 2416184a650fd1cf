//! # Graphics
//!
//! Everything between the host's shared surface and the GPU:
//!
//! - [`device`]: driver tier and feature level negotiation
//! - [`camera`]: left-handed transforms and the orbit camera
//! - [`geometry`]: the fixed cube meshes
//! - [`resources`]: shared surface binding, depth target, GPU buffers
//! - [`rendering`]: shaders, frame state and the [`RenderEngine`] implementations

pub mod camera;
pub mod device;
pub mod geometry;
pub mod rendering;
pub mod resources;

pub use camera::OrbitCamera;
pub use rendering::{create_engine, FrameSnapshot, RenderEngine};
