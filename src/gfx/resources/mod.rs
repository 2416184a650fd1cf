//! GPU resources bound to the host surface and the cube mesh.

pub mod geometry_buffers;
pub mod shared_surface;
pub mod surface_binder;
pub mod texture_resource;

pub use geometry_buffers::GeometryBuffers;
pub use shared_surface::{SharedSurfaceHandle, SharedSurfaceOpener, SharedSurfaceRegistry};
pub use surface_binder::{BoundTarget, SurfaceBinder, SurfaceChange, Viewport, ViewportState};
pub use texture_resource::DepthTarget;
