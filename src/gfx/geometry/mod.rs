//! # Cube Geometry
//!
//! Fixed cube descriptions consumed by
//! [`GeometryBuffers`](crate::gfx::resources::GeometryBuffers). Nothing here
//! touches the GPU.

pub mod primitives;

pub use primitives::*;

/// Vertex records plus optional 16-bit indices, ready for GPU upload.
#[derive(Debug, Clone)]
pub struct CubeMesh<V> {
    pub vertices: Vec<V>,
    /// `None` for meshes drawn without an index buffer.
    pub indices: Option<Vec<u16>>,
}

impl<V> CubeMesh<V> {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of indices (indexed) or vertices (non-indexed) a draw covers.
    pub fn draw_count(&self) -> u32 {
        match &self.indices {
            Some(indices) => indices.len() as u32,
            None => self.vertices.len() as u32,
        }
    }

    pub fn triangle_count(&self) -> usize {
        self.draw_count() as usize / 3
    }
}
