//! GPU vertex records and their input layouts.
//!
//! Both records carry a position and an RGBA color. Attribute offsets are
//! spelled out explicitly so the layout matches the `#[repr(C)]` field order.

use std::mem;

/// Position (xyz) + color (rgba), 28 bytes. Used by the indexed orbit cube.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ColorVertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
}

impl ColorVertex {
    pub const fn new(position: [f32; 3], color: [f32; 4]) -> Self {
        Self { position, color }
    }

    /// - Attribute 0: position (Float32x3) at offset 0
    /// - Attribute 1: color (Float32x4) at offset 12
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        const ATTRIBUTES: [wgpu::VertexAttribute; 2] = [
            wgpu::VertexAttribute {
                offset: 0,
                shader_location: 0,
                format: wgpu::VertexFormat::Float32x3,
            },
            wgpu::VertexAttribute {
                offset: mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                shader_location: 1,
                format: wgpu::VertexFormat::Float32x4,
            },
        ];

        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<ColorVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &ATTRIBUTES,
        }
    }
}

/// Homogeneous position (xyzw) + color (rgba), 32 bytes. Used by the mini cube.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct HomogeneousColorVertex {
    pub position: [f32; 4],
    pub color: [f32; 4],
}

impl HomogeneousColorVertex {
    pub const fn new(position: [f32; 4], color: [f32; 4]) -> Self {
        Self { position, color }
    }

    /// - Attribute 0: position (Float32x4) at offset 0
    /// - Attribute 1: color (Float32x4) at offset 16
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        const ATTRIBUTES: [wgpu::VertexAttribute; 2] = [
            wgpu::VertexAttribute {
                offset: 0,
                shader_location: 0,
                format: wgpu::VertexFormat::Float32x4,
            },
            wgpu::VertexAttribute {
                offset: mem::size_of::<[f32; 4]>() as wgpu::BufferAddress,
                shader_location: 1,
                format: wgpu::VertexFormat::Float32x4,
            },
        ];

        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<HomogeneousColorVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &ATTRIBUTES,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layouts_match_record_sizes() {
        let layout = ColorVertex::desc();
        assert_eq!(layout.array_stride, 28);
        assert_eq!(layout.attributes[1].offset, 12);

        let layout = HomogeneousColorVertex::desc();
        assert_eq!(layout.array_stride, 32);
        assert_eq!(layout.attributes[1].offset, 16);
    }
}
