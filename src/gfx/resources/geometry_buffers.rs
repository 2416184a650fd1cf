//! Vertex, index and constant buffers for one cube mesh.

use wgpu::util::DeviceExt;

use crate::gfx::geometry::CubeMesh;
use crate::wgpu_utils::UniformBuffer;

/// GPU copy of a [`CubeMesh`] plus the transform constants it is drawn with.
///
/// Vertex and index data are immutable after creation. The constant buffer is
/// rewritten in full once per frame through [`update_constants`](Self::update_constants).
pub struct GeometryBuffers<U> {
    vertex_buffer: wgpu::Buffer,
    index_buffer: Option<wgpu::Buffer>,
    draw_count: u32,
    constants: UniformBuffer<U>,
    bind_group: wgpu::BindGroup,
}

impl<U: bytemuck::Pod> GeometryBuffers<U> {
    /// Uploads `mesh` and allocates the constant buffer bound through `layout`.
    pub fn create<V: bytemuck::Pod>(
        device: &wgpu::Device,
        mesh: &CubeMesh<V>,
        layout: &wgpu::BindGroupLayout,
    ) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Cube Vertex Buffer"),
            contents: bytemuck::cast_slice(&mesh.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let index_buffer = mesh.indices.as_ref().map(|indices| {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Cube Index Buffer"),
                contents: bytemuck::cast_slice(indices),
                usage: wgpu::BufferUsages::INDEX,
            })
        });

        let constants = UniformBuffer::<U>::new(device);
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Transform Bind Group"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: constants.binding_resource(),
            }],
        });

        log::debug!(
            "uploaded cube: {} vertices, {} indices, {} byte constants",
            mesh.vertex_count(),
            mesh.indices.as_ref().map_or(0, Vec::len),
            UniformBuffer::<U>::content_size()
        );

        Self {
            vertex_buffer,
            index_buffer,
            draw_count: mesh.draw_count(),
            constants,
            bind_group,
        }
    }

    /// Overwrites the whole constant buffer. Must precede the draw that reads it.
    pub fn update_constants(&mut self, queue: &wgpu::Queue, uniform: &U) {
        self.constants.write(queue, uniform);
    }

    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_bind_group(0, &self.bind_group, &[]);
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        match &self.index_buffer {
            Some(index_buffer) => {
                pass.set_index_buffer(index_buffer.slice(..), wgpu::IndexFormat::Uint16);
                pass.draw_indexed(0..self.draw_count, 0, 0..1);
            }
            None => pass.draw(0..self.draw_count, 0..1),
        }
    }

    /// Full constant uploads issued so far.
    pub fn constant_writes(&self) -> u64 {
        self.constants.write_count()
    }

    pub fn release(self) {
        let Self {
            vertex_buffer,
            index_buffer,
            constants,
            bind_group,
            ..
        } = self;
        drop(bind_group);
        constants.destroy();
        if let Some(index_buffer) = index_buffer {
            index_buffer.destroy();
        }
        vertex_buffer.destroy();
        log::debug!("released cube geometry buffers");
    }
}
