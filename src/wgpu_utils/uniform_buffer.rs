// src/wgpu_utils/uniform_buffer.rs
use std::marker::PhantomData;

/// Typed uniform buffer that is always rewritten in full.
///
/// Every [`write`](Self::write) uploads the whole `Content` at offset 0, even
/// when the bytes are unchanged since the previous frame.
pub struct UniformBuffer<Content> {
    buffer: wgpu::Buffer,
    content_type: PhantomData<Content>,
    writes: u64,
}

impl<Content: bytemuck::Pod> UniformBuffer<Content> {
    fn name() -> &'static str {
        let type_name = std::any::type_name::<Content>();
        let pos = type_name.rfind(':').unwrap_or(0);
        if pos > 0 {
            &type_name[(pos + 1)..]
        } else {
            type_name
        }
    }

    /// Create a zero-initialized uniform buffer sized to `Content`.
    pub fn new(device: &wgpu::Device) -> Self {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(&format!("UniformBuffer: {}", Self::name())),
            size: Self::content_size(),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        UniformBuffer {
            buffer,
            content_type: PhantomData,
            writes: 0,
        }
    }

    /// Overwrite the entire buffer with `content`.
    pub fn write(&mut self, queue: &wgpu::Queue, content: &Content) {
        queue.write_buffer(&self.buffer, 0, bytemuck::bytes_of(content));
        self.writes += 1;
    }

    /// Size of one `Content` payload in bytes.
    pub fn content_size() -> wgpu::BufferAddress {
        std::mem::size_of::<Content>() as wgpu::BufferAddress
    }

    /// Number of full writes issued so far.
    pub fn write_count(&self) -> u64 {
        self.writes
    }

    /// Get binding resource
    pub fn binding_resource(&self) -> wgpu::BindingResource<'_> {
        self.buffer.as_entire_binding()
    }

    /// Free the GPU allocation. The buffer must not be used afterwards.
    pub fn destroy(self) {
        self.buffer.destroy();
    }
}
