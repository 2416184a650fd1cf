//! Engine-owned textures.
//!
//! The color target belongs to the host; the depth-stencil buffer behind it is
//! the only texture the engine allocates and therefore the only one it destroys.

/// Depth-stencil buffer sized to the bound surface.
pub struct DepthTarget {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
}

impl DepthTarget {
    /// Standard depth-stencil format used by both engine variants.
    pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth24PlusStencil8;

    pub fn create(
        device: &wgpu::Device,
        width: u32,
        height: u32,
        format: wgpu::TextureFormat,
    ) -> Self {
        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Depth Stencil Target"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        Self { texture, view }
    }

    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        self.texture.format()
    }

    pub fn size(&self) -> (u32, u32) {
        (self.texture.width(), self.texture.height())
    }

    /// Attachment that clears depth to 1.0 (and stencil to 0 when present).
    pub fn attachment(&self) -> wgpu::RenderPassDepthStencilAttachment<'_> {
        let has_stencil = self.format().has_stencil_aspect();
        let stencil_ops = has_stencil.then_some(wgpu::Operations {
            load: wgpu::LoadOp::Clear(0),
            store: wgpu::StoreOp::Store,
        });

        wgpu::RenderPassDepthStencilAttachment {
            view: &self.view,
            depth_ops: Some(wgpu::Operations {
                load: wgpu::LoadOp::Clear(1.0),
                store: wgpu::StoreOp::Store,
            }),
            stencil_ops,
        }
    }

    pub fn destroy(self) {
        let Self { texture, view } = self;
        drop(view);
        texture.destroy();
    }
}
