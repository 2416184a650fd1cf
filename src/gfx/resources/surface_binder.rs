//! Render target binding for host-owned surfaces.
//!
//! The host may hand over a new surface at any frame, typically after a resize.
//! [`SurfaceBinder`] drops the previous target, opens the new one through the
//! [`SharedSurfaceOpener`], and recomputes viewport and projection when the
//! dimensions changed. Viewport and projection live in [`ViewportState`], which
//! never touches the GPU.

use cgmath::{Matrix4, SquareMatrix};

use crate::error::{RenderError, Result};
use crate::gfx::camera::ProjectionParams;

use super::shared_surface::{validate_surface, SharedSurfaceHandle, SharedSurfaceOpener};
use super::texture_resource::DepthTarget;

/// Rasterizer viewport in pixels with a depth range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub min_depth: f32,
    pub max_depth: f32,
}

impl Viewport {
    pub const EMPTY: Viewport = Viewport {
        x: 0.0,
        y: 0.0,
        width: 0.0,
        height: 0.0,
        min_depth: 0.0,
        max_depth: 1.0,
    };

    /// Covers the whole `width` x `height` target.
    pub fn full(width: u32, height: u32) -> Self {
        Self {
            width: width as f32,
            height: height as f32,
            ..Self::EMPTY
        }
    }

    pub fn apply(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_viewport(
            self.x,
            self.y,
            self.width,
            self.height,
            self.min_depth,
            self.max_depth,
        );
    }
}

/// Recorded surface dimensions with the viewport and projection derived from them.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewportState {
    params: ProjectionParams,
    extent: (u32, u32),
    viewport: Viewport,
    projection: Matrix4<f32>,
}

impl ViewportState {
    /// No dimensions recorded yet: empty viewport, identity projection.
    pub fn new(params: ProjectionParams) -> Self {
        Self {
            params,
            extent: (0, 0),
            viewport: Viewport::EMPTY,
            projection: Matrix4::identity(),
        }
    }

    /// Records `width` x `height`. Returns `true` if the dimensions changed, in
    /// which case the viewport and projection were recomputed.
    pub fn apply_extent(&mut self, width: u32, height: u32) -> bool {
        if self.extent == (width, height) {
            return false;
        }
        self.extent = (width, height);
        self.viewport = Viewport::full(width, height);
        self.projection = self.params.matrix(width, height);
        true
    }

    pub fn extent(&self) -> (u32, u32) {
        self.extent
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn projection(&self) -> Matrix4<f32> {
        self.projection
    }

    pub fn params(&self) -> ProjectionParams {
        self.params
    }
}

/// Outcome of a [`SurfaceBinder::bind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceChange {
    pub handle: SharedSurfaceHandle,
    pub width: u32,
    pub height: u32,
    /// Dimensions differ from the previous surface; projection was rebuilt.
    pub resized: bool,
    pub generation: u64,
}

/// Views onto the currently bound surface.
pub struct BoundTarget {
    handle: SharedSurfaceHandle,
    // Keeps the host texture alive while the view is in use. Never destroyed here.
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    depth: Option<DepthTarget>,
}

impl BoundTarget {
    pub fn handle(&self) -> SharedSurfaceHandle {
        self.handle
    }

    pub fn texture(&self) -> &wgpu::Texture {
        &self.texture
    }

    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    pub fn depth(&self) -> Option<&DepthTarget> {
        self.depth.as_ref()
    }

    fn release(self) {
        let Self {
            handle,
            texture,
            view,
            depth,
        } = self;
        if let Some(depth) = depth {
            depth.destroy();
        }
        drop(view);
        drop(texture);
        log::debug!("dropped render target for surface {}", handle);
    }
}

/// Owns the render target view over the host surface and the depth buffer behind it.
pub struct SurfaceBinder {
    color_format: wgpu::TextureFormat,
    depth_format: Option<wgpu::TextureFormat>,
    state: ViewportState,
    target: Option<BoundTarget>,
    generation: u64,
}

impl SurfaceBinder {
    pub fn new(
        params: ProjectionParams,
        color_format: wgpu::TextureFormat,
        depth_format: Option<wgpu::TextureFormat>,
    ) -> Self {
        Self {
            color_format,
            depth_format,
            state: ViewportState::new(params),
            target: None,
            generation: 0,
        }
    }

    /// Rebinds to the surface behind `handle`.
    ///
    /// The previous target is dropped first, so after a failure no surface is
    /// bound and rendering reports [`RenderError::NoSurfaceBound`] until the
    /// next successful bind. Recorded dimensions and projection are only
    /// touched on success.
    pub fn bind(
        &mut self,
        device: &wgpu::Device,
        opener: &dyn SharedSurfaceOpener,
        handle: SharedSurfaceHandle,
    ) -> Result<SurfaceChange> {
        self.reset_targets();

        let texture = opener.open(device, handle)?;
        validate_surface(handle, &texture, self.color_format)?;

        let view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some("Shared Surface View"),
            format: Some(self.color_format),
            dimension: Some(wgpu::TextureViewDimension::D2),
            ..Default::default()
        });

        let (width, height) = (texture.width(), texture.height());
        let depth = self
            .depth_format
            .map(|format| DepthTarget::create(device, width, height, format));
        let resized = self.state.apply_extent(width, height);

        self.target = Some(BoundTarget {
            handle,
            texture,
            view,
            depth,
        });
        self.generation += 1;

        if resized {
            log::info!(
                "bound surface {} at {}x{} (projection rebuilt)",
                handle,
                width,
                height
            );
        } else {
            log::info!("bound surface {} at {}x{}", handle, width, height);
        }

        Ok(SurfaceChange {
            handle,
            width,
            height,
            resized,
            generation: self.generation,
        })
    }

    /// Drops the current view and depth buffer. Does nothing when unbound.
    pub fn reset_targets(&mut self) {
        if let Some(target) = self.target.take() {
            target.release();
        }
    }

    /// The bound target, or [`RenderError::NoSurfaceBound`].
    pub fn target(&self) -> Result<&BoundTarget> {
        self.target.as_ref().ok_or(RenderError::NoSurfaceBound)
    }

    pub fn is_bound(&self) -> bool {
        self.target.is_some()
    }

    pub fn projection(&self) -> Matrix4<f32> {
        self.state.projection()
    }

    pub fn viewport(&self) -> Viewport {
        self.state.viewport()
    }

    pub fn viewport_state(&self) -> &ViewportState {
        &self.state
    }

    /// Number of successful binds so far.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn color_format(&self) -> wgpu::TextureFormat {
        self.color_format
    }

    pub fn depth_format(&self) -> Option<wgpu::TextureFormat> {
        self.depth_format
    }

    pub fn release(mut self) {
        self.reset_targets();
    }
}
