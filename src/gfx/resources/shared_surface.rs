//! Shared surface handles and the adapter that opens them.
//!
//! The host owns the color surface the engine renders into. It passes an opaque
//! [`SharedSurfaceHandle`] across the boundary, and a [`SharedSurfaceOpener`]
//! turns that handle into a texture on the engine's device. The engine never
//! destroys an opened texture; it only drops its reference.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use crate::error::{RenderError, Result};

/// Usage a shared surface must carry to be rendered into.
pub const REQUIRED_SURFACE_USAGE: wgpu::TextureUsages = wgpu::TextureUsages::RENDER_ATTACHMENT;

/// Opaque identifier for a host-owned surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SharedSurfaceHandle(u64);

impl SharedSurfaceHandle {
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SharedSurfaceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// Resolves a shared handle into a texture usable on `device`.
///
/// Implementations backed by a real interop API import the external resource
/// here. Errors should be [`RenderError::InvalidSurface`].
pub trait SharedSurfaceOpener {
    fn open(&self, device: &wgpu::Device, handle: SharedSurfaceHandle) -> Result<wgpu::Texture>;
}

impl<T: SharedSurfaceOpener + ?Sized> SharedSurfaceOpener for &T {
    fn open(&self, device: &wgpu::Device, handle: SharedSurfaceHandle) -> Result<wgpu::Texture> {
        (**self).open(device, handle)
    }
}

impl<T: SharedSurfaceOpener + ?Sized> SharedSurfaceOpener for Arc<T> {
    fn open(&self, device: &wgpu::Device, handle: SharedSurfaceHandle) -> Result<wgpu::Texture> {
        (**self).open(device, handle)
    }
}

#[derive(Default)]
struct RegistryState {
    next_id: u64,
    surfaces: HashMap<SharedSurfaceHandle, wgpu::Texture>,
}

impl RegistryState {
    fn insert(&mut self, texture: wgpu::Texture) -> SharedSurfaceHandle {
        // Zero is never handed out so hosts can use it as "no surface".
        self.next_id += 1;
        let handle = SharedSurfaceHandle(self.next_id);
        self.surfaces.insert(handle, texture);
        handle
    }
}

/// In-process host side of the shared surface boundary.
///
/// Plays the role of the compositor: it allocates textures, hands out handles,
/// and resolves them again when the engine opens one. Cloning shares the same
/// table. Handles are never reused, so a released handle stays invalid.
#[derive(Clone, Default)]
pub struct SharedSurfaceRegistry {
    state: Arc<Mutex<RegistryState>>,
}

impl SharedSurfaceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates a `width` x `height` Bgra8Unorm surface on `device`.
    pub fn allocate(&self, device: &wgpu::Device, width: u32, height: u32) -> SharedSurfaceHandle {
        self.allocate_with_format(device, width, height, wgpu::TextureFormat::Bgra8Unorm)
    }

    pub fn allocate_with_format(
        &self,
        device: &wgpu::Device,
        width: u32,
        height: u32,
        format: wgpu::TextureFormat,
    ) -> SharedSurfaceHandle {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Shared Surface"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT
                | wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });

        let handle = self.register(texture);
        log::debug!(
            "allocated shared surface {} ({}x{}, {:?})",
            handle,
            width,
            height,
            format
        );
        handle
    }

    /// Publishes a texture the host created itself.
    pub fn register(&self, texture: wgpu::Texture) -> SharedSurfaceHandle {
        self.lock().insert(texture)
    }

    /// Host-side access to a published surface, e.g. for compositing or readback.
    pub fn texture(&self, handle: SharedSurfaceHandle) -> Option<wgpu::Texture> {
        self.lock().surfaces.get(&handle).cloned()
    }

    /// Withdraws a surface. Returns `false` if the handle was not published.
    ///
    /// Only the registry's reference is dropped; an engine still bound to the
    /// surface keeps it alive until it rebinds or shuts down.
    pub fn release(&self, handle: SharedSurfaceHandle) -> bool {
        let removed = self.lock().surfaces.remove(&handle).is_some();
        if removed {
            log::debug!("released shared surface {}", handle);
        }
        removed
    }

    pub fn contains(&self, handle: SharedSurfaceHandle) -> bool {
        self.lock().surfaces.contains_key(&handle)
    }

    pub fn len(&self) -> usize {
        self.lock().surfaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, RegistryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SharedSurfaceOpener for SharedSurfaceRegistry {
    fn open(&self, _device: &wgpu::Device, handle: SharedSurfaceHandle) -> Result<wgpu::Texture> {
        self.texture(handle).ok_or_else(|| RenderError::InvalidSurface {
            handle,
            reason: "handle is not published by the host".to_string(),
        })
    }
}

/// Checks that an opened texture can serve as the color target.
pub fn validate_surface(
    handle: SharedSurfaceHandle,
    texture: &wgpu::Texture,
    color_format: wgpu::TextureFormat,
) -> Result<()> {
    if texture.dimension() != wgpu::TextureDimension::D2 {
        return Err(RenderError::InvalidSurface {
            handle,
            reason: format!("expected a 2D texture, got {:?}", texture.dimension()),
        });
    }
    if !texture.usage().contains(REQUIRED_SURFACE_USAGE) {
        return Err(RenderError::InvalidSurface {
            handle,
            reason: format!(
                "texture usage {:?} lacks RENDER_ATTACHMENT",
                texture.usage()
            ),
        });
    }
    if texture.sample_count() != 1 {
        return Err(RenderError::InvalidSurface {
            handle,
            reason: format!(
                "multisampled surfaces are not supported ({}x)",
                texture.sample_count()
            ),
        });
    }
    if texture.format() != color_format {
        return Err(RenderError::SurfaceFormatMismatch {
            expected: color_format,
            found: texture.format(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_display_and_raw() {
        let handle = SharedSurfaceHandle::from_raw(0x2a);
        assert_eq!(handle.raw(), 42);
        assert_eq!(handle.to_string(), "0x2a");
    }

    #[test]
    fn test_empty_registry_rejects_handles() {
        let registry = SharedSurfaceRegistry::new();
        let handle = SharedSurfaceHandle::from_raw(1);
        assert!(registry.is_empty());
        assert!(!registry.contains(handle));
        assert!(registry.texture(handle).is_none());
        assert!(!registry.release(handle));
    }

    #[test]
    fn test_clones_share_the_table() {
        let registry = SharedSurfaceRegistry::new();
        let other = registry.clone();
        assert!(Arc::ptr_eq(&registry.state, &other.state));
    }
}
