//! Error Types
//!
//! Every fallible operation in the crate returns [`Result<T>`], an alias for
//! `std::result::Result<T, RenderError>`.
//!
//! Errors are surfaced synchronously to the immediate caller. The only failures
//! that are swallowed are the individual driver-tier attempts made while
//! negotiating a device, and those only until every tier has been exhausted.

use thiserror::Error;

use crate::gfx::resources::shared_surface::SharedSurfaceHandle;

/// The error type for device setup, surface binding and frame rendering.
#[derive(Error, Debug)]
pub enum RenderError {
    // ========================================================================
    // Setup
    // ========================================================================
    /// No driver tier / feature level combination produced a device.
    #[error(
        "no driver tier produced a usable device ({} attempts): {}",
        .attempts.len(),
        .attempts.join("; ")
    )]
    CapabilityExhausted {
        /// One entry per failed tier/level attempt, in search order.
        attempts: Vec<String>,
    },

    /// A shader program or the pipeline built from it failed validation.
    #[error("shader '{label}' failed to build: {message}")]
    ShaderBuild { label: String, message: String },

    // ========================================================================
    // Surface binding
    // ========================================================================
    /// The host supplied a handle that cannot be opened as a render target.
    #[error("shared surface {handle} cannot be used as a render target: {reason}")]
    InvalidSurface {
        handle: SharedSurfaceHandle,
        reason: String,
    },

    /// The shared texture does not have the format the pipeline renders to.
    #[error("shared surface format {found:?} does not match the pipeline format {expected:?}")]
    SurfaceFormatMismatch {
        expected: wgpu::TextureFormat,
        found: wgpu::TextureFormat,
    },

    /// A frame was requested before any surface was bound.
    #[error("render requested before a shared surface was bound")]
    NoSurfaceBound,

    // ========================================================================
    // Session state
    // ========================================================================
    #[error("render session is not initialized")]
    NotInitialized,

    #[error("render session is already initialized")]
    AlreadyInitialized,

    /// A camera control was invoked on an engine with a fixed camera.
    #[error("engine does not support camera control '{0}'")]
    UnsupportedControl(&'static str),

    // ========================================================================
    // Frame execution
    // ========================================================================
    /// A validation or out-of-memory error captured while encoding a frame.
    #[error("GPU error: {0}")]
    Gpu(String),
}

impl RenderError {
    /// Status code reported across the host boundary. `0` is reserved for success.
    pub fn status_code(&self) -> i32 {
        match self {
            RenderError::CapabilityExhausted { .. } => 1,
            RenderError::ShaderBuild { .. } => 2,
            RenderError::InvalidSurface { .. } => 3,
            RenderError::SurfaceFormatMismatch { .. } => 4,
            RenderError::NoSurfaceBound => 5,
            RenderError::NotInitialized => 6,
            RenderError::AlreadyInitialized => 7,
            RenderError::UnsupportedControl(_) => 8,
            RenderError::Gpu(_) => 9,
        }
    }
}

impl From<wgpu::Error> for RenderError {
    fn from(err: wgpu::Error) -> Self {
        RenderError::Gpu(err.to_string())
    }
}

/// Alias for `Result<T, RenderError>`.
pub type Result<T> = std::result::Result<T, RenderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes_are_distinct_and_nonzero() {
        let errors = [
            RenderError::CapabilityExhausted { attempts: vec![] },
            RenderError::ShaderBuild {
                label: "vs".into(),
                message: "boom".into(),
            },
            RenderError::InvalidSurface {
                handle: SharedSurfaceHandle::from_raw(3),
                reason: "unknown".into(),
            },
            RenderError::SurfaceFormatMismatch {
                expected: wgpu::TextureFormat::Bgra8Unorm,
                found: wgpu::TextureFormat::Rgba8Unorm,
            },
            RenderError::NoSurfaceBound,
            RenderError::NotInitialized,
            RenderError::AlreadyInitialized,
            RenderError::UnsupportedControl("radius"),
            RenderError::Gpu("lost".into()),
        ];

        let mut codes: Vec<i32> = errors.iter().map(RenderError::status_code).collect();
        assert!(codes.iter().all(|&c| c != 0));
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn test_capability_message_lists_attempts() {
        let err = RenderError::CapabilityExhausted {
            attempts: vec![
                "hardware/11_0: no adapter".into(),
                "warp/11_0: no adapter".into(),
            ],
        };
        let message = err.to_string();
        assert!(message.contains("2 attempts"));
        assert!(message.contains("warp/11_0: no adapter"));
    }
}
