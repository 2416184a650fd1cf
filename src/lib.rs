//! Surface Cube
//!
//! Renders an animated 3-D cube into a GPU surface owned by a host compositor.
//! The host creates a [`RenderSession`], initializes it with a
//! [`SharedSurfaceOpener`] that resolves its surface handles, and calls
//! [`RenderSession::render`] once per frame, flagging when it has handed over a
//! new surface (after a resize, for example).
//!
//! ```no_run
//! use surface_cube::{EngineConfig, RenderSession, SharedSurfaceRegistry};
//!
//! # fn main() -> surface_cube::Result<()> {
//! let registry = SharedSurfaceRegistry::new();
//! let mut session = RenderSession::new(EngineConfig::default());
//! session.initialize(registry.clone())?;
//!
//! let device = session.device().expect("initialized");
//! let surface = registry.allocate(device, 800, 600);
//! session.render(surface, true)?;
//! session.render(surface, false)?;
//! session.shutdown();
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod gfx;
pub mod logging;
pub mod session;
pub mod wgpu_utils;

pub use config::{EngineConfig, EngineVariant};
pub use error::{RenderError, Result};
pub use gfx::device::{DriverTier, FeatureLevel};
pub use gfx::rendering::{FrameSnapshot, RenderEngine};
pub use gfx::resources::{SharedSurfaceHandle, SharedSurfaceOpener, SharedSurfaceRegistry};
pub use logging::{init_logging, LoggingConfig};
pub use session::RenderSession;
