//! Host-facing render session.
//!
//! A [`RenderSession`] replaces process-wide renderer state: the host creates
//! one, initializes it once, renders frames into shared surfaces, and shuts it
//! down. Dropping an initialized session shuts it down as well.

use crate::config::EngineConfig;
use crate::error::{RenderError, Result};
use crate::gfx::camera::OrbitCamera;
use crate::gfx::rendering::{create_engine, FrameSnapshot, RenderEngine};
use crate::gfx::resources::{SharedSurfaceHandle, SharedSurfaceOpener};

pub struct RenderSession {
    config: EngineConfig,
    engine: Option<Box<dyn RenderEngine>>,
}

impl RenderSession {
    /// Creates an uninitialized session.
    ///
    /// No GPU work happens until [`initialize`](Self::initialize).
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            engine: None,
        }
    }

    /// Negotiates the device and builds the configured engine.
    ///
    /// `opener` resolves the handles later passed to [`render`](Self::render).
    /// On error the session stays uninitialized and may be initialized again.
    pub fn initialize(&mut self, opener: impl SharedSurfaceOpener + 'static) -> Result<()> {
        if self.engine.is_some() {
            return Err(RenderError::AlreadyInitialized);
        }

        log::info!("initializing {:?} render session", self.config.variant);
        let engine = create_engine(&self.config, Box::new(opener))?;
        self.engine = Some(engine);
        Ok(())
    }

    /// Renders one frame. Pass `is_new_surface` whenever the host hands over a
    /// different surface, including the first frame.
    pub fn render(&mut self, handle: SharedSurfaceHandle, is_new_surface: bool) -> Result<()> {
        self.engine_mut()?.render(handle, is_new_surface)?;
        Ok(())
    }

    /// [`render`](Self::render) reduced to a status code: `0` on success,
    /// otherwise [`RenderError::status_code`].
    pub fn render_status(&mut self, handle: SharedSurfaceHandle, is_new_surface: bool) -> i32 {
        match self.render(handle, is_new_surface) {
            Ok(()) => 0,
            Err(e) => {
                log::error!("render failed: {}", e);
                e.status_code()
            }
        }
    }

    pub fn set_camera_radius(&mut self, radius: f32) -> Result<()> {
        self.with_camera("radius", |camera| camera.set_radius(radius))
    }

    pub fn set_camera_theta(&mut self, theta: f32) -> Result<()> {
        self.with_camera("theta", |camera| camera.set_theta(theta))
    }

    pub fn set_camera_phi(&mut self, phi: f32) -> Result<()> {
        self.with_camera("phi", |camera| camera.set_phi(phi))
    }

    fn with_camera(
        &mut self,
        control: &'static str,
        f: impl FnOnce(&mut OrbitCamera),
    ) -> Result<()> {
        let camera = self
            .engine_mut()?
            .camera_mut()
            .ok_or(RenderError::UnsupportedControl(control))?;
        f(camera);
        Ok(())
    }

    /// Releases every GPU resource. Consuming `self` rules out a second shutdown.
    pub fn shutdown(mut self) {
        self.teardown();
    }

    fn teardown(&mut self) {
        if let Some(engine) = self.engine.take() {
            engine.shutdown();
            log::info!("render session shut down");
        }
    }

    pub fn is_ready(&self) -> bool {
        self.engine.is_some()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn engine(&self) -> Option<&dyn RenderEngine> {
        self.engine.as_deref()
    }

    pub fn engine_mut(&mut self) -> Result<&mut (dyn RenderEngine + 'static)> {
        self.engine
            .as_deref_mut()
            .ok_or(RenderError::NotInitialized)
    }

    /// The session's device, for allocating shared surfaces the engine can open.
    pub fn device(&self) -> Option<&wgpu::Device> {
        self.engine().map(|engine| engine.gpu().device())
    }

    pub fn last_frame(&self) -> Option<&FrameSnapshot> {
        self.engine().and_then(|engine| engine.last_frame())
    }
}

impl Drop for RenderSession {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::resources::SharedSurfaceRegistry;

    #[test]
    fn test_uninitialized_session_rejects_calls() {
        let mut session = RenderSession::new(EngineConfig::default());
        let handle = SharedSurfaceHandle::from_raw(1);

        assert!(!session.is_ready());
        assert!(session.device().is_none());
        assert!(session.last_frame().is_none());
        assert!(matches!(
            session.render(handle, true),
            Err(RenderError::NotInitialized)
        ));
        assert_eq!(
            session.render_status(handle, true),
            RenderError::NotInitialized.status_code()
        );
        assert!(matches!(
            session.set_camera_radius(2.0),
            Err(RenderError::NotInitialized)
        ));
        assert!(matches!(
            session.set_camera_theta(0.1),
            Err(RenderError::NotInitialized)
        ));
        assert!(matches!(
            session.set_camera_phi(0.1),
            Err(RenderError::NotInitialized)
        ));
    }

    #[test]
    fn test_shutdown_without_initialize() {
        let session = RenderSession::new(EngineConfig::default());
        session.shutdown();
    }

    #[test]
    fn test_failed_initialize_leaves_session_uninitialized() {
        // An empty tier list can never produce a device.
        let config = EngineConfig::default().with_driver_tiers(Vec::new());
        let mut session = RenderSession::new(config);

        let result = session.initialize(SharedSurfaceRegistry::new());
        assert!(matches!(
            result,
            Err(RenderError::CapabilityExhausted { .. })
        ));
        assert!(!session.is_ready());
    }
}
