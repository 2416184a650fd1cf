//! Minimal host: renders a few frames, drives the camera, resizes, shuts down.
//!
//! ```sh
//! cargo run --example host_loop
//! SURFACE_CUBE_VARIANT=mini SURFACE_CUBE_TIER=warp cargo run --example host_loop
//! ```

use std::time::Duration;

use anyhow::Context;
use surface_cube::{
    init_logging, EngineConfig, LoggingConfig, RenderSession, SharedSurfaceRegistry,
};

const FRAMES_PER_SIZE: u32 = 30;
const FRAME_INTERVAL: Duration = Duration::from_millis(16);

fn main() -> anyhow::Result<()> {
    init_logging(LoggingConfig::default());

    let config = EngineConfig::from_env();
    let registry = SharedSurfaceRegistry::new();
    let mut session = RenderSession::new(config);
    session
        .initialize(registry.clone())
        .context("failed to initialize render session")?;

    if let Some(engine) = session.engine() {
        let info = engine.gpu().adapter_info();
        log::info!(
            "rendering {:?} on '{}' via {} tier, feature level {}",
            engine.variant(),
            info.name,
            engine.gpu().tier(),
            engine.gpu().feature_level()
        );
    }

    let orbit = session.engine().is_some_and(|e| e.camera().is_some());
    if orbit {
        session.set_camera_radius(5.0)?;
    }

    let mut previous = None;
    for (width, height) in [(800, 600), (1280, 720)] {
        let device = session.device().context("session lost its device")?;
        let surface = registry.allocate(device, width, height);

        for frame in 0..FRAMES_PER_SIZE {
            if orbit {
                session.set_camera_theta(frame as f32 * 0.05)?;
                session.set_camera_phi(0.25)?;
            }
            session
                .render(surface, frame == 0)
                .with_context(|| format!("frame {} at {}x{} failed", frame, width, height))?;
            std::thread::sleep(FRAME_INTERVAL);
        }

        if let Some(snapshot) = session.last_frame() {
            log::info!(
                "{}x{}: {} frames, {:.2}s elapsed",
                width,
                height,
                snapshot.index + 1,
                snapshot.elapsed
            );
        }

        // The compositor drops the old surface once the new one is handed over.
        if let Some(old) = previous.replace(surface) {
            registry.release(old);
        }
    }

    session.shutdown();
    Ok(())
}
