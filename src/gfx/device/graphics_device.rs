//! GPU device ownership.
//!
//! [`GraphicsDevice`] negotiates an adapter and device once, at session
//! initialization, and owns them until shutdown. There is no hot-swapping: the
//! selected tier and feature level never change afterwards.

use crate::config::EngineConfig;
use crate::error::{RenderError, Result};

use super::capability::{select_capability, DriverTier, FeatureLevel};

/// Owns the wgpu instance, adapter, device and queue for a render session.
pub struct GraphicsDevice {
    device: wgpu::Device,
    queue: wgpu::Queue,
    adapter: wgpu::Adapter,
    instance: wgpu::Instance,
    tier: DriverTier,
    feature_level: FeatureLevel,
}

impl GraphicsDevice {
    /// Negotiates a device using the tiers and levels listed in `config`.
    ///
    /// Individual failures are swallowed while other combinations remain;
    /// returns [`RenderError::CapabilityExhausted`] when none succeed.
    pub fn initialize(config: &EngineConfig) -> Result<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: config.backends,
            ..Default::default()
        });

        let selection = select_capability(
            &config.driver_tiers,
            &config.feature_levels,
            |tier, level| Self::try_create(&instance, config.backends, tier, level),
        )?;

        let (adapter, device, queue) = selection.value;
        let info = adapter.get_info();
        log::info!(
            "created {} device on '{}' ({:?}, {:?}) at feature level {} after {} failed attempts",
            selection.tier,
            info.name,
            info.backend,
            info.device_type,
            selection.level,
            selection.failed_attempts.len()
        );

        device.on_uncaptured_error(Box::new(|error| {
            log::error!("uncaptured wgpu error: {}", error);
        }));

        Ok(Self {
            device,
            queue,
            adapter,
            instance,
            tier: selection.tier,
            feature_level: selection.level,
        })
    }

    fn try_create(
        instance: &wgpu::Instance,
        backends: wgpu::Backends,
        tier: DriverTier,
        level: FeatureLevel,
    ) -> std::result::Result<(wgpu::Adapter, wgpu::Device, wgpu::Queue), String> {
        let adapter = match tier {
            DriverTier::Hardware => {
                let adapter = pollster::block_on(instance.request_adapter(
                    &wgpu::RequestAdapterOptions {
                        power_preference: wgpu::PowerPreference::HighPerformance,
                        compatible_surface: None,
                        force_fallback_adapter: false,
                    },
                ))
                .map_err(|e| e.to_string())?;

                let info = adapter.get_info();
                if info.device_type == wgpu::DeviceType::Cpu {
                    return Err(format!("adapter '{}' is a software rasterizer", info.name));
                }
                adapter
            }
            DriverTier::Warp => pollster::block_on(instance.request_adapter(
                &wgpu::RequestAdapterOptions {
                    power_preference: wgpu::PowerPreference::None,
                    compatible_surface: None,
                    force_fallback_adapter: true,
                },
            ))
            .map_err(|e| e.to_string())?,
            DriverTier::Reference => {
                let mut adapters = instance.enumerate_adapters(backends);
                let cpu = adapters
                    .iter()
                    .position(|a| a.get_info().device_type == wgpu::DeviceType::Cpu);
                match cpu {
                    Some(index) => adapters.swap_remove(index),
                    None => adapters
                        .into_iter()
                        .next()
                        .ok_or_else(|| "no adapters enumerated".to_string())?,
                }
            }
        };

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("Surface Cube Device"),
            required_features: wgpu::Features::empty(),
            required_limits: level.limits(),
            memory_hints: wgpu::MemoryHints::Performance,
            trace: wgpu::Trace::Off,
        }))
        .map_err(|e| e.to_string())?;

        Ok((adapter, device, queue))
    }

    /// Runs `f` inside a validation error scope and returns the first error it raised.
    pub fn capture_errors<T>(&self, f: impl FnOnce() -> T) -> (T, Option<wgpu::Error>) {
        self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let value = f();
        let error = pollster::block_on(self.device.pop_error_scope());
        (value, error)
    }

    /// Submits recorded work and optionally blocks until the queue is idle.
    pub fn flush(&self, command_buffer: wgpu::CommandBuffer, wait: bool) -> Result<()> {
        self.queue.submit(std::iter::once(command_buffer));
        if wait {
            self.wait_idle()?;
        }
        Ok(())
    }

    /// Blocks until every submitted command buffer has completed.
    pub fn wait_idle(&self) -> Result<()> {
        self.device
            .poll(wgpu::PollType::Wait)
            .map(|_| ())
            .map_err(|e| RenderError::Gpu(e.to_string()))
    }

    /// Waits for outstanding work, then destroys the device.
    pub fn release(self) {
        let Self {
            device,
            queue,
            adapter,
            instance,
            tier,
            ..
        } = self;

        if let Err(e) = device.poll(wgpu::PollType::Wait) {
            log::warn!("queue did not drain before device release: {}", e);
        }
        drop(queue);
        device.destroy();
        drop(device);
        drop(adapter);
        drop(instance);
        log::debug!("released {} device", tier);
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn adapter_info(&self) -> wgpu::AdapterInfo {
        self.adapter.get_info()
    }

    pub fn tier(&self) -> DriverTier {
        self.tier
    }

    pub fn feature_level(&self) -> FeatureLevel {
        self.feature_level
    }
}
