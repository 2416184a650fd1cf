//! GPU device negotiation and ownership.

pub mod capability;
pub mod graphics_device;

pub use capability::{select_capability, CapabilitySelection, DriverTier, FeatureLevel};
pub use graphics_device::GraphicsDevice;
