//! Engine configuration
//!
//! [`EngineConfig`] selects the engine variant and controls device negotiation
//! and render target setup. Built with `Default` plus `with_*` builder methods,
//! optionally overlaid with environment variables via [`EngineConfig::from_env`].

use crate::gfx::device::{DriverTier, FeatureLevel};

/// Environment variable selecting the engine variant (`orbit` or `mini`).
pub const VARIANT_ENV: &str = "SURFACE_CUBE_VARIANT";
/// Environment variable restricting device negotiation to a single tier.
pub const TIER_ENV: &str = "SURFACE_CUBE_TIER";

/// Which of the two cube engines a session drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EngineVariant {
    /// Indexed 8-vertex cube, orbit camera, separate world/view/projection uniforms.
    #[default]
    Orbit,
    /// Non-indexed 36-vertex cube, fixed camera, one combined matrix uniform.
    Mini,
}

impl EngineVariant {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "orbit" | "cube" => Some(EngineVariant::Orbit),
            "mini" | "minicube" => Some(EngineVariant::Mini),
            _ => None,
        }
    }
}

/// Configuration for a [`RenderSession`](crate::RenderSession).
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub variant: EngineVariant,
    /// Driver tiers tried in order during device negotiation.
    pub driver_tiers: Vec<DriverTier>,
    /// Feature levels tried highest first within each tier.
    pub feature_levels: Vec<FeatureLevel>,
    pub backends: wgpu::Backends,
    /// Format of the shared surfaces the host hands over.
    pub color_format: wgpu::TextureFormat,
    pub depth_buffer: bool,
    /// Background color; `None` uses the variant's default.
    pub clear_color: Option<wgpu::Color>,
    /// Block in `render` until the GPU has finished the frame.
    pub wait_for_gpu: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            variant: EngineVariant::Orbit,
            driver_tiers: DriverTier::ALL.to_vec(),
            feature_levels: FeatureLevel::ALL.to_vec(),
            backends: wgpu::Backends::all(),
            color_format: wgpu::TextureFormat::Bgra8Unorm,
            depth_buffer: true,
            clear_color: None,
            wait_for_gpu: true,
        }
    }
}

impl EngineConfig {
    /// Default configuration overlaid with [`VARIANT_ENV`] and [`TIER_ENV`].
    ///
    /// Unrecognized values are logged and ignored.
    pub fn from_env() -> Self {
        let variant = std::env::var(VARIANT_ENV).ok();
        let tier = std::env::var(TIER_ENV).ok();
        Self::default()
            .with_overrides(variant.as_deref(), tier.as_deref())
    }

    fn with_overrides(mut self, variant: Option<&str>, tier: Option<&str>) -> Self {
        if let Some(value) = variant {
            match EngineVariant::parse(value) {
                Some(variant) => self.variant = variant,
                None => log::warn!(
                    "ignoring {}={:?}: expected orbit or mini",
                    VARIANT_ENV,
                    value
                ),
            }
        }
        if let Some(value) = tier {
            match DriverTier::parse(value) {
                Some(tier) => self.driver_tiers = vec![tier],
                None => log::warn!(
                    "ignoring {}={:?}: expected hardware, warp or reference",
                    TIER_ENV,
                    value
                ),
            }
        }
        self
    }

    pub fn with_variant(mut self, variant: EngineVariant) -> Self {
        self.variant = variant;
        self
    }

    pub fn with_driver_tiers(mut self, tiers: Vec<DriverTier>) -> Self {
        self.driver_tiers = tiers;
        self
    }

    pub fn with_feature_levels(mut self, levels: Vec<FeatureLevel>) -> Self {
        self.feature_levels = levels;
        self
    }

    pub fn with_backends(mut self, backends: wgpu::Backends) -> Self {
        self.backends = backends;
        self
    }

    pub fn with_color_format(mut self, format: wgpu::TextureFormat) -> Self {
        self.color_format = format;
        self
    }

    pub fn with_depth_buffer(mut self, enabled: bool) -> Self {
        self.depth_buffer = enabled;
        self
    }

    pub fn with_clear_color(mut self, color: wgpu::Color) -> Self {
        self.clear_color = Some(color);
        self
    }

    pub fn with_wait_for_gpu(mut self, wait: bool) -> Self {
        self.wait_for_gpu = wait;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_searches_every_tier_highest_level_first() {
        let config = EngineConfig::default();
        assert_eq!(
            config.driver_tiers,
            vec![DriverTier::Hardware, DriverTier::Warp, DriverTier::Reference]
        );
        assert_eq!(config.feature_levels[0], FeatureLevel::Level11_0);
        assert_eq!(config.color_format, wgpu::TextureFormat::Bgra8Unorm);
        assert_eq!(config.variant, EngineVariant::Orbit);
    }

    #[test]
    fn test_overrides() {
        let config = EngineConfig::default().with_overrides(Some("Mini"), Some("warp"));
        assert_eq!(config.variant, EngineVariant::Mini);
        assert_eq!(config.driver_tiers, vec![DriverTier::Warp]);
    }

    #[test]
    fn test_bad_overrides_are_ignored() {
        let config = EngineConfig::default().with_overrides(Some("teapot"), Some("gpu"));
        assert_eq!(config.variant, EngineVariant::Orbit);
        assert_eq!(config.driver_tiers.len(), 3);
    }

    #[test]
    fn test_builder() {
        let config = EngineConfig::default()
            .with_variant(EngineVariant::Mini)
            .with_feature_levels(vec![FeatureLevel::Level10_0])
            .with_backends(wgpu::Backends::VULKAN)
            .with_depth_buffer(false)
            .with_wait_for_gpu(false)
            .with_clear_color(wgpu::Color::RED);
        assert_eq!(config.variant, EngineVariant::Mini);
        assert_eq!(config.feature_levels, vec![FeatureLevel::Level10_0]);
        assert_eq!(config.backends, wgpu::Backends::VULKAN);
        assert!(!config.depth_buffer);
        assert!(!config.wait_for_gpu);
        assert_eq!(config.clear_color, Some(wgpu::Color::RED));
    }
}
