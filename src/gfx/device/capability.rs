//! Driver tier and feature level negotiation.
//!
//! Device creation walks an ordered list of driver tiers and, within each tier,
//! an ordered list of feature levels (highest first). The first combination that
//! succeeds is kept. Failed attempts are recorded but not reported unless every
//! combination fails.

use std::fmt;

use crate::error::{RenderError, Result};

/// Class of adapter requested from the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DriverTier {
    /// A GPU-backed adapter. Software rasterizers are rejected at this tier.
    Hardware,
    /// The platform's fallback software rasterizer (WARP, lavapipe, ...).
    Warp,
    /// Any adapter the instance can enumerate, software included.
    Reference,
}

impl DriverTier {
    pub const ALL: [DriverTier; 3] = [
        DriverTier::Hardware,
        DriverTier::Warp,
        DriverTier::Reference,
    ];

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "hardware" | "hw" => Some(DriverTier::Hardware),
            "warp" | "software" => Some(DriverTier::Warp),
            "reference" | "ref" => Some(DriverTier::Reference),
            _ => None,
        }
    }
}

impl fmt::Display for DriverTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DriverTier::Hardware => "hardware",
            DriverTier::Warp => "warp",
            DriverTier::Reference => "reference",
        };
        f.write_str(name)
    }
}

/// Minimum capability class requested from a device.
///
/// Each level maps to a `wgpu::Limits` preset; device creation fails when the
/// adapter cannot satisfy the preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FeatureLevel {
    Level10_0,
    Level10_1,
    Level11_0,
}

impl FeatureLevel {
    /// Highest first, the default search order.
    pub const ALL: [FeatureLevel; 3] = [
        FeatureLevel::Level11_0,
        FeatureLevel::Level10_1,
        FeatureLevel::Level10_0,
    ];

    pub fn limits(&self) -> wgpu::Limits {
        match self {
            FeatureLevel::Level11_0 => wgpu::Limits::default(),
            FeatureLevel::Level10_1 => wgpu::Limits::downlevel_defaults(),
            FeatureLevel::Level10_0 => wgpu::Limits::downlevel_webgl2_defaults(),
        }
    }
}

impl fmt::Display for FeatureLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FeatureLevel::Level11_0 => "11_0",
            FeatureLevel::Level10_1 => "10_1",
            FeatureLevel::Level10_0 => "10_0",
        };
        f.write_str(name)
    }
}

/// Outcome of a successful negotiation.
#[derive(Debug)]
pub struct CapabilitySelection<T> {
    pub value: T,
    pub tier: DriverTier,
    pub level: FeatureLevel,
    /// Attempts that failed before this one succeeded.
    pub failed_attempts: Vec<String>,
}

/// Tries `attempt` for every tier/level pair in order and keeps the first success.
///
/// Returns [`RenderError::CapabilityExhausted`] only after every pair has failed.
pub fn select_capability<T, E, F>(
    tiers: &[DriverTier],
    levels: &[FeatureLevel],
    mut attempt: F,
) -> Result<CapabilitySelection<T>>
where
    E: fmt::Display,
    F: FnMut(DriverTier, FeatureLevel) -> std::result::Result<T, E>,
{
    let mut failed_attempts = Vec::new();

    for &tier in tiers {
        for &level in levels {
            match attempt(tier, level) {
                Ok(value) => {
                    return Ok(CapabilitySelection {
                        value,
                        tier,
                        level,
                        failed_attempts,
                    });
                }
                Err(err) => {
                    log::debug!("device attempt {}/{} failed: {}", tier, level, err);
                    failed_attempts.push(format!("{}/{}: {}", tier, level, err));
                }
            }
        }
    }

    Err(RenderError::CapabilityExhausted {
        attempts: failed_attempts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_success_wins() {
        let mut calls = Vec::new();
        let selection = select_capability(&DriverTier::ALL, &FeatureLevel::ALL, |tier, level| {
            calls.push((tier, level));
            if tier == DriverTier::Hardware && level == FeatureLevel::Level11_0 {
                Ok("gpu")
            } else {
                Err("unreachable")
            }
        })
        .unwrap();

        assert_eq!(selection.value, "gpu");
        assert_eq!(selection.tier, DriverTier::Hardware);
        assert_eq!(selection.level, FeatureLevel::Level11_0);
        assert!(selection.failed_attempts.is_empty());
        assert_eq!(calls.len(), 1);
    }

    #[test]
    fn test_falls_back_through_levels_then_tiers() {
        let mut calls = Vec::new();
        let selection = select_capability(&DriverTier::ALL, &FeatureLevel::ALL, |tier, level| {
            calls.push((tier, level));
            match (tier, level) {
                (DriverTier::Warp, FeatureLevel::Level10_1) => Ok(42),
                _ => Err(format!("{tier} cannot do {level}")),
            }
        })
        .unwrap();

        assert_eq!(selection.value, 42);
        assert_eq!(selection.tier, DriverTier::Warp);
        assert_eq!(selection.level, FeatureLevel::Level10_1);
        assert_eq!(
            calls,
            vec![
                (DriverTier::Hardware, FeatureLevel::Level11_0),
                (DriverTier::Hardware, FeatureLevel::Level10_1),
                (DriverTier::Hardware, FeatureLevel::Level10_0),
                (DriverTier::Warp, FeatureLevel::Level11_0),
                (DriverTier::Warp, FeatureLevel::Level10_1),
            ]
        );
        assert_eq!(selection.failed_attempts.len(), 4);
        assert_eq!(
            selection.failed_attempts[0],
            "hardware/11_0: hardware cannot do 11_0"
        );
    }

    #[test]
    fn test_exhaustion_reports_every_attempt() {
        let result = select_capability::<(), _, _>(&DriverTier::ALL, &FeatureLevel::ALL, |_, _| {
            Err("no adapter")
        });

        match result {
            Err(RenderError::CapabilityExhausted { attempts }) => {
                assert_eq!(attempts.len(), 9);
                assert_eq!(attempts.last().unwrap(), "reference/10_0: no adapter");
            }
            other => panic!("expected exhaustion, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_search_is_exhausted() {
        let result = select_capability::<(), &str, _>(&[], &FeatureLevel::ALL, |_, _| Ok(()));
        assert!(matches!(
            result,
            Err(RenderError::CapabilityExhausted { ref attempts }) if attempts.is_empty()
        ));
    }

    #[test]
    fn test_tier_parse() {
        assert_eq!(DriverTier::parse("Hardware"), Some(DriverTier::Hardware));
        assert_eq!(DriverTier::parse(" warp "), Some(DriverTier::Warp));
        assert_eq!(DriverTier::parse("ref"), Some(DriverTier::Reference));
        assert_eq!(DriverTier::parse("gpu"), None);
    }

    #[test]
    fn test_levels_ordered_and_limits_shrink() {
        assert!(FeatureLevel::Level11_0 > FeatureLevel::Level10_0);
        let high = FeatureLevel::Level11_0.limits();
        let low = FeatureLevel::Level10_0.limits();
        assert!(
            high.max_texture_dimension_2d >= low.max_texture_dimension_2d
        );
    }
}
