// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Kernel configuration
//!
//! Configuration is plain data owned by the caller. A [`crate::Kernel`] is
//! constructed from a [`KernelConfig`]; nothing is read from the
//! environment unless [`KernelConfig::load`] is called explicitly.

use crate::error::{KernelError, KernelResult};
use crate::topology::RepairOptions;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default config file looked up by [`KernelConfig::load`]
pub const DEFAULT_CONFIG_FILE: &str = "brep.toml";

/// Numeric tolerances shared by repair, partitioning and composition
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tolerances {
    /// Signed distances within this band count as on-plane
    pub plane_epsilon: f64,
    /// Minimum cross-product magnitude of a non-degenerate face
    pub area_epsilon: f64,
    /// Edges shorter than this make a face degenerate
    pub min_edge_length: f64,
    /// Fractional decimal digits of the duplicate-vertex key
    pub weld_precision: u32,
    /// Probe distance along a face normal when the face lies on a boundary
    pub boundary_offset: f64,
}

/// Hash key of a welded position, see [`Tolerances::weld_key`]
pub type WeldKey = (u64, u64, u64);

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            plane_epsilon: 1e-5,
            area_epsilon: 1e-10,
            min_edge_length: 1e-9,
            weld_precision: 6,
            boundary_offset: 1e-4,
        }
    }
}

impl Tolerances {
    /// Multiplier applied to coordinates before rounding to a weld key
    pub fn weld_scale(&self) -> f64 {
        10f64.powi(self.weld_precision as i32)
    }

    /// Quantized hash key of a position
    ///
    /// Keys are the bit patterns of the rounded scaled coordinates, so
    /// magnitudes beyond the integer range stay distinct and a NaN never
    /// shares a key with a finite position. Negative zero folds into zero.
    pub fn weld_key(&self, p: &nalgebra::Point3<f64>) -> WeldKey {
        let scale = self.weld_scale();
        let quantize = |v: f64| ((v * scale).round() + 0.0).to_bits();
        (quantize(p.x), quantize(p.y), quantize(p.z))
    }

    pub fn validate(&self) -> KernelResult<()> {
        let positive = [
            ("plane_epsilon", self.plane_epsilon),
            ("area_epsilon", self.area_epsilon),
            ("boundary_offset", self.boundary_offset),
        ];
        for (name, value) in positive {
            if !(value > 0.0 && value.is_finite()) {
                return Err(KernelError::Config {
                    reason: format!("{} must be a positive finite number, got {}", name, value),
                });
            }
        }
        if !(self.min_edge_length >= 0.0 && self.min_edge_length.is_finite()) {
            return Err(KernelError::Config {
                reason: format!(
                    "min_edge_length must be non-negative, got {}",
                    self.min_edge_length
                ),
            });
        }
        if self.weld_precision > 12 {
            return Err(KernelError::Config {
                reason: format!(
                    "weld_precision must be at most 12 digits, got {}",
                    self.weld_precision
                ),
            });
        }
        if self.boundary_offset <= self.plane_epsilon {
            return Err(KernelError::Config {
                reason: format!(
                    "boundary_offset ({}) must exceed plane_epsilon ({})",
                    self.boundary_offset, self.plane_epsilon
                ),
            });
        }
        Ok(())
    }
}

/// How a BSP node picks its splitting face
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PivotStrategy {
    /// First usable face of the node's input list
    First,
    /// Among the first `pivot_candidates` usable faces, the one causing the fewest splits
    LeastSplits,
}

impl PivotStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            PivotStrategy::First => "first",
            PivotStrategy::LeastSplits => "least_splits",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "first" => Some(PivotStrategy::First),
            "least_splits" | "least-splits" => Some(PivotStrategy::LeastSplits),
            _ => None,
        }
    }
}

/// Partitioning options
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BspOptions {
    pub pivot: PivotStrategy,
    /// Faces examined per node by [`PivotStrategy::LeastSplits`]
    pub pivot_candidates: usize,
}

impl Default for BspOptions {
    fn default() -> Self {
        Self {
            pivot: PivotStrategy::First,
            pivot_candidates: 8,
        }
    }
}

/// Full kernel configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KernelConfig {
    pub tolerances: Tolerances,
    pub repair: RepairOptions,
    pub bsp: BspOptions,
}

impl KernelConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;
        let config: KernelConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path.as_ref()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load `brep.toml` when present, then apply environment overrides
    pub fn load() -> Result<Self> {
        let mut config = if PathBuf::from(DEFAULT_CONFIG_FILE).exists() {
            Self::from_file(DEFAULT_CONFIG_FILE)?
        } else {
            Self::default()
        };

        if let Ok(eps) = std::env::var("BREP_PLANE_EPSILON") {
            config.tolerances.plane_epsilon = eps
                .parse()
                .with_context(|| format!("BREP_PLANE_EPSILON is not a number: {}", eps))?;
        }

        if let Ok(digits) = std::env::var("BREP_WELD_PRECISION") {
            config.tolerances.weld_precision = digits
                .parse()
                .with_context(|| format!("BREP_WELD_PRECISION is not an integer: {}", digits))?;
        }

        if let Ok(pivot) = std::env::var("BREP_PIVOT") {
            config.bsp.pivot = PivotStrategy::parse(&pivot)
                .with_context(|| format!("Unknown BREP_PIVOT strategy: {}", pivot))?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path.as_ref(), content)
            .with_context(|| format!("Failed to write config file: {:?}", path.as_ref()))?;
        Ok(())
    }

    pub fn validate(&self) -> KernelResult<()> {
        self.tolerances.validate()?;
        if self.bsp.pivot_candidates == 0 {
            return Err(KernelError::Config {
                reason: "pivot_candidates must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults_are_valid() {
        assert!(KernelConfig::default().validate().is_ok());
    }

    #[test]
    fn test_weld_key_ignores_seventh_decimal() {
        let tol = Tolerances::default();
        let a = tol.weld_key(&Point3::new(1.0000001, 2.0, 3.0));
        let b = tol.weld_key(&Point3::new(1.0000002, 2.0, 3.0));
        assert_eq!(a, b);

        let c = tol.weld_key(&Point3::new(1.00001, 2.0, 3.0));
        assert_ne!(a, c);
    }

    #[test]
    fn test_weld_key_keeps_extreme_values_apart() {
        let tol = Tolerances::default();
        let origin = tol.weld_key(&Point3::origin());
        assert_ne!(tol.weld_key(&Point3::new(1e13, 0.0, 0.0)), tol.weld_key(&Point3::new(2e13, 0.0, 0.0)));
        assert_ne!(tol.weld_key(&Point3::new(f64::NAN, 0.0, 0.0)), origin);
        assert_ne!(tol.weld_key(&Point3::new(f64::INFINITY, 0.0, 0.0)), origin);
        assert_eq!(tol.weld_key(&Point3::new(-0.0, -1e-9, 0.0)), origin);
    }

    #[test]
    fn test_rejects_offset_inside_epsilon_band() {
        let tol = Tolerances {
            boundary_offset: 1e-6,
            ..Default::default()
        };
        assert!(matches!(tol.validate(), Err(KernelError::Config { .. })));
    }

    #[test]
    fn test_rejects_excessive_precision() {
        let tol = Tolerances {
            weld_precision: 20,
            ..Default::default()
        };
        assert!(tol.validate().is_err());
    }

    #[test]
    fn test_save_and_load_roundtrip() -> Result<()> {
        let mut config = KernelConfig::default();
        config.bsp.pivot = PivotStrategy::LeastSplits;
        config.repair.fill_holes = false;
        config.tolerances.weld_precision = 4;

        let file = NamedTempFile::new()?;
        config.save(file.path())?;
        let loaded = KernelConfig::from_file(file.path())?;
        assert_eq!(loaded, config);
        Ok(())
    }

    #[test]
    fn test_partial_file_uses_defaults() -> Result<()> {
        let file = NamedTempFile::new()?;
        std::fs::write(file.path(), "[bsp]\npivot = \"least_splits\"\n")?;
        let loaded = KernelConfig::from_file(file.path())?;
        assert_eq!(loaded.bsp.pivot, PivotStrategy::LeastSplits);
        assert_eq!(loaded.tolerances, Tolerances::default());
        assert!(loaded.repair.remove_duplicate_vertices);
        Ok(())
    }

    #[test]
    fn test_pivot_parse() {
        assert_eq!(PivotStrategy::parse("FIRST"), Some(PivotStrategy::First));
        assert_eq!(
            PivotStrategy::parse("least-splits"),
            Some(PivotStrategy::LeastSplits)
        );
        assert_eq!(PivotStrategy::parse("random"), None);
    }
}
