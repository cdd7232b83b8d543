//! Detection configuration

use crate::Result;
use crate::frame::{DEFAULT_DISPLAY_HEIGHT, DEFAULT_DISPLAY_WIDTH};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{field} must be a positive finite number, got {value}")]
    NotPositive { field: &'static str, value: f64 },
    #[error("display size must be non-zero, got {width}x{height}")]
    EmptyDisplay { width: u32, height: u32 },
    #[error("{field} must lie in [0, 1], got {value}")]
    OutOfUnitRange { field: &'static str, value: f64 },
}

/// Edge pipeline parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EdgeOptions {
    /// High hysteresis threshold; the low one is half of it
    pub threshold: f64,
    pub blur_radius: f64,
    /// Shortest contour kept, in pixels
    pub min_edge_length: f64,
    /// Segments are capped at a fifth of this
    pub max_keypoints: f64,
    /// Validated and carried along, but segments are always simplified with
    /// a tolerance of 2
    pub simplify_tolerance: f64,
}

impl Default for EdgeOptions {
    fn default() -> Self {
        Self {
            threshold: 50.0,
            blur_radius: 2.0,
            min_edge_length: 8.0,
            max_keypoints: 120.0,
            simplify_tolerance: 3.0,
        }
    }
}

impl EdgeOptions {
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        let fields = [
            ("threshold", self.threshold),
            ("blurRadius", self.blur_radius),
            ("minEdgeLength", self.min_edge_length),
            ("maxKeypoints", self.max_keypoints),
            ("simplifyTolerance", self.simplify_tolerance),
        ];
        for (field, value) in fields {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::NotPositive { field, value });
            }
        }
        Ok(())
    }
}

/// Main detection configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    pub options: EdgeOptions,
    /// Frames are scaled to this size before detection
    pub display_width: u32,
    pub display_height: u32,
    /// Regions searched when detection is restricted to detector boxes
    pub max_regions: usize,
    pub region_nms_threshold: f64,
    pub min_region_score: f64,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            options: EdgeOptions::default(),
            display_width: DEFAULT_DISPLAY_WIDTH,
            display_height: DEFAULT_DISPLAY_HEIGHT,
            max_regions: 3,
            region_nms_threshold: 0.5,
            min_region_score: 0.25,
        }
    }
}

impl DetectionConfig {
    /// Lower thresholds for dim or washed-out footage
    pub fn for_low_contrast() -> Self {
        let mut config = Self::default();
        config.options.threshold = 25.0;
        config
    }

    /// Less blur, shorter contours and more keypoints for small subjects
    pub fn for_fine_detail() -> Self {
        let mut config = Self::default();
        config.options.blur_radius = 1.0;
        config.options.min_edge_length = 4.0;
        config.options.max_keypoints = 200.0;
        config
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read detection config: {:?}", path))?;
        let config: DetectionConfig = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse detection config: {:?}", path))?;
        config
            .validate()
            .with_context(|| format!("Invalid detection config: {:?}", path))?;
        Ok(config)
    }

    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        self.options.validate()?;
        if self.display_width == 0 || self.display_height == 0 {
            return Err(ConfigError::EmptyDisplay {
                width: self.display_width,
                height: self.display_height,
            });
        }
        for (field, value) in [
            ("region_nms_threshold", self.region_nms_threshold),
            ("min_region_score", self.min_region_score),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::OutOfUnitRange { field, value });
            }
        }
        Ok(())
    }
}
