//! High-level detection module

pub mod config;
pub mod detector;

pub use config::{ConfigError, DetectionConfig, EdgeOptions};
pub use detector::{DetectionResult, DetectionStats, EdgeDetector};
