//! Edge-based keypoint detector

use super::config::DetectionConfig;
use crate::Result;
use crate::bbox::BBoxCollection;
use crate::edges::{self, ContourStrategy, EdgeKeypoints, EdgeStrategy, PipelineTrace};
use crate::frame::{FrameBuffer, Region};
use crate::traits::{KeypointDetector, RegionProposer};
use annotator_core::{Dot, LineSegment};
use anyhow::Context;
use serde::Serialize;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

/// Keypoints found in one frame
#[derive(Debug, Clone, Default, Serialize)]
pub struct DetectionResult {
    pub dots: Vec<Dot>,
    pub lines: Vec<LineSegment>,
    pub stats: DetectionStats,
}

impl DetectionResult {
    pub fn is_empty(&self) -> bool {
        self.dots.is_empty()
    }
}

/// Detection statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionStats {
    pub edge_pixels: usize,
    pub edge_strategy: Option<EdgeStrategy>,
    pub contour_strategy: Option<ContourStrategy>,
    pub contours_traced: usize,
    pub segments_kept: usize,
    pub regions: usize,
    pub dots: usize,
    pub lines: usize,
    pub processing_time_ms: u64,
}

impl DetectionStats {
    fn absorb(&mut self, trace: &PipelineTrace) {
        self.edge_pixels += trace.edge_pixels;
        self.edge_strategy = self.edge_strategy.or(trace.edge_strategy);
        self.contour_strategy = self.contour_strategy.or(trace.contour_strategy);
        self.contours_traced += trace.contours_traced;
        self.segments_kept += trace.segments_kept;
    }
}

/// Runs the edge pipeline with a fixed configuration
pub struct EdgeDetector {
    config: DetectionConfig,
}

impl EdgeDetector {
    pub fn new(config: DetectionConfig) -> Result<Self> {
        config.validate().context("Invalid detection config")?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &DetectionConfig {
        &self.config
    }

    /// Detect keypoints in the whole frame or inside `region`
    pub fn detect(&self, frame: &FrameBuffer, region: Option<&Region>) -> DetectionResult {
        let start_time = Instant::now();
        let (keypoints, trace) = edges::extract_keypoints(frame, &self.config.options, region, "");

        let mut stats = DetectionStats {
            regions: usize::from(region.is_some()),
            ..DetectionStats::default()
        };
        stats.absorb(&trace);
        self.finish(keypoints, stats, start_time)
    }

    /// Detect inside detector boxes.
    ///
    /// Boxes below `min_region_score` are dropped, overlaps are suppressed
    /// and the `max_regions` boxes closest to the frame center are searched.
    /// Without any usable box the whole frame is searched.
    pub fn detect_in_regions(&self, frame: &FrameBuffer, boxes: BBoxCollection) -> DetectionResult {
        let start_time = Instant::now();
        let regions = boxes
            .filter_by_score(self.config.min_region_score)
            .apply_nms(self.config.region_nms_threshold)
            .sort_by_center_distance(frame.width() as f64 / 2.0, frame.height() as f64 / 2.0)
            .truncate(self.config.max_regions);

        if regions.is_empty() {
            debug!("no usable regions, searching the whole frame");
            return self.detect(frame, None);
        }
        debug!(regions = regions.len(), avg_score = regions.stats().avg_score, "searching regions");

        let mut merged = EdgeKeypoints::default();
        let mut stats = DetectionStats {
            regions: regions.len(),
            ..DetectionStats::default()
        };
        for (i, bbox) in regions.iter().enumerate() {
            let prefix = format!("r{}-", i);
            let (keypoints, trace) =
                edges::extract_keypoints(frame, &self.config.options, Some(&bbox.to_region()), &prefix);
            stats.absorb(&trace);
            merged.dots.extend(keypoints.dots);
            merged.lines.extend(keypoints.lines);
        }

        self.finish(merged, stats, start_time)
    }

    /// Ask `proposer` for boxes, then detect inside them
    pub fn detect_with_proposer(&self, frame: &FrameBuffer, proposer: &dyn RegionProposer) -> Result<DetectionResult> {
        let boxes = proposer.propose(frame).context("Region proposal failed")?;
        Ok(self.detect_in_regions(frame, boxes))
    }

    /// Load an image scaled to the display resolution and detect in it
    pub fn detect_from_file<P: AsRef<Path>>(&self, image_path: P, region: Option<&Region>) -> Result<DetectionResult> {
        let frame = FrameBuffer::load(&image_path, self.config.display_width, self.config.display_height)
            .with_context(|| format!("Failed to load image: {:?}", image_path.as_ref()))?;
        Ok(self.detect(&frame, region))
    }

    /// Export detection results in JSON format
    pub fn export_json(&self, result: &DetectionResult, output_path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(result).context("Failed to serialize detection results")?;

        std::fs::write(output_path, json)
            .with_context(|| format!("Failed to write JSON to: {:?}", output_path))?;

        info!("Detection results written to {:?}", output_path);
        Ok(())
    }

    fn finish(&self, keypoints: EdgeKeypoints, mut stats: DetectionStats, start_time: Instant) -> DetectionResult {
        stats.dots = keypoints.dots.len();
        stats.lines = keypoints.lines.len();
        stats.processing_time_ms = start_time.elapsed().as_millis() as u64;

        info!(
            dots = stats.dots,
            lines = stats.lines,
            edge_pixels = stats.edge_pixels,
            strategy = ?stats.edge_strategy,
            ms = stats.processing_time_ms,
            "edge detection finished"
        );

        DetectionResult {
            dots: keypoints.dots,
            lines: keypoints.lines,
            stats,
        }
    }
}

impl KeypointDetector for EdgeDetector {
    fn detect_keypoints(&self, frame: &FrameBuffer, region: Option<&Region>) -> DetectionResult {
        self.detect(frame, region)
    }
}
