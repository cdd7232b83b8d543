//! Classical edge pipeline turning a frame into keypoints
//!
//! grayscale -> Gaussian blur -> Sobel/Scharr gradient -> non-maximum
//! suppression -> edge map -> contours -> center-first selection -> RDP
//! simplification -> dots and lines.
//!
//! The pipeline is a pure function of its inputs. Dot and line ids are
//! derived from emission order, so identical inputs give identical output.

pub mod contour;
pub mod filters;
pub mod gradient;
pub mod simplify;
pub mod threshold;

pub use contour::ContourStrategy;
pub use threshold::EdgeStrategy;

use crate::detection::EdgeOptions;
use crate::frame::{FrameBuffer, PixelRect, Region};
use annotator_core::{Dot, LineSegment, Point};
use serde::Serialize;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use tracing::{debug, warn};

pub const DETECTED_DOT_COLOR: &str = "blue";
pub const DETECTED_LINE_COLOR: &str = "#0066cc";

/// Share of segments, closest to the center first, that are kept
const MAIN_SUBJECT_SHARE: f64 = 0.7;

/// Row-major grid of intensities
#[derive(Debug, Clone, PartialEq)]
pub struct Plane {
    pub width: usize,
    pub height: usize,
    pub data: Vec<f64>,
}

impl Plane {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0.0; width * height],
        }
    }

    pub fn get(&self, x: usize, y: usize) -> f64 {
        self.data[y * self.width + x]
    }

    pub fn crop(&self, rect: &PixelRect) -> Plane {
        let mut data = Vec::with_capacity(rect.width * rect.height);
        for y in rect.y..rect.y + rect.height {
            let row = y * self.width;
            data.extend_from_slice(&self.data[row + rect.x..row + rect.x + rect.width]);
        }
        Plane {
            width: rect.width,
            height: rect.height,
            data,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EdgeMap {
    pub width: usize,
    pub height: usize,
    pub edges: Vec<bool>,
}

impl EdgeMap {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            edges: vec![false; width * height],
        }
    }

    pub fn get(&self, x: usize, y: usize) -> bool {
        self.edges[y * self.width + x]
    }

    /// Index of `(x, y)`, `None` outside the map
    pub fn index(&self, x: isize, y: isize) -> Option<usize> {
        (x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height)
            .then(|| y as usize * self.width + x as usize)
    }

    pub fn count(&self) -> usize {
        self.edges.iter().filter(|&&e| e).count()
    }
}

/// Dots and lines produced by one pipeline run
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct EdgeKeypoints {
    pub dots: Vec<Dot>,
    pub lines: Vec<LineSegment>,
}

impl EdgeKeypoints {
    pub fn is_empty(&self) -> bool {
        self.dots.is_empty()
    }
}

/// What each stage of a run produced
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineTrace {
    pub edge_pixels: usize,
    pub edge_strategy: Option<EdgeStrategy>,
    pub contour_strategy: Option<ContourStrategy>,
    pub contours_traced: usize,
    pub segments_kept: usize,
}

/// Run the pipeline over `frame`, or only over `region` of it.
///
/// Output coordinates are in full-frame space. Ids are `{id_prefix}d{n}` for
/// dots and `{id_prefix}l{n}` for lines. An unreadable frame, or a region
/// entirely outside it, yields nothing.
pub fn extract_keypoints(
    frame: &FrameBuffer,
    options: &EdgeOptions,
    region: Option<&Region>,
    id_prefix: &str,
) -> (EdgeKeypoints, PipelineTrace) {
    if !frame.is_readable() {
        warn!(
            width = frame.width(),
            height = frame.height(),
            bytes = frame.as_bytes().len(),
            "unreadable frame buffer"
        );
        return Default::default();
    }

    let gray = filters::grayscale(frame);
    let (gray, origin) = match region {
        None => (gray, (0, 0)),
        Some(region) => match region.clamp(gray.width, gray.height) {
            Some(rect) => (gray.crop(&rect), (rect.x, rect.y)),
            None => {
                debug!(?region, "region outside frame");
                return Default::default();
            }
        },
    };

    let blurred = filters::gaussian_blur(&gray, options.blur_radius);
    let gradient = gradient::gradient(&blurred);
    let suppressed = gradient::suppress_non_maxima(&gradient);
    let (edges, edge_strategy) = threshold::build_edge_map(&blurred, &suppressed, options.threshold);
    let edge_pixels = edges.count();
    debug!(edge_pixels, ?edge_strategy, "edge map");

    let extracted = contour::extract_segments(&edges, options.min_edge_length);
    debug!(
        traced = extracted.traced,
        accepted = extracted.segments.len(),
        strategy = ?extracted.strategy,
        "segments"
    );

    let mut segments = main_subject(extracted.segments, gray.width, gray.height);
    segments.truncate(segment_limit(options.max_keypoints));

    let keypoints = emit(&segments, origin, id_prefix);
    let trace = PipelineTrace {
        edge_pixels,
        edge_strategy,
        contour_strategy: extracted.strategy,
        contours_traced: extracted.traced,
        segments_kept: segments.len(),
    };
    (keypoints, trace)
}

/// At most one segment per five keypoints
fn segment_limit(max_keypoints: f64) -> usize {
    (max_keypoints / 5.0).floor().max(0.0) as usize
}

/// Segments ordered by centroid distance to the center, closest 70% kept
/// (at least one)
fn main_subject(segments: Vec<Vec<Point>>, width: usize, height: usize) -> Vec<Vec<Point>> {
    if segments.is_empty() {
        return segments;
    }
    let center = Point::new(width as f64 / 2.0, height as f64 / 2.0);

    let mut ranked: Vec<(f64, Vec<Point>)> = segments
        .into_iter()
        .map(|segment| (centroid(&segment).distance_to(&center), segment))
        .collect();
    ranked.sort_by(|a, b| a.0.total_cmp(&b.0));

    let keep = ((ranked.len() as f64 * MAIN_SUBJECT_SHARE).floor() as usize).max(1);
    ranked.into_iter().take(keep).map(|(_, segment)| segment).collect()
}

fn centroid(points: &[Point]) -> Point {
    let n = points.len() as f64;
    let (sx, sy) = points.iter().fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
    Point::new(sx / n, sy / n)
}

/// Simplify each segment and turn it into dots (one per rounded position)
/// and lines between consecutive distinct dots
fn emit(segments: &[Vec<Point>], origin: (usize, usize), id_prefix: &str) -> EdgeKeypoints {
    let (ox, oy) = (origin.0 as f64, origin.1 as f64);
    let mut out = EdgeKeypoints::default();
    let mut by_position: HashMap<(i64, i64), String> = HashMap::new();

    for segment in segments {
        let mut previous: Option<String> = None;
        for p in simplify::simplify(segment, simplify::SEGMENT_TOLERANCE) {
            let key = (p.x.round() as i64, p.y.round() as i64);
            let id = match by_position.entry(key) {
                Entry::Occupied(entry) => entry.get().clone(),
                Entry::Vacant(entry) => {
                    let id = format!("{}d{}", id_prefix, out.dots.len());
                    out.dots
                        .push(Dot::new(id.clone(), p.x + ox, p.y + oy, DETECTED_DOT_COLOR));
                    entry.insert(id.clone());
                    id
                }
            };

            if let Some(prev) = previous.as_ref().filter(|prev| **prev != id) {
                let line_id = format!("{}l{}", id_prefix, out.lines.len());
                out.lines
                    .push(LineSegment::new(line_id, prev.clone(), id.clone(), DETECTED_LINE_COLOR));
            }
            previous = Some(id);
        }
    }

    out
}
