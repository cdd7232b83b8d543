//! Contour extraction from the edge map

use super::EdgeMap;
use annotator_core::Point;
use serde::Serialize;

/// Steps for directions 0..8, clockwise from east (y grows downwards)
const STEPS: [(isize, isize); 8] = [(1, 0), (1, 1), (0, 1), (-1, 1), (-1, 0), (-1, -1), (0, -1), (1, -1)];

const MIN_ASPECT_RATIO: f64 = 0.05;
const MAX_ASPECT_RATIO: f64 = 20.0;
const MIN_AREA: f64 = 10.0;

/// Ways of cutting the edge map into segments, tried in
/// [`ContourStrategy::ORDER`] until one yields a segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ContourStrategy {
    /// Moore-neighbour tracing with length, aspect and area filters
    ContourTrace,
    /// One segment per edge pixel
    SinglePixel,
}

impl ContourStrategy {
    pub const ORDER: [ContourStrategy; 2] = [ContourStrategy::ContourTrace, ContourStrategy::SinglePixel];
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Segments {
    pub segments: Vec<Vec<Point>>,
    pub strategy: Option<ContourStrategy>,
    /// Contours traced before filtering
    pub traced: usize,
}

pub fn extract_segments(map: &EdgeMap, min_length: f64) -> Segments {
    let contours = trace_contours(map);
    let traced = contours.len();

    for strategy in ContourStrategy::ORDER {
        let segments: Vec<Vec<Point>> = match strategy {
            ContourStrategy::ContourTrace => contours
                .iter()
                .filter(|c| is_acceptable(c, min_length))
                .cloned()
                .collect(),
            ContourStrategy::SinglePixel => single_pixels(map),
        };
        if !segments.is_empty() {
            return Segments {
                segments,
                strategy: Some(strategy),
                traced,
            };
        }
    }

    Segments {
        traced,
        ..Segments::default()
    }
}

/// Trace every edge component in raster order
pub fn trace_contours(map: &EdgeMap) -> Vec<Vec<Point>> {
    let mut visited = vec![false; map.edges.len()];
    let mut contours = Vec::new();

    for y in 0..map.height {
        for x in 0..map.width {
            let i = y * map.width + x;
            if map.edges[i] && !visited[i] {
                contours.push(trace_from(map, &mut visited, x, y));
            }
        }
    }

    contours
}

/// Follow unvisited edge pixels from `(start_x, start_y)`.
///
/// At each pixel the neighbourhood is swept clockwise starting two steps
/// left of the entry direction. Tracing stops when the sweep meets the
/// start pixel again or finds no unvisited edge pixel.
fn trace_from(map: &EdgeMap, visited: &mut [bool], start_x: usize, start_y: usize) -> Vec<Point> {
    let start = (start_x as isize, start_y as isize);
    visited[start_y * map.width + start_x] = true;
    let mut contour = vec![Point::new(start_x as f64, start_y as f64)];
    let (mut current, mut dir) = (start, 0usize);

    'trace: loop {
        for turn in 0..8 {
            let d = (dir + 6 + turn) % 8;
            let next = (current.0 + STEPS[d].0, current.1 + STEPS[d].1);
            let Some(i) = map.index(next.0, next.1) else {
                continue;
            };
            if !map.edges[i] {
                continue;
            }
            if next == start && contour.len() > 2 {
                break 'trace;
            }
            if !visited[i] {
                visited[i] = true;
                contour.push(Point::new(next.0 as f64, next.1 as f64));
                current = next;
                dir = d;
                continue 'trace;
            }
        }
        break;
    }

    contour
}

fn is_acceptable(contour: &[Point], min_length: f64) -> bool {
    if (contour.len() as f64) < min_length {
        return false;
    }
    let ratio = aspect_ratio(contour);
    if !(MIN_ASPECT_RATIO..=MAX_ASPECT_RATIO).contains(&ratio) {
        return false;
    }
    shoelace_area(contour) >= MIN_AREA
}

/// Width over height of the bounding box. A flat box has an infinite ratio.
fn aspect_ratio(contour: &[Point]) -> f64 {
    let (mut min_x, mut max_x) = (f64::INFINITY, f64::NEG_INFINITY);
    let (mut min_y, mut max_y) = (f64::INFINITY, f64::NEG_INFINITY);
    for p in contour {
        min_x = min_x.min(p.x);
        max_x = max_x.max(p.x);
        min_y = min_y.min(p.y);
        max_y = max_y.max(p.y);
    }
    let (width, height) = (max_x - min_x, max_y - min_y);
    if height > 0.0 {
        width / height
    } else {
        f64::INFINITY
    }
}

/// Absolute polygon area, closing the contour back to its first point
pub fn shoelace_area(contour: &[Point]) -> f64 {
    let n = contour.len();
    if n < 3 {
        return 0.0;
    }
    let twice: f64 = (0..n)
        .map(|i| {
            let (a, b) = (contour[i], contour[(i + 1) % n]);
            a.x * b.y - b.x * a.y
        })
        .sum();
    twice.abs() / 2.0
}

fn single_pixels(map: &EdgeMap) -> Vec<Vec<Point>> {
    map.edges
        .iter()
        .enumerate()
        .filter(|&(_, &edge)| edge)
        .map(|(i, _)| vec![Point::new((i % map.width) as f64, (i / map.width) as f64)])
        .collect()
}
