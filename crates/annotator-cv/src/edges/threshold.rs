//! Turning gradient magnitudes into a binary edge map

use super::{EdgeMap, Plane};
use serde::Serialize;

/// Ways of building the edge map, tried in [`EdgeStrategy::ORDER`] until one
/// marks at least one pixel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum EdgeStrategy {
    /// Two-threshold classification over the suppressed magnitudes
    Hysteresis,
    /// Single threshold on central differences of the blurred image
    GradientThreshold,
}

impl EdgeStrategy {
    pub const ORDER: [EdgeStrategy; 2] = [EdgeStrategy::Hysteresis, EdgeStrategy::GradientThreshold];

    pub fn apply(self, blurred: &Plane, suppressed: &Plane, threshold: f64) -> EdgeMap {
        match self {
            EdgeStrategy::Hysteresis => hysteresis(suppressed, threshold * 0.5, threshold),
            EdgeStrategy::GradientThreshold => gradient_threshold(blurred, threshold),
        }
    }
}

/// Run the strategies in order and keep the first non-empty map
pub fn build_edge_map(blurred: &Plane, suppressed: &Plane, threshold: f64) -> (EdgeMap, Option<EdgeStrategy>) {
    for strategy in EdgeStrategy::ORDER {
        let map = strategy.apply(blurred, suppressed, threshold);
        if map.count() > 0 {
            return (map, Some(strategy));
        }
    }
    (EdgeMap::new(blurred.width, blurred.height), None)
}

/// Pixels at or above `high` are edges, and so is every pixel at or above
/// `low` that is 8-connected to one through other such pixels
pub fn hysteresis(magnitude: &Plane, low: f64, high: f64) -> EdgeMap {
    let (width, height) = (magnitude.width, magnitude.height);
    let mut map = EdgeMap::new(width, height);
    let mut stack = Vec::new();

    for (i, &m) in magnitude.data.iter().enumerate() {
        if m >= high {
            map.edges[i] = true;
            stack.push(i);
        }
    }

    while let Some(i) = stack.pop() {
        let (x, y) = ((i % width) as isize, (i / width) as isize);
        for dy in -1..=1 {
            for dx in -1..=1 {
                let (nx, ny) = (x + dx, y + dy);
                if (dx, dy) == (0, 0) || nx < 0 || ny < 0 || nx >= width as isize || ny >= height as isize {
                    continue;
                }
                let n = ny as usize * width + nx as usize;
                if !map.edges[n] && magnitude.data[n] >= low {
                    map.edges[n] = true;
                    stack.push(n);
                }
            }
        }
    }

    map
}

/// Central-difference magnitude at or above `threshold`, interior pixels only
pub fn gradient_threshold(blurred: &Plane, threshold: f64) -> EdgeMap {
    let (width, height) = (blurred.width, blurred.height);
    let mut map = EdgeMap::new(width, height);

    for y in 1..height.saturating_sub(1) {
        for x in 1..width.saturating_sub(1) {
            let dx = blurred.get(x + 1, y) - blurred.get(x - 1, y);
            let dy = blurred.get(x, y + 1) - blurred.get(x, y - 1);
            if (dx * dx + dy * dy).sqrt() >= threshold {
                map.edges[y * width + x] = true;
            }
        }
    }

    map
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plane(width: usize, values: &[f64]) -> Plane {
        Plane {
            width,
            height: values.len() / width,
            data: values.to_vec(),
        }
    }

    #[test]
    fn test_weak_pixels_need_a_strong_neighbour() {
        #[rustfmt::skip]
        let m = plane(5, &[
            0.0, 0.0,  0.0, 0.0,  0.0,
            0.0, 60.0, 30.0, 0.0, 30.0,
            0.0, 0.0,  0.0, 30.0, 0.0,
        ]);
        let map = hysteresis(&m, 25.0, 50.0);
        assert!(map.get(1, 1));
        assert!(map.get(2, 1));
        // chained through (2,1) -> (3,2) -> (4,1)
        assert!(map.get(3, 2));
        assert!(map.get(4, 1));
        assert_eq!(map.count(), 4);
    }

    #[test]
    fn test_isolated_weak_pixels_are_dropped() {
        let m = plane(3, &[30.0, 0.0, 30.0]);
        assert_eq!(hysteresis(&m, 25.0, 50.0).count(), 0);
    }

    #[test]
    fn test_long_chain_does_not_recurse() {
        let width = 200_000;
        let mut values = vec![30.0; width];
        values[0] = 60.0;
        let map = hysteresis(&plane(width, &values), 25.0, 50.0);
        assert_eq!(map.count(), width);
    }

    #[test]
    fn test_fallback_order() {
        // suppressed map empty, blurred image has a step
        let blurred = plane(4, &[0.0, 0.0, 100.0, 100.0, 0.0, 0.0, 100.0, 100.0, 0.0, 0.0, 100.0, 100.0]);
        let suppressed = plane(4, &[0.0; 12]);
        let (map, strategy) = build_edge_map(&blurred, &suppressed, 50.0);
        assert_eq!(strategy, Some(EdgeStrategy::GradientThreshold));
        assert!(map.get(1, 1));
        assert!(map.get(2, 1));
    }

    #[test]
    fn test_no_strategy_finds_edges_in_flat_image() {
        let flat = plane(3, &[5.0; 9]);
        let (map, strategy) = build_edge_map(&flat, &plane(3, &[0.0; 9]), 50.0);
        assert_eq!(strategy, None);
        assert_eq!(map.count(), 0);
    }
}
