//! Ramer-Douglas-Peucker polyline simplification

use annotator_core::Point;

/// Tolerance used for every detected segment
pub const SEGMENT_TOLERANCE: f64 = 2.0;

/// Drop points closer than `tolerance` to the chord of their span. The first
/// and last points are always kept. Uses an explicit work stack.
pub fn simplify(points: &[Point], tolerance: f64) -> Vec<Point> {
    if points.len() <= 2 {
        return points.to_vec();
    }

    let last = points.len() - 1;
    let mut keep = vec![false; points.len()];
    keep[0] = true;
    keep[last] = true;

    let mut spans = vec![(0, last)];
    while let Some((start, end)) = spans.pop() {
        if end - start <= 1 {
            continue;
        }
        let (mut max_dist, mut max_index) = (0.0, start);
        for i in start + 1..end {
            let dist = distance_to_segment(points[i], points[start], points[end]);
            if dist > max_dist {
                max_dist = dist;
                max_index = i;
            }
        }
        if max_dist > tolerance {
            keep[max_index] = true;
            spans.push((start, max_index));
            spans.push((max_index, end));
        }
    }

    points
        .iter()
        .zip(keep)
        .filter_map(|(p, kept)| kept.then_some(*p))
        .collect()
}

/// Distance from `p` to the segment `a`-`b`
pub fn distance_to_segment(p: Point, a: Point, b: Point) -> f64 {
    let (cx, cy) = (b.x - a.x, b.y - a.y);
    let len_sq = cx * cx + cy * cy;
    if len_sq == 0.0 {
        return p.distance_to(&a);
    }
    let t = ((p.x - a.x) * cx + (p.y - a.y) * cy) / len_sq;
    let nearest = if t < 0.0 {
        a
    } else if t > 1.0 {
        b
    } else {
        Point::new(a.x + t * cx, a.y + t * cy)
    };
    p.distance_to(&nearest)
}
