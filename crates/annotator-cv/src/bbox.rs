//! Detector boxes and non-maximum suppression
//!
//! Boxes come from an object detector and only restrict where the edge
//! pipeline looks.

use crate::frame::Region;
use annotator_core::Point;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// An axis-aligned detection in frame coordinates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub score: f64,
    pub class_id: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
}

impl BBox {
    pub fn new(x: f64, y: f64, width: f64, height: f64, score: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
            score,
            class_id: 0,
            class_name: None,
        }
    }

    pub fn with_class(mut self, class_id: u32, class_name: impl Into<String>) -> Self {
        self.class_id = class_id;
        self.class_name = Some(class_name.into());
        self
    }

    pub fn area(&self) -> f64 {
        self.width.max(0.0) * self.height.max(0.0)
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Intersection over union with another box
    pub fn iou(&self, other: &BBox) -> f64 {
        let x1 = self.x.max(other.x);
        let y1 = self.y.max(other.y);
        let x2 = (self.x + self.width).min(other.x + other.width);
        let y2 = (self.y + self.height).min(other.y + other.height);

        if x2 <= x1 || y2 <= y1 {
            return 0.0;
        }

        let intersection = (x2 - x1) * (y2 - y1);
        let union = self.area() + other.area() - intersection;

        intersection / union
    }

    pub fn overlaps(&self, other: &BBox, threshold: f64) -> bool {
        self.iou(other) > threshold
    }

    pub fn to_region(&self) -> Region {
        Region::new(self.x, self.y, self.width, self.height)
    }
}

/// Collection of boxes with batch operations
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BBoxCollection {
    boxes: Vec<BBox>,
}

impl BBoxCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_vec(boxes: Vec<BBox>) -> Self {
        Self { boxes }
    }

    pub fn push(&mut self, bbox: BBox) {
        self.boxes.push(bbox);
    }

    pub fn as_slice(&self) -> &[BBox] {
        &self.boxes
    }

    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    /// Sort by score (descending)
    pub fn sort_by_score(&mut self) {
        self.boxes.sort_by(|a, b| b.score.total_cmp(&a.score));
    }

    pub fn filter_by_score(mut self, threshold: f64) -> Self {
        self.boxes.retain(|bbox| bbox.score >= threshold);
        self
    }

    /// Greedy NMS: best score first, dropping boxes whose IoU with a kept
    /// box exceeds `threshold`
    pub fn apply_nms(mut self, threshold: f64) -> Self {
        if self.boxes.is_empty() {
            return self;
        }

        self.sort_by_score();

        let mut keep = Vec::new();
        let mut suppressed = vec![false; self.boxes.len()];

        for i in 0..self.boxes.len() {
            if suppressed[i] {
                continue;
            }

            keep.push(self.boxes[i].clone());

            for j in (i + 1)..self.boxes.len() {
                if !suppressed[j] && self.boxes[i].overlaps(&self.boxes[j], threshold) {
                    suppressed[j] = true;
                }
            }
        }

        Self::from_vec(keep)
    }

    /// Order boxes by the distance of their center to `(center_x, center_y)`
    pub fn sort_by_center_distance(mut self, center_x: f64, center_y: f64) -> Self {
        let target = Point::new(center_x, center_y);
        self.boxes
            .sort_by(|a, b| a.center().distance_to(&target).total_cmp(&b.center().distance_to(&target)));
        self
    }

    pub fn truncate(mut self, len: usize) -> Self {
        self.boxes.truncate(len);
        self
    }

    pub fn stats(&self) -> BBoxStats {
        let mut class_counts: HashMap<u32, usize> = HashMap::new();
        let mut total_score = 0.0;
        let mut max_score: f64 = 0.0;
        let mut min_score = f64::INFINITY;

        for bbox in &self.boxes {
            *class_counts.entry(bbox.class_id).or_insert(0) += 1;
            total_score += bbox.score;
            max_score = max_score.max(bbox.score);
            min_score = min_score.min(bbox.score);
        }

        let avg_score = if self.boxes.is_empty() {
            0.0
        } else {
            total_score / self.boxes.len() as f64
        };

        BBoxStats {
            total_boxes: self.boxes.len(),
            class_counts,
            avg_score,
            max_score,
            min_score: if min_score == f64::INFINITY { 0.0 } else { min_score },
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, BBox> {
        self.boxes.iter()
    }
}

impl IntoIterator for BBoxCollection {
    type Item = BBox;
    type IntoIter = std::vec::IntoIter<BBox>;

    fn into_iter(self) -> Self::IntoIter {
        self.boxes.into_iter()
    }
}

impl FromIterator<BBox> for BBoxCollection {
    fn from_iter<T: IntoIterator<Item = BBox>>(iter: T) -> Self {
        Self::from_vec(iter.into_iter().collect())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BBoxStats {
    pub total_boxes: usize,
    pub class_counts: HashMap<u32, usize>,
    pub avg_score: f64,
    pub max_score: f64,
    pub min_score: f64,
}
