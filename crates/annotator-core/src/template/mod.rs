//! Skeleton templates
//!
//! A template is a fixed dot/line graph (a COCO body pose, a hand, a face)
//! whose lines refer to dots by template-local keys. Applying it centers the
//! graph on a point and produces real dots and lines with fresh ids.

pub mod builtin;
pub mod loader;

pub use builtin::{builtin_templates, find_builtin};
pub use loader::TemplateLoader;

use crate::error::{AnnotationError, Result};
use crate::ids::generate_unique_id;
use crate::model::{Dot, LineSegment};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::warn;

pub const TEMPLATE_DOT_COLOR: &str = "red";
pub const TEMPLATE_LINE_COLOR: &str = "#000000";
pub const DEFAULT_CENTER: (f64, f64) = (400.0, 300.0);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateDot {
    pub id: String,
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateLine {
    pub start_dot_id: String,
    pub end_dot_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkeletonTemplate {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub dots: Vec<TemplateDot>,
    #[serde(default)]
    pub lines: Vec<TemplateLine>,
}

/// Dots and lines produced from a template, ready for the store
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct TemplateResult {
    pub dots: Vec<Dot>,
    pub lines: Vec<LineSegment>,
}

impl SkeletonTemplate {
    /// Mean position of the template dots, `None` for an empty template
    pub fn centroid(&self) -> Option<(f64, f64)> {
        if self.dots.is_empty() {
            return None;
        }
        let n = self.dots.len() as f64;
        let sx: f64 = self.dots.iter().map(|d| d.x).sum();
        let sy: f64 = self.dots.iter().map(|d| d.y).sum();
        Some((sx / n, sy / n))
    }

    /// Every line endpoint must name a template dot
    pub fn validate(&self) -> Result<()> {
        for line in &self.lines {
            for key in [&line.start_dot_id, &line.end_dot_id] {
                if !self.dots.iter().any(|d| &d.id == key) {
                    return Err(AnnotationError::InvalidTemplate {
                        template: self.id.clone(),
                        key: key.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Instantiate the template with its centroid moved to
    /// `(center_x, center_y)`.
    ///
    /// Lines naming an unknown dot key are dropped with a warning, since a
    /// line must never reference a dot missing from its frame.
    pub fn apply(&self, center_x: f64, center_y: f64) -> TemplateResult {
        let Some((cx, cy)) = self.centroid() else {
            return TemplateResult::default();
        };
        let (offset_x, offset_y) = (center_x - cx, center_y - cy);

        let dots: Vec<Dot> = self
            .dots
            .iter()
            .map(|d| Dot::new(generate_unique_id(), d.x + offset_x, d.y + offset_y, TEMPLATE_DOT_COLOR))
            .collect();

        let id_map: HashMap<&str, &str> = self
            .dots
            .iter()
            .zip(&dots)
            .map(|(t, d)| (t.id.as_str(), d.id.as_str()))
            .collect();

        let mut lines = Vec::with_capacity(self.lines.len());
        for line in &self.lines {
            match (
                id_map.get(line.start_dot_id.as_str()),
                id_map.get(line.end_dot_id.as_str()),
            ) {
                (Some(start), Some(end)) => lines.push(LineSegment::new(
                    generate_unique_id(),
                    *start,
                    *end,
                    TEMPLATE_LINE_COLOR,
                )),
                _ => warn!(
                    template = %self.id,
                    start = %line.start_dot_id,
                    end = %line.end_dot_id,
                    "dropping template line with unknown endpoint"
                ),
            }
        }

        TemplateResult { dots, lines }
    }

    /// Apply at the default canvas position (400, 300)
    pub fn apply_default(&self) -> TemplateResult {
        self.apply(DEFAULT_CENTER.0, DEFAULT_CENTER.1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> SkeletonTemplate {
        SkeletonTemplate {
            id: "tri".into(),
            name: "Triangle".into(),
            description: String::new(),
            dots: vec![
                TemplateDot { id: "a".into(), x: 0.0, y: 0.0, label: "A".into() },
                TemplateDot { id: "b".into(), x: 6.0, y: 0.0, label: "B".into() },
                TemplateDot { id: "c".into(), x: 0.0, y: 9.0, label: "C".into() },
            ],
            lines: vec![
                TemplateLine { start_dot_id: "a".into(), end_dot_id: "b".into(), label: None },
                TemplateLine { start_dot_id: "b".into(), end_dot_id: "c".into(), label: None },
            ],
        }
    }

    #[test]
    fn test_apply_centers_template() {
        let result = triangle().apply(100.0, 50.0);
        let n = result.dots.len() as f64;
        let cx: f64 = result.dots.iter().map(|d| d.x).sum::<f64>() / n;
        let cy: f64 = result.dots.iter().map(|d| d.y).sum::<f64>() / n;
        assert!((cx - 100.0).abs() < 1e-9);
        assert!((cy - 50.0).abs() < 1e-9);
        // Relative layout is preserved
        assert_eq!(result.dots[1].x - result.dots[0].x, 6.0);
    }

    #[test]
    fn test_apply_rewrites_line_endpoints() {
        let result = triangle().apply_default();
        assert_eq!(result.lines.len(), 2);
        assert_eq!(result.lines[0].start_dot_id, result.dots[0].id);
        assert_eq!(result.lines[0].end_dot_id, result.dots[1].id);
        assert_eq!(result.lines[1].end_dot_id, result.dots[2].id);
        assert!(result.dots.iter().all(|d| d.color == TEMPLATE_DOT_COLOR));
        assert!(result.lines.iter().all(|l| l.color == TEMPLATE_LINE_COLOR));
    }

    #[test]
    fn test_unknown_endpoint_is_dropped_and_invalid() {
        let mut template = triangle();
        template.lines.push(TemplateLine {
            start_dot_id: "a".into(),
            end_dot_id: "nowhere".into(),
            label: None,
        });
        assert!(matches!(
            template.validate(),
            Err(AnnotationError::InvalidTemplate { .. })
        ));
        assert_eq!(template.apply(0.0, 0.0).lines.len(), 2);
    }

    #[test]
    fn test_empty_template() {
        let mut template = triangle();
        template.dots.clear();
        template.lines.clear();
        assert_eq!(template.apply(1.0, 1.0), TemplateResult::default());
    }
}
