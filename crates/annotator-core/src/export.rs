//! Tabular projection of a collection: one row per dot and one per line.

use crate::model::AnnotationCollection;
use crate::time::frame_to_seconds;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DotRow {
    pub annotation_id: String,
    pub label: String,
    pub frame: u32,
    pub time_seconds: f64,
    pub dot_id: String,
    pub x: i64,
    pub y: i64,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineRow {
    pub annotation_id: String,
    pub label: String,
    pub frame: u32,
    pub time_seconds: f64,
    pub line_id: String,
    pub start_dot_id: String,
    pub end_dot_id: String,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ExportRows {
    pub dots: Vec<DotRow>,
    pub lines: Vec<LineRow>,
}

/// Dot rows in collection order; coordinates rounded to whole pixels
pub fn dot_rows(collection: &AnnotationCollection, fps: f64) -> Vec<DotRow> {
    let mut rows = Vec::with_capacity(collection.dot_count());
    for annotation in collection.iter() {
        for record in &annotation.frames {
            let time_seconds = frame_to_seconds(record.frame, fps);
            rows.extend(record.dots.iter().map(|dot| DotRow {
                annotation_id: annotation.id.clone(),
                label: annotation.label.clone(),
                frame: record.frame,
                time_seconds,
                dot_id: dot.id.clone(),
                x: dot.x.round() as i64,
                y: dot.y.round() as i64,
                color: dot.color.clone(),
            }));
        }
    }
    rows
}

pub fn line_rows(collection: &AnnotationCollection, fps: f64) -> Vec<LineRow> {
    let mut rows = Vec::with_capacity(collection.line_count());
    for annotation in collection.iter() {
        for record in &annotation.frames {
            let time_seconds = frame_to_seconds(record.frame, fps);
            rows.extend(record.lines.iter().map(|line| LineRow {
                annotation_id: annotation.id.clone(),
                label: annotation.label.clone(),
                frame: record.frame,
                time_seconds,
                line_id: line.id.clone(),
                start_dot_id: line.start_dot_id.clone(),
                end_dot_id: line.end_dot_id.clone(),
                color: line.color.clone(),
            }));
        }
    }
    rows
}

pub fn export_rows(collection: &AnnotationCollection, fps: f64) -> ExportRows {
    ExportRows {
        dots: dot_rows(collection, fps),
        lines: line_rows(collection, fps),
    }
}
