//! Annotation data model
//!
//! An [`AnnotationCollection`] holds every tracked subject. Each
//! [`Annotation`] keeps at most one [`AnnotationFrame`] per frame number, and
//! each frame owns its dots and the lines between them.
//!
//! Dot and line ids are unique within a frame. Propagating a frame copies ids
//! verbatim, so one dot id seen at several frame numbers of the same
//! annotation is the same tracked point over time. Dots are therefore always
//! addressed by annotation id, frame number and dot id together.

pub mod collection;
pub mod data;

pub use collection::AnnotationCollection;

use serde::{Deserialize, Serialize};

pub const NEW_DOT_COLOR: &str = "black";
pub const NEW_LINE_COLOR: &str = "#000000";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dot {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub color: String,
}

impl Dot {
    pub fn new(id: impl Into<String>, x: f64, y: f64, color: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            x,
            y,
            color: color.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineSegment {
    pub id: String,
    pub start_dot_id: String,
    pub end_dot_id: String,
    pub color: String,
}

impl LineSegment {
    pub fn new(
        id: impl Into<String>,
        start_dot_id: impl Into<String>,
        end_dot_id: impl Into<String>,
        color: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            start_dot_id: start_dot_id.into(),
            end_dot_id: end_dot_id.into(),
            color: color.into(),
        }
    }

    /// True if the line starts or ends at `dot_id`
    pub fn touches(&self, dot_id: &str) -> bool {
        self.start_dot_id == dot_id || self.end_dot_id == dot_id
    }
}

/// Dots and lines of one annotation at one frame number
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationFrame {
    pub frame: u32,
    #[serde(default)]
    pub dots: Vec<Dot>,
    #[serde(default)]
    pub lines: Vec<LineSegment>,
}

impl AnnotationFrame {
    pub fn new(frame: u32) -> Self {
        Self {
            frame,
            dots: Vec::new(),
            lines: Vec::new(),
        }
    }

    pub fn dot(&self, dot_id: &str) -> Option<&Dot> {
        self.dots.iter().find(|d| d.id == dot_id)
    }

    pub fn dot_mut(&mut self, dot_id: &str) -> Option<&mut Dot> {
        self.dots.iter_mut().find(|d| d.id == dot_id)
    }

    pub fn has_dot(&self, dot_id: &str) -> bool {
        self.dot(dot_id).is_some()
    }

    pub fn add_dot(&mut self, dot: Dot) {
        self.dots.push(dot);
    }

    pub fn add_line(&mut self, line: LineSegment) {
        self.lines.push(line);
    }

    /// Remove a dot together with every line touching it
    pub fn remove_dot(&mut self, dot_id: &str) {
        self.dots.retain(|d| d.id != dot_id);
        self.lines.retain(|l| !l.touches(dot_id));
    }

    pub fn remove_line(&mut self, line_id: &str) {
        self.lines.retain(|l| l.id != line_id);
    }

    /// Copy of this record placed at another frame number. Ids are kept.
    pub fn copied_to(&self, frame: u32) -> Self {
        Self {
            frame,
            dots: self.dots.clone(),
            lines: self.lines.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub id: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub frames: Vec<AnnotationFrame>,
}

impl Annotation {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            frames: Vec::new(),
        }
    }

    pub fn frame(&self, frame: u32) -> Option<&AnnotationFrame> {
        self.frames.iter().find(|f| f.frame == frame)
    }

    pub fn frame_mut(&mut self, frame: u32) -> Option<&mut AnnotationFrame> {
        self.frames.iter_mut().find(|f| f.frame == frame)
    }

    pub fn has_frame(&self, frame: u32) -> bool {
        self.frame(frame).is_some()
    }

    /// Record at `frame`, appended empty if missing
    pub fn upsert_frame(&mut self, frame: u32) -> &mut AnnotationFrame {
        let index = match self.frames.iter().position(|f| f.frame == frame) {
            Some(index) => index,
            None => {
                self.frames.push(AnnotationFrame::new(frame));
                self.frames.len() - 1
            }
        };
        &mut self.frames[index]
    }

    pub fn remove_frame(&mut self, frame: u32) {
        self.frames.retain(|f| f.frame != frame);
    }

    /// Zero frames, or a single frame without dots
    pub fn is_logically_empty(&self) -> bool {
        match self.frames.as_slice() {
            [] => true,
            [only] => only.dots.is_empty(),
            _ => false,
        }
    }
}

/// Addresses one dot: the owning annotation and the dot id. The frame is
/// implied by the context it is used in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DotRef {
    pub annotation_id: String,
    pub dot_id: String,
}

impl DotRef {
    pub fn new(annotation_id: impl Into<String>, dot_id: impl Into<String>) -> Self {
        Self {
            annotation_id: annotation_id.into(),
            dot_id: dot_id.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remove_dot_cascades_lines() {
        let mut frame = AnnotationFrame::new(1);
        frame.add_dot(Dot::new("a", 0.0, 0.0, "black"));
        frame.add_dot(Dot::new("b", 1.0, 1.0, "black"));
        frame.add_dot(Dot::new("c", 2.0, 2.0, "black"));
        frame.add_line(LineSegment::new("ab", "a", "b", NEW_LINE_COLOR));
        frame.add_line(LineSegment::new("bc", "b", "c", NEW_LINE_COLOR));
        frame.add_line(LineSegment::new("ca", "c", "a", NEW_LINE_COLOR));

        frame.remove_dot("b");

        assert_eq!(frame.dots.len(), 2);
        assert_eq!(frame.lines.len(), 1);
        assert_eq!(frame.lines[0].id, "ca");
    }

    #[test]
    fn test_upsert_frame_is_idempotent() {
        let mut ann = Annotation::new("ann", "");
        ann.upsert_frame(3).add_dot(Dot::new("a", 0.0, 0.0, "black"));
        ann.upsert_frame(3).add_dot(Dot::new("b", 0.0, 0.0, "black"));
        assert_eq!(ann.frames.len(), 1);
        assert_eq!(ann.frame(3).map(|f| f.dots.len()), Some(2));
    }

    #[test]
    fn test_logically_empty() {
        let mut ann = Annotation::new("ann", "");
        assert!(ann.is_logically_empty());
        ann.upsert_frame(0);
        assert!(ann.is_logically_empty());
        ann.upsert_frame(1);
        assert!(!ann.is_logically_empty());
    }

    #[test]
    fn test_line_serializes_camel_case() {
        let line = LineSegment::new("l", "a", "b", "#000000");
        let json = serde_json::to_string(&line).unwrap();
        assert!(json.contains("\"startDotId\":\"a\""));
        assert!(json.contains("\"endDotId\":\"b\""));
    }
}
