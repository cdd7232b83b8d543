//! The annotation store: every annotation of a video and the editing
//! operations over them.
//!
//! Operations are total. Addressing a missing annotation, frame, dot or line
//! leaves the collection untouched so the editing loop is never interrupted.

use super::{Annotation, AnnotationFrame, Dot, DotRef, LineSegment, NEW_DOT_COLOR, NEW_LINE_COLOR};
use crate::geometry::{Point, SelectionBox, is_dot_inside_box, is_point_near_dot};
use crate::ids::generate_unique_id;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnnotationCollection {
    annotations: Vec<Annotation>,
}

impl AnnotationCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_vec(annotations: Vec<Annotation>) -> Self {
        Self { annotations }
    }

    pub fn into_vec(self) -> Vec<Annotation> {
        self.annotations
    }

    pub fn as_slice(&self) -> &[Annotation] {
        &self.annotations
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Annotation> {
        self.annotations.iter()
    }

    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }

    pub fn push(&mut self, annotation: Annotation) {
        self.annotations.push(annotation);
    }

    // ---- Queries ----

    pub fn find(&self, annotation_id: &str) -> Option<&Annotation> {
        self.annotations.iter().find(|a| a.id == annotation_id)
    }

    pub fn find_mut(&mut self, annotation_id: &str) -> Option<&mut Annotation> {
        self.annotations.iter_mut().find(|a| a.id == annotation_id)
    }

    pub fn frame_record(&self, annotation_id: &str, frame: u32) -> Option<&AnnotationFrame> {
        self.find(annotation_id)?.frame(frame)
    }

    fn frame_record_mut(&mut self, annotation_id: &str, frame: u32) -> Option<&mut AnnotationFrame> {
        self.find_mut(annotation_id)?.frame_mut(frame)
    }

    pub fn dot(&self, annotation_id: &str, frame: u32, dot_id: &str) -> Option<&Dot> {
        self.frame_record(annotation_id, frame)?.dot(dot_id)
    }

    /// Annotations holding a record at `frame`
    pub fn annotations_at(&self, frame: u32) -> impl Iterator<Item = &Annotation> + '_ {
        self.annotations.iter().filter(move |a| a.has_frame(frame))
    }

    /// Every dot visible at `frame` with its owning annotation id
    pub fn dots_at(&self, frame: u32) -> impl Iterator<Item = (&str, &Dot)> + '_ {
        self.annotations.iter().flat_map(move |a| {
            a.frame(frame)
                .into_iter()
                .flat_map(|f| f.dots.iter())
                .map(move |d| (a.id.as_str(), d))
        })
    }

    /// First dot at `frame` strictly within `radius` of `point`
    pub fn dot_near(&self, frame: u32, point: Point, radius: f64) -> Option<DotRef> {
        self.dots_at(frame)
            .find(|(_, dot)| is_point_near_dot(point, dot, radius))
            .map(|(annotation_id, dot)| DotRef::new(annotation_id, dot.id.clone()))
    }

    /// Dots at `frame` inside `selection` (normalized first)
    pub fn dots_in_box(&self, frame: u32, selection: &SelectionBox) -> Vec<DotRef> {
        let normalized = selection.normalized();
        self.dots_at(frame)
            .filter(|(_, dot)| is_dot_inside_box(dot, &normalized))
            .map(|(annotation_id, dot)| DotRef::new(annotation_id, dot.id.clone()))
            .collect()
    }

    /// Annotation owning the line `line_id` at `frame`
    pub fn line_owner(&self, frame: u32, line_id: &str) -> Option<&str> {
        self.annotations_at(frame)
            .find(|a| {
                a.frame(frame)
                    .is_some_and(|f| f.lines.iter().any(|l| l.id == line_id))
            })
            .map(|a| a.id.as_str())
    }

    pub fn dot_count(&self) -> usize {
        self.annotations
            .iter()
            .flat_map(|a| a.frames.iter())
            .map(|f| f.dots.len())
            .sum()
    }

    pub fn line_count(&self) -> usize {
        self.annotations
            .iter()
            .flat_map(|a| a.frames.iter())
            .map(|f| f.lines.len())
            .sum()
    }

    // ---- Mutations ----

    /// Place a new dot at `point`.
    ///
    /// Without a selection a new unlabeled annotation is created around the
    /// dot. With a selected dot the new dot joins the selected dot's
    /// annotation at `frame`. No line is ever created here.
    pub fn add_dot(&mut self, frame: u32, point: Point, selection: Option<&DotRef>) -> Option<DotRef> {
        let dot = Dot::new(generate_unique_id(), point.x, point.y, NEW_DOT_COLOR);
        let dot_id = dot.id.clone();

        match selection {
            None => {
                let mut annotation = Annotation::new(generate_unique_id(), "");
                annotation.upsert_frame(frame).add_dot(dot);
                let annotation_id = annotation.id.clone();
                self.annotations.push(annotation);
                debug!(frame, %annotation_id, "created annotation for new dot");
                Some(DotRef::new(annotation_id, dot_id))
            }
            Some(selected) => {
                let annotation = self.find_mut(&selected.annotation_id)?;
                annotation.upsert_frame(frame).add_dot(dot);
                Some(DotRef::new(selected.annotation_id.clone(), dot_id))
            }
        }
    }

    /// Append a line between two dots of one frame record.
    ///
    /// Both dots must already exist in that record; this is the caller's
    /// responsibility. No-op when the record is missing.
    pub fn add_line(
        &mut self,
        annotation_id: &str,
        frame: u32,
        start_dot_id: &str,
        end_dot_id: &str,
    ) -> Option<String> {
        let record = self.frame_record_mut(annotation_id, frame)?;
        let line = LineSegment::new(generate_unique_id(), start_dot_id, end_dot_id, NEW_LINE_COLOR);
        let line_id = line.id.clone();
        record.add_line(line);
        Some(line_id)
    }

    /// Remove a dot and every line touching it. When the record runs out of
    /// dots the whole annotation is removed, not just the frame.
    pub fn remove_dot(&mut self, annotation_id: &str, frame: u32, dot_id: &str) {
        let Some(record) = self.frame_record_mut(annotation_id, frame) else {
            return;
        };
        record.remove_dot(dot_id);

        if record.dots.is_empty() {
            debug!(frame, annotation_id, "last dot removed, dropping annotation");
            self.remove_annotation(annotation_id);
        }
    }

    pub fn remove_line(&mut self, annotation_id: &str, frame: u32, line_id: &str) {
        if let Some(record) = self.frame_record_mut(annotation_id, frame) {
            record.remove_line(line_id);
        }
    }

    /// Batch delete for a box selection: removes the selected dots at `frame`
    /// and the lines touching them, drops records at `frame` left without
    /// dots, then drops annotations left without frames.
    pub fn remove_dots(&mut self, frame: u32, selected: &[DotRef]) {
        if selected.is_empty() {
            return;
        }
        let selected: HashSet<(&str, &str)> = selected
            .iter()
            .map(|r| (r.annotation_id.as_str(), r.dot_id.as_str()))
            .collect();

        for annotation in &mut self.annotations {
            let annotation_id = annotation.id.as_str();
            if let Some(record) = annotation.frames.iter_mut().find(|f| f.frame == frame) {
                let doomed: HashSet<String> = record
                    .dots
                    .iter()
                    .filter(|d| selected.contains(&(annotation_id, d.id.as_str())))
                    .map(|d| d.id.clone())
                    .collect();
                if doomed.is_empty() {
                    continue;
                }
                record.dots.retain(|d| !doomed.contains(&d.id));
                record
                    .lines
                    .retain(|l| !doomed.contains(&l.start_dot_id) && !doomed.contains(&l.end_dot_id));
            }
            annotation
                .frames
                .retain(|f| !(f.frame == frame && f.dots.is_empty()));
        }

        self.annotations.retain(|a| !a.frames.is_empty());
    }

    /// Drag update. No-op when the dot does not exist.
    pub fn move_dot(&mut self, annotation_id: &str, frame: u32, dot_id: &str, x: f64, y: f64) {
        if let Some(dot) = self
            .frame_record_mut(annotation_id, frame)
            .and_then(|f| f.dot_mut(dot_id))
        {
            dot.x = x;
            dot.y = y;
        }
    }

    /// Copy the nearest earlier annotated frame into `current_frame`.
    ///
    /// Scans backwards from `current_frame - 1` for a frame number that any
    /// annotation has a record for. Frame 0 is never used as a source. Every
    /// annotation with a record at the source frame gets its record at
    /// `current_frame` replaced by a copy. Dot and line ids are kept so the
    /// copied dots track the same points. Returns the source frame.
    pub fn propagate_previous_frame(&mut self, current_frame: u32) -> Option<u32> {
        let source = (0..current_frame)
            .rev()
            .find(|&f| self.annotations.iter().any(|a| a.has_frame(f)))?;
        if source == 0 {
            return None;
        }

        for annotation in &mut self.annotations {
            let Some(copy) = annotation.frame(source).map(|f| f.copied_to(current_frame)) else {
                continue;
            };
            annotation.remove_frame(current_frame);
            annotation.frames.push(copy);
        }

        debug!(source, current_frame, "propagated annotations");
        Some(source)
    }

    /// Returns true if the label changed
    pub fn set_label(&mut self, annotation_id: &str, label: &str) -> bool {
        match self.find_mut(annotation_id) {
            Some(annotation) if annotation.label != label => {
                annotation.label = label.to_string();
                true
            }
            _ => false,
        }
    }

    /// Returns true if the annotation existed
    pub fn remove_annotation(&mut self, annotation_id: &str) -> bool {
        let before = self.annotations.len();
        self.annotations.retain(|a| a.id != annotation_id);
        self.annotations.len() != before
    }

    /// Delete every annotation's record at `frame`, dropping annotations that
    /// are left without frames. Returns true if any record was removed.
    pub fn clear_frame(&mut self, frame: u32) -> bool {
        let mut cleared = false;
        for annotation in &mut self.annotations {
            if annotation.has_frame(frame) {
                annotation.remove_frame(frame);
                cleared = true;
            }
        }
        self.annotations.retain(|a| !a.frames.is_empty());
        cleared
    }

    /// Insert generated dots and lines (edge detection or a skeleton
    /// template) as a new annotation at `frame`.
    ///
    /// Dot and line ids are replaced by fresh ones. Lines whose endpoints are
    /// not among `dots` are dropped. Returns the new annotation id, or `None`
    /// when there are no dots.
    pub fn merge_detection(
        &mut self,
        frame: u32,
        dots: &[Dot],
        lines: &[LineSegment],
        label: &str,
    ) -> Option<String> {
        if dots.is_empty() {
            return None;
        }

        let mut id_map: HashMap<&str, String> = HashMap::with_capacity(dots.len());
        let mut record = AnnotationFrame::new(frame);
        for dot in dots {
            let fresh = generate_unique_id();
            id_map.insert(dot.id.as_str(), fresh.clone());
            record.add_dot(Dot::new(fresh, dot.x, dot.y, dot.color.clone()));
        }
        for line in lines {
            let endpoints = id_map
                .get(line.start_dot_id.as_str())
                .zip(id_map.get(line.end_dot_id.as_str()));
            if let Some((start, end)) = endpoints {
                record.add_line(LineSegment::new(
                    generate_unique_id(),
                    start.clone(),
                    end.clone(),
                    line.color.clone(),
                ));
            }
        }

        let mut annotation = Annotation::new(generate_unique_id(), label);
        annotation.frames.push(record);
        let annotation_id = annotation.id.clone();
        self.annotations.push(annotation);
        Some(annotation_id)
    }

    /// Drop annotations that are logically empty
    pub fn prune_empty(&mut self) {
        self.annotations.retain(|a| !a.is_logically_empty());
    }
}

impl IntoIterator for AnnotationCollection {
    type Item = Annotation;
    type IntoIter = std::vec::IntoIter<Annotation>;

    fn into_iter(self) -> Self::IntoIter {
        self.annotations.into_iter()
    }
}

impl FromIterator<Annotation> for AnnotationCollection {
    fn from_iter<T: IntoIterator<Item = Annotation>>(iter: T) -> Self {
        Self::from_vec(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// One annotation "ann" at frame 1 with dots a, b, c and lines a-b, b-c
    fn sample() -> AnnotationCollection {
        let mut ann = Annotation::new("ann", "person");
        let record = ann.upsert_frame(1);
        record.add_dot(Dot::new("a", 10.0, 10.0, "black"));
        record.add_dot(Dot::new("b", 20.0, 20.0, "black"));
        record.add_dot(Dot::new("c", 30.0, 30.0, "black"));
        record.add_line(LineSegment::new("ab", "a", "b", "#000000"));
        record.add_line(LineSegment::new("bc", "b", "c", "#000000"));
        AnnotationCollection::from_vec(vec![ann])
    }

    #[test]
    fn test_add_dot_without_selection_creates_annotation() {
        let mut c = AnnotationCollection::new();
        let added = c.add_dot(1, Point::new(10.0, 20.0), None).unwrap();

        assert_eq!(c.len(), 1);
        let ann = &c.as_slice()[0];
        assert_eq!(ann.id, added.annotation_id);
        assert_eq!(ann.label, "");
        assert_eq!(ann.frames.len(), 1);
        assert_eq!(ann.frames[0].frame, 1);
        assert_eq!(ann.frames[0].dots.len(), 1);
        assert_eq!((ann.frames[0].dots[0].x, ann.frames[0].dots[0].y), (10.0, 20.0));
        assert!(ann.frames[0].lines.is_empty());
    }

    #[test]
    fn test_add_dot_with_selection_joins_annotation() {
        let mut c = sample();
        let selected = DotRef::new("ann", "a");

        c.add_dot(1, Point::new(5.0, 5.0), Some(&selected)).unwrap();
        c.add_dot(2, Point::new(6.0, 6.0), Some(&selected)).unwrap();

        assert_eq!(c.len(), 1);
        assert_eq!(c.frame_record("ann", 1).unwrap().dots.len(), 4);
        assert_eq!(c.frame_record("ann", 2).unwrap().dots.len(), 1);
        assert_eq!(c.line_count(), 2);
    }

    #[test]
    fn test_add_dot_with_stale_selection_is_noop() {
        let mut c = sample();
        let before = c.clone();
        assert!(c.add_dot(1, Point::new(0.0, 0.0), Some(&DotRef::new("gone", "x"))).is_none());
        assert_eq!(c, before);
    }

    #[test]
    fn test_add_line_requires_frame() {
        let mut c = sample();
        assert!(c.add_line("ann", 1, "a", "c").is_some());
        assert!(c.add_line("ann", 9, "a", "c").is_none());
        assert!(c.add_line("nope", 1, "a", "c").is_none());
        assert_eq!(c.line_count(), 3);
    }

    #[test]
    fn test_remove_dot_cascades() {
        let mut c = sample();
        c.remove_dot("ann", 1, "b");
        let record = c.frame_record("ann", 1).unwrap();
        assert_eq!(record.dots.len(), 2);
        assert!(record.lines.iter().all(|l| !l.touches("b")));
        assert!(record.lines.is_empty());
    }

    #[test]
    fn test_remove_last_dot_drops_annotation() {
        let mut c = sample();
        // A second frame does not keep the annotation alive
        c.find_mut("ann")
            .unwrap()
            .upsert_frame(2)
            .add_dot(Dot::new("z", 0.0, 0.0, "black"));

        c.remove_dot("ann", 1, "a");
        c.remove_dot("ann", 1, "b");
        assert_eq!(c.len(), 1);
        c.remove_dot("ann", 1, "c");
        assert!(c.is_empty());
    }

    #[test]
    fn test_remove_line_keeps_dots() {
        let mut c = sample();
        c.remove_line("ann", 1, "ab");
        let record = c.frame_record("ann", 1).unwrap();
        assert_eq!(record.dots.len(), 3);
        assert_eq!(record.lines.len(), 1);
    }

    #[test]
    fn test_remove_dots_prunes_frame_and_annotation() {
        let mut c = sample();
        let mut other = Annotation::new("other", "");
        other.upsert_frame(1).add_dot(Dot::new("o", 1.0, 1.0, "black"));
        other.upsert_frame(2).add_dot(Dot::new("o", 1.0, 1.0, "black"));
        c.push(other);

        c.remove_dots(
            1,
            &[
                DotRef::new("ann", "a"),
                DotRef::new("ann", "b"),
                DotRef::new("ann", "c"),
                DotRef::new("other", "o"),
            ],
        );

        // "ann" lost its only frame, "other" keeps frame 2
        assert!(c.find("ann").is_none());
        let other = c.find("other").unwrap();
        assert!(!other.has_frame(1));
        assert!(other.has_frame(2));
    }

    #[test]
    fn test_remove_dots_partial() {
        let mut c = sample();
        c.remove_dots(1, &[DotRef::new("ann", "a")]);
        let record = c.frame_record("ann", 1).unwrap();
        assert_eq!(record.dots.len(), 2);
        assert_eq!(record.lines.len(), 1);
        assert_eq!(record.lines[0].id, "bc");
    }

    #[test]
    fn test_move_dot() {
        let mut c = sample();
        c.move_dot("ann", 1, "a", 99.0, 98.0);
        let dot = c.dot("ann", 1, "a").unwrap();
        assert_eq!((dot.x, dot.y), (99.0, 98.0));

        let before = c.clone();
        c.move_dot("ann", 7, "a", 0.0, 0.0);
        c.move_dot("ann", 1, "missing", 0.0, 0.0);
        assert_eq!(c, before);
    }

    #[test]
    fn test_propagate_copies_nearest_earlier_frame() {
        let mut c = AnnotationCollection::new();
        let mut ann = Annotation::new("ann", "");
        ann.upsert_frame(3).add_dot(Dot::new("a", 1.0, 2.0, "black"));
        c.push(ann);

        assert_eq!(c.propagate_previous_frame(5), Some(3));
        let ann = c.find("ann").unwrap();
        assert!(!ann.has_frame(4));
        assert_eq!(ann.frame(5).unwrap().dots, ann.frame(3).unwrap().dots);

        // The copy is independent of the source
        c.move_dot("ann", 5, "a", 50.0, 50.0);
        assert_eq!(c.dot("ann", 3, "a").unwrap().x, 1.0);
    }

    #[test]
    fn test_propagate_replaces_existing_record() {
        let mut c = sample();
        c.find_mut("ann")
            .unwrap()
            .upsert_frame(4)
            .add_dot(Dot::new("old", 0.0, 0.0, "black"));

        assert_eq!(c.propagate_previous_frame(6), Some(4));
        assert_eq!(c.propagate_previous_frame(4), Some(1));
        let ann = c.find("ann").unwrap();
        assert_eq!(ann.frames.iter().filter(|f| f.frame == 4).count(), 1);
        assert_eq!(ann.frame(4).unwrap().dots.len(), 3);
        assert_eq!(ann.frame(4).unwrap().lines.len(), 2);
    }

    #[test]
    fn test_propagate_ignores_frame_zero_and_empty() {
        let mut c = AnnotationCollection::new();
        assert_eq!(c.propagate_previous_frame(5), None);

        let mut ann = Annotation::new("ann", "");
        ann.upsert_frame(0).add_dot(Dot::new("a", 1.0, 2.0, "black"));
        c.push(ann);
        assert_eq!(c.propagate_previous_frame(3), None);
        assert!(!c.find("ann").unwrap().has_frame(3));
    }

    #[test]
    fn test_clear_frame() {
        let mut c = sample();
        let mut other = Annotation::new("other", "");
        other.upsert_frame(1).add_dot(Dot::new("o", 1.0, 1.0, "black"));
        other.upsert_frame(2).add_dot(Dot::new("o", 1.0, 1.0, "black"));
        c.push(other);

        assert!(c.clear_frame(1));
        assert_eq!(c.len(), 1);
        assert_eq!(c.as_slice()[0].id, "other");
        assert_eq!(c.annotations_at(1).count(), 0);
        assert!(!c.clear_frame(1));
    }

    #[test]
    fn test_label_and_remove_annotation() {
        let mut c = sample();
        assert!(c.set_label("ann", "runner"));
        assert_eq!(c.find("ann").unwrap().label, "runner");
        assert!(!c.set_label("ann", "runner"));
        assert!(!c.set_label("missing", "x"));
        assert!(!c.remove_annotation("missing"));
        assert_eq!(c.len(), 1);
        assert!(c.remove_annotation("ann"));
        assert!(c.is_empty());
    }

    #[test]
    fn test_merge_detection_rekeys_ids() {
        let mut c = sample();
        let dots = vec![
            Dot::new("d0", 1.0, 1.0, "blue"),
            Dot::new("d1", 2.0, 2.0, "blue"),
        ];
        let lines = vec![
            LineSegment::new("l0", "d0", "d1", "#0066cc"),
            LineSegment::new("l1", "d0", "missing", "#0066cc"),
        ];

        let id = c.merge_detection(1, &dots, &lines, "edges").unwrap();
        let record = c.frame_record(&id, 1).unwrap();
        assert_eq!(record.dots.len(), 2);
        assert_eq!(record.lines.len(), 1);
        assert!(record.dots.iter().all(|d| d.id != "d0" && d.id != "d1"));
        let line = &record.lines[0];
        assert!(record.has_dot(&line.start_dot_id));
        assert!(record.has_dot(&line.end_dot_id));

        assert!(c.merge_detection(1, &[], &[], "edges").is_none());
    }

    #[test]
    fn test_hit_testing_queries() {
        let c = sample();
        assert_eq!(
            c.dot_near(1, Point::new(12.0, 12.0), 8.0),
            Some(DotRef::new("ann", "a"))
        );
        assert_eq!(c.dot_near(2, Point::new(12.0, 12.0), 8.0), None);

        let inside = c.dots_in_box(1, &SelectionBox::new(25.0, 25.0, -10.0, -10.0));
        assert_eq!(inside, vec![DotRef::new("ann", "b")]);
        assert_eq!(c.line_owner(1, "bc"), Some("ann"));
        assert_eq!(c.line_owner(2, "bc"), None);
    }
}
