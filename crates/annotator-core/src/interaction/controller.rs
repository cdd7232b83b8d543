use super::{DEFAULT_CLICK_THRESHOLD_MS, DEFAULT_HIT_RADIUS, EventKind, InputEvent, Outcome};
use crate::geometry::{Point, SelectionBox, is_point_near_dot};
use crate::model::{AnnotationCollection, DotRef};
use tracing::debug;

/// A delete waiting for the user's confirmation, opened by a secondary click
#[derive(Debug, Clone, PartialEq)]
pub enum PendingDelete {
    Dot {
        dot: DotRef,
        screen_position: Point,
    },
    Line {
        annotation_id: String,
        line_id: String,
        screen_position: Point,
    },
    AllSelected {
        dots: Vec<DotRef>,
        screen_position: Point,
    },
}

impl PendingDelete {
    pub fn screen_position(&self) -> Point {
        match self {
            PendingDelete::Dot { screen_position, .. }
            | PendingDelete::Line { screen_position, .. }
            | PendingDelete::AllSelected { screen_position, .. } => *screen_position,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct BoxDrag {
    selection: SelectionBox,
    started_ms: u64,
}

#[derive(Debug, Clone, PartialEq)]
struct DotDrag {
    dot: DotRef,
    moved: bool,
}

/// Selection state machine over the dots of the current frame.
///
/// At most one dot is selected at a time. Picking a second dot draws a line
/// from the selected one and slides the window: the old dot becomes
/// `previous_dot`, the clicked one becomes the selection.
#[derive(Debug, Clone)]
pub struct InteractionController {
    hit_radius: f64,
    click_threshold_ms: u64,
    selected: Option<DotRef>,
    previous_dot: Option<DotRef>,
    box_selected: Vec<DotRef>,
    box_drag: Option<BoxDrag>,
    dot_drag: Option<DotDrag>,
    delete_line_id: Option<String>,
    pending_delete: Option<PendingDelete>,
}

impl InteractionController {
    pub fn new() -> Self {
        Self::with_thresholds(DEFAULT_HIT_RADIUS, DEFAULT_CLICK_THRESHOLD_MS)
    }

    pub fn with_thresholds(hit_radius: f64, click_threshold_ms: u64) -> Self {
        Self {
            hit_radius,
            click_threshold_ms,
            selected: None,
            previous_dot: None,
            box_selected: Vec::new(),
            box_drag: None,
            dot_drag: None,
            delete_line_id: None,
            pending_delete: None,
        }
    }

    pub fn selected(&self) -> Option<&DotRef> {
        self.selected.as_ref()
    }

    pub fn previous_dot(&self) -> Option<&DotRef> {
        self.previous_dot.as_ref()
    }

    pub fn box_selected(&self) -> &[DotRef] {
        &self.box_selected
    }

    /// The box being dragged, normalized
    pub fn selection_box(&self) -> Option<SelectionBox> {
        self.box_drag.as_ref().map(|d| d.selection.normalized())
    }

    pub fn is_selecting(&self) -> bool {
        self.box_drag.is_some()
    }

    pub fn is_dragging_dot(&self) -> bool {
        self.dot_drag.is_some()
    }

    pub fn delete_line_id(&self) -> Option<&str> {
        self.delete_line_id.as_deref()
    }

    pub fn pending_delete(&self) -> Option<&PendingDelete> {
        self.pending_delete.as_ref()
    }

    pub fn handle(
        &mut self,
        collection: &mut AnnotationCollection,
        frame: u32,
        event: &InputEvent,
    ) -> Outcome {
        match event.kind {
            EventKind::PrimaryClick => self.primary_click(collection, frame, event),
            EventKind::SecondaryClick => self.secondary_click(collection, frame, event),
            EventKind::MiddleClick => {
                let cleared = collection.clear_frame(frame);
                self.reset_all();
                if cleared {
                    debug!(frame, "cleared frame");
                    Outcome::FrameCleared
                } else {
                    Outcome::SelectionCleared
                }
            }
            EventKind::DragStart => self.drag_start(collection, frame, event),
            EventKind::DragMove => self.drag_move(collection, frame, event),
            EventKind::DragEnd => self.drag_end(collection, frame, event),
        }
    }

    /// Run the pending delete, if any
    pub fn confirm_delete(&mut self, collection: &mut AnnotationCollection, frame: u32) -> Outcome {
        let Some(pending) = self.pending_delete.take() else {
            return Outcome::Ignored;
        };

        let outcome = match pending {
            PendingDelete::Dot { dot, .. } => {
                collection.remove_dot(&dot.annotation_id, frame, &dot.dot_id);
                Outcome::DotDeleted(dot)
            }
            PendingDelete::Line {
                annotation_id,
                line_id,
                ..
            } => {
                collection.remove_line(&annotation_id, frame, &line_id);
                Outcome::LineDeleted(line_id)
            }
            PendingDelete::AllSelected { dots, .. } => {
                collection.remove_dots(frame, &dots);
                self.box_selected.clear();
                Outcome::SelectionDeleted { count: dots.len() }
            }
        };
        self.reset_selection();
        outcome
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    /// Forget everything tied to the current frame
    pub fn frame_changed(&mut self) {
        self.reset_all();
    }

    fn reset_selection(&mut self) {
        self.selected = None;
        self.previous_dot = None;
        self.delete_line_id = None;
        self.box_drag = None;
    }

    fn reset_all(&mut self) {
        self.reset_selection();
        self.box_selected.clear();
        self.dot_drag = None;
        self.pending_delete = None;
    }

    /// The dot under the pointer: the event's explicit target when it still
    /// exists at `frame`, else the first dot within the hit radius
    fn hit_dot(&self, collection: &AnnotationCollection, frame: u32, event: &InputEvent) -> Option<DotRef> {
        match &event.target_dot {
            Some(target) => collection
                .dot(&target.annotation_id, frame, &target.dot_id)
                .map(|_| target.clone()),
            None => collection.dot_near(frame, event.position, self.hit_radius),
        }
    }

    fn primary_click(
        &mut self,
        collection: &mut AnnotationCollection,
        frame: u32,
        event: &InputEvent,
    ) -> Outcome {
        if let Some(dot) = self.hit_dot(collection, frame, event) {
            return self.click_dot(collection, frame, dot);
        }
        if let Some(line_id) = &event.target_line {
            self.delete_line_id = Some(line_id.clone());
            return Outcome::LineMarked(line_id.clone());
        }
        if !self.box_selected.is_empty() {
            // releasing a box selection must not drop a dot
            return Outcome::Ignored;
        }

        let selection = self
            .selected
            .clone()
            .filter(|s| collection.dot(&s.annotation_id, frame, &s.dot_id).is_some());
        let Some(dot) = collection.add_dot(frame, event.position, selection.as_ref()) else {
            return Outcome::Ignored;
        };

        let line_id = match selection {
            Some(selected) => {
                let line_id = collection.add_line(&dot.annotation_id, frame, &selected.dot_id, &dot.dot_id);
                self.previous_dot = Some(selected);
                self.selected = Some(dot.clone());
                line_id
            }
            None => None,
        };
        debug!(frame, dot = %dot.dot_id, chained = line_id.is_some(), "added dot");
        Outcome::DotAdded { dot, line_id }
    }

    fn click_dot(&mut self, collection: &mut AnnotationCollection, frame: u32, clicked: DotRef) -> Outcome {
        let Some(selected) = self.selected.take().filter(|s| *s != clicked) else {
            self.selected = Some(clicked.clone());
            self.previous_dot = None;
            return Outcome::DotSelected(clicked);
        };

        let same_record = selected.annotation_id == clicked.annotation_id
            && collection
                .dot(&selected.annotation_id, frame, &selected.dot_id)
                .is_some();
        let line_id = if same_record {
            collection.add_line(&clicked.annotation_id, frame, &selected.dot_id, &clicked.dot_id)
        } else {
            None
        };

        self.previous_dot = Some(selected);
        self.selected = Some(clicked.clone());
        match line_id {
            Some(line_id) => Outcome::LineAdded {
                annotation_id: clicked.annotation_id,
                line_id,
            },
            None => Outcome::DotSelected(clicked),
        }
    }

    fn secondary_click(
        &mut self,
        collection: &mut AnnotationCollection,
        frame: u32,
        event: &InputEvent,
    ) -> Outcome {
        let screen_position = event.screen_position;

        // only an explicit target counts here; a bare canvas click near a
        // box-selected dot keeps the box selection instead
        let target = event
            .target_dot
            .clone()
            .filter(|t| collection.dot(&t.annotation_id, frame, &t.dot_id).is_some());
        if let Some(dot) = target {
            let pending = if self.box_selected.contains(&dot) {
                PendingDelete::AllSelected {
                    dots: self.box_selected.clone(),
                    screen_position,
                }
            } else {
                PendingDelete::Dot { dot, screen_position }
            };
            self.pending_delete = Some(pending.clone());
            return Outcome::ConfirmationRequested(pending);
        }

        if let Some(line_id) = &event.target_line {
            let Some(annotation_id) = collection.line_owner(frame, line_id) else {
                return Outcome::Ignored;
            };
            let pending = PendingDelete::Line {
                annotation_id: annotation_id.to_string(),
                line_id: line_id.clone(),
                screen_position,
            };
            self.pending_delete = Some(pending.clone());
            return Outcome::ConfirmationRequested(pending);
        }

        let near_box_selection = self.box_selected.iter().any(|r| {
            collection
                .dot(&r.annotation_id, frame, &r.dot_id)
                .is_some_and(|dot| is_point_near_dot(event.position, dot, self.hit_radius))
        });
        self.reset_selection();
        if !near_box_selection {
            self.box_selected.clear();
        }
        Outcome::SelectionCleared
    }

    fn drag_start(&mut self, collection: &mut AnnotationCollection, frame: u32, event: &InputEvent) -> Outcome {
        if let Some(dot) = self.hit_dot(collection, frame, event) {
            self.dot_drag = Some(DotDrag { dot, moved: false });
            return Outcome::Ignored;
        }

        self.box_drag = Some(BoxDrag {
            selection: SelectionBox::anchored_at(event.position),
            started_ms: event.timestamp_ms,
        });
        Outcome::Ignored
    }

    fn drag_move(&mut self, collection: &mut AnnotationCollection, frame: u32, event: &InputEvent) -> Outcome {
        if let Some(drag) = &mut self.dot_drag {
            let dot = &drag.dot;
            collection.move_dot(&dot.annotation_id, frame, &dot.dot_id, event.position.x, event.position.y);
            drag.moved = true;
            return Outcome::DotMoved(drag.dot.clone());
        }

        let threshold = self.click_threshold_ms;
        let Some(drag) = &mut self.box_drag else {
            return Outcome::Ignored;
        };
        if event.timestamp_ms.saturating_sub(drag.started_ms) <= threshold {
            return Outcome::Ignored;
        }

        drag.selection = drag.selection.stretched_to(event.position);
        self.box_selected = collection.dots_in_box(frame, &drag.selection);
        Outcome::BoxSelecting {
            count: self.box_selected.len(),
        }
    }

    fn drag_end(&mut self, collection: &mut AnnotationCollection, frame: u32, event: &InputEvent) -> Outcome {
        if let Some(drag) = self.dot_drag.take() {
            if drag.moved {
                let dot = &drag.dot;
                collection.move_dot(&dot.annotation_id, frame, &dot.dot_id, event.position.x, event.position.y);
            }
            return Outcome::DragFinished {
                dot: drag.dot,
                moved: drag.moved,
            };
        }

        let Some(drag) = self.box_drag.take() else {
            return Outcome::Ignored;
        };
        if event.timestamp_ms.saturating_sub(drag.started_ms) <= self.click_threshold_ms {
            return Outcome::Ignored;
        }

        let selection = drag.selection.stretched_to(event.position);
        self.box_selected = collection.dots_in_box(frame, &selection);
        debug!(frame, count = self.box_selected.len(), "box selection");
        Outcome::BoxSelected {
            count: self.box_selected.len(),
        }
    }
}

impl Default for InteractionController {
    fn default() -> Self {
        Self::new()
    }
}
