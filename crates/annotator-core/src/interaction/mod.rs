//! Pointer-driven editing
//!
//! Input arrives as [`InputEvent`]s, a tagged union of the pointer gestures
//! the canvas understands. The [`InteractionController`] turns them into
//! store operations and reports what happened as an [`Outcome`].

pub mod controller;

pub use controller::{InteractionController, PendingDelete};

use crate::geometry::Point;
use crate::model::DotRef;

pub const DEFAULT_HIT_RADIUS: f64 = 8.0;
pub const DEFAULT_CLICK_THRESHOLD_MS: u64 = 300;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    PrimaryClick,
    SecondaryClick,
    MiddleClick,
    DragStart,
    DragMove,
    DragEnd,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InputEvent {
    pub kind: EventKind,
    /// Canvas coordinates
    pub position: Point,
    /// Window coordinates, where confirmation popups open
    pub screen_position: Point,
    pub target_dot: Option<DotRef>,
    pub target_line: Option<String>,
    pub timestamp_ms: u64,
}

impl InputEvent {
    pub fn new(kind: EventKind, position: Point) -> Self {
        Self {
            kind,
            position,
            screen_position: position,
            target_dot: None,
            target_line: None,
            timestamp_ms: 0,
        }
    }

    pub fn primary_click(x: f64, y: f64) -> Self {
        Self::new(EventKind::PrimaryClick, Point::new(x, y))
    }

    pub fn secondary_click(x: f64, y: f64) -> Self {
        Self::new(EventKind::SecondaryClick, Point::new(x, y))
    }

    pub fn middle_click(x: f64, y: f64) -> Self {
        Self::new(EventKind::MiddleClick, Point::new(x, y))
    }

    pub fn drag_start(x: f64, y: f64) -> Self {
        Self::new(EventKind::DragStart, Point::new(x, y))
    }

    pub fn drag_move(x: f64, y: f64) -> Self {
        Self::new(EventKind::DragMove, Point::new(x, y))
    }

    pub fn drag_end(x: f64, y: f64) -> Self {
        Self::new(EventKind::DragEnd, Point::new(x, y))
    }

    pub fn on_dot(mut self, dot: DotRef) -> Self {
        self.target_dot = Some(dot);
        self
    }

    pub fn on_line(mut self, line_id: impl Into<String>) -> Self {
        self.target_line = Some(line_id.into());
        self
    }

    pub fn at_screen(mut self, x: f64, y: f64) -> Self {
        self.screen_position = Point::new(x, y);
        self
    }

    pub fn at_time(mut self, timestamp_ms: u64) -> Self {
        self.timestamp_ms = timestamp_ms;
        self
    }
}

/// What handling an event did
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Ignored,
    DotAdded { dot: DotRef, line_id: Option<String> },
    DotSelected(DotRef),
    LineAdded { annotation_id: String, line_id: String },
    LineMarked(String),
    ConfirmationRequested(PendingDelete),
    SelectionCleared,
    FrameCleared,
    BoxSelecting { count: usize },
    BoxSelected { count: usize },
    DotMoved(DotRef),
    DragFinished { dot: DotRef, moved: bool },
    DotDeleted(DotRef),
    LineDeleted(String),
    SelectionDeleted { count: usize },
}

impl Outcome {
    /// History label for outcomes that changed the collection
    pub fn action(&self) -> Option<&'static str> {
        match self {
            Outcome::DotAdded { line_id: None, .. } => Some("Add dot"),
            Outcome::DotAdded { line_id: Some(_), .. } => Some("Add dot and line"),
            Outcome::LineAdded { .. } => Some("Add line"),
            Outcome::FrameCleared => Some("Clear frame"),
            Outcome::DragFinished { moved: true, .. } => Some("Move dot"),
            Outcome::DotDeleted(_) => Some("Delete dot"),
            Outcome::LineDeleted(_) => Some("Delete line"),
            Outcome::SelectionDeleted { .. } => Some("Delete selected dots"),
            _ => None,
        }
    }
}
