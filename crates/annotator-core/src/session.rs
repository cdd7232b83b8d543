//! One editing session: the collection, the controller working on it, the
//! undo history and the frame being edited.

use crate::error::Result;
use crate::history::{DEFAULT_HISTORY_CAPACITY, HistoryInfo, UndoRedoManager};
use crate::interaction::{
    DEFAULT_CLICK_THRESHOLD_MS, DEFAULT_HIT_RADIUS, InputEvent, InteractionController, Outcome,
};
use crate::model::{AnnotationCollection, Dot, LineSegment};
use crate::template::find_builtin;
use crate::time::{DEFAULT_FPS, seconds_to_frame};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub fps: f64,
    pub history_enabled: bool,
    pub history_capacity: usize,
    pub hit_radius: f64,
    pub click_threshold_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            fps: DEFAULT_FPS,
            history_enabled: true,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            hit_radius: DEFAULT_HIT_RADIUS,
            click_threshold_ms: DEFAULT_CLICK_THRESHOLD_MS,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Session {
    collection: AnnotationCollection,
    controller: InteractionController,
    history: Option<UndoRedoManager>,
    current_frame: u32,
    config: SessionConfig,
}

impl Session {
    pub fn new(config: SessionConfig) -> Self {
        Self::with_collection(AnnotationCollection::new(), config)
    }

    pub fn with_collection(collection: AnnotationCollection, config: SessionConfig) -> Self {
        let history = config
            .history_enabled
            .then(|| UndoRedoManager::with_capacity(&collection, config.history_capacity));
        Self {
            collection,
            controller: InteractionController::with_thresholds(config.hit_radius, config.click_threshold_ms),
            history,
            current_frame: 0,
            config,
        }
    }

    pub fn collection(&self) -> &AnnotationCollection {
        &self.collection
    }

    pub fn into_collection(self) -> AnnotationCollection {
        self.collection
    }

    pub fn controller(&self) -> &InteractionController {
        &self.controller
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn current_frame(&self) -> u32 {
        self.current_frame
    }

    /// Move to another frame, dropping any selection made on the old one
    pub fn set_frame(&mut self, frame: u32) {
        if frame != self.current_frame {
            self.controller.frame_changed();
            self.current_frame = frame;
        }
    }

    /// Move to the frame shown at a playback position
    pub fn seek(&mut self, played_seconds: f64) {
        self.set_frame(seconds_to_frame(played_seconds, self.config.fps));
    }

    pub fn handle(&mut self, event: &InputEvent) -> Outcome {
        let outcome = self
            .controller
            .handle(&mut self.collection, self.current_frame, event);
        self.record_outcome(&outcome);
        outcome
    }

    pub fn confirm_delete(&mut self) -> Outcome {
        let outcome = self
            .controller
            .confirm_delete(&mut self.collection, self.current_frame);
        self.record_outcome(&outcome);
        outcome
    }

    pub fn cancel_delete(&mut self) {
        self.controller.cancel_delete();
    }

    /// Copy the nearest earlier annotated frame into the current one
    pub fn propagate_previous_frame(&mut self) -> Option<u32> {
        let source = self.collection.propagate_previous_frame(self.current_frame)?;
        self.record("Propagate previous frame");
        Some(source)
    }

    /// Only edits that changed the collection are recorded, so a no-op
    /// keeps the redo history
    pub fn clear_frame(&mut self) -> bool {
        self.controller.frame_changed();
        let cleared = self.collection.clear_frame(self.current_frame);
        if cleared {
            self.record("Clear frame");
        }
        cleared
    }

    pub fn set_label(&mut self, annotation_id: &str, label: &str) -> bool {
        let changed = self.collection.set_label(annotation_id, label);
        if changed {
            self.record("Set label");
        }
        changed
    }

    pub fn remove_annotation(&mut self, annotation_id: &str) -> bool {
        let removed = self.collection.remove_annotation(annotation_id);
        if removed {
            self.controller.frame_changed();
            self.record("Remove annotation");
        }
        removed
    }

    /// Insert detected dots and lines as a new annotation at the current frame
    pub fn merge_detection(&mut self, dots: &[Dot], lines: &[LineSegment], label: &str) -> Option<String> {
        let annotation_id = self
            .collection
            .merge_detection(self.current_frame, dots, lines, label)?;
        self.record("Detect keypoints");
        Some(annotation_id)
    }

    /// Instantiate a built-in template centered on `(center_x, center_y)` as
    /// a new annotation at the current frame
    pub fn apply_template(&mut self, template_id: &str, center_x: f64, center_y: f64) -> Result<Option<String>> {
        let template = find_builtin(template_id)?;
        let result = template.apply(center_x, center_y);
        let annotation_id = self
            .collection
            .merge_detection(self.current_frame, &result.dots, &result.lines, &template.name);
        if annotation_id.is_some() {
            info!(template = template_id, frame = self.current_frame, "applied template");
            self.record(&format!("Apply {}", template.name));
        }
        Ok(annotation_id)
    }

    pub fn undo(&mut self) -> bool {
        let Some(previous) = self.history.as_mut().and_then(|h| h.undo()) else {
            return false;
        };
        self.collection = previous;
        self.controller.frame_changed();
        true
    }

    pub fn redo(&mut self) -> bool {
        let Some(next) = self.history.as_mut().and_then(|h| h.redo()) else {
            return false;
        };
        self.collection = next;
        self.controller.frame_changed();
        true
    }

    pub fn can_undo(&self) -> bool {
        self.history.as_ref().is_some_and(|h| h.can_undo())
    }

    pub fn can_redo(&self) -> bool {
        self.history.as_ref().is_some_and(|h| h.can_redo())
    }

    pub fn history_info(&self) -> Option<HistoryInfo> {
        self.history.as_ref().map(|h| h.history_info())
    }

    fn record_outcome(&mut self, outcome: &Outcome) {
        if let Some(action) = outcome.action() {
            self.record(action);
        }
    }

    fn record(&mut self, action: &str) {
        self.collection.prune_empty();
        debug!(action, frame = self.current_frame, "recording history");
        if let Some(history) = &mut self.history {
            history.save_state(&self.collection, action);
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}
