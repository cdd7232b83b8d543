use super::DEFAULT_HISTORY_CAPACITY;
use crate::model::AnnotationCollection;
use serde::Serialize;
use std::collections::VecDeque;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::debug;

/// One snapshot of the whole collection
#[derive(Debug, Clone)]
pub struct HistoryState {
    pub annotations: AnnotationCollection,
    /// Milliseconds since the Unix epoch
    pub timestamp: u64,
    pub action: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryInfo {
    pub can_undo: bool,
    pub can_redo: bool,
    pub current_action: String,
    pub total_states: usize,
}

/// Linear snapshot history with a cursor.
///
/// Every collection going in or coming out is an independent clone, so
/// later edits never reach a stored snapshot. Saving after an undo discards
/// the redo branch. Past `capacity` entries the oldest one is evicted.
#[derive(Debug, Clone)]
pub struct UndoRedoManager {
    history: VecDeque<HistoryState>,
    current_index: Option<usize>,
    capacity: usize,
}

impl UndoRedoManager {
    /// New history holding `initial` as its "Initial state" entry
    pub fn new(initial: &AnnotationCollection) -> Self {
        Self::with_capacity(initial, DEFAULT_HISTORY_CAPACITY)
    }

    pub fn with_capacity(initial: &AnnotationCollection, capacity: usize) -> Self {
        let mut manager = Self {
            history: VecDeque::new(),
            current_index: None,
            capacity: capacity.max(1),
        };
        manager.save_state(initial, "Initial state");
        manager
    }

    pub fn save_state(&mut self, annotations: &AnnotationCollection, action: &str) {
        let keep = self.current_index.map_or(0, |i| i + 1);
        self.history.truncate(keep);

        self.history.push_back(HistoryState {
            annotations: annotations.clone(),
            timestamp: now_millis(),
            action: action.to_string(),
        });
        let mut index = self.history.len() - 1;

        if self.history.len() > self.capacity {
            self.history.pop_front();
            index -= 1;
        }
        self.current_index = Some(index);

        debug!(action, states = self.history.len(), "saved history state");
    }

    pub fn undo(&mut self) -> Option<AnnotationCollection> {
        if !self.can_undo() {
            return None;
        }
        let index = self.current_index? - 1;
        self.current_index = Some(index);
        self.history.get(index).map(|s| s.annotations.clone())
    }

    pub fn redo(&mut self) -> Option<AnnotationCollection> {
        if !self.can_redo() {
            return None;
        }
        let index = self.current_index? + 1;
        self.current_index = Some(index);
        self.history.get(index).map(|s| s.annotations.clone())
    }

    pub fn can_undo(&self) -> bool {
        self.current_index.is_some_and(|i| i > 0)
    }

    pub fn can_redo(&self) -> bool {
        self.current_index
            .is_some_and(|i| i + 1 < self.history.len())
    }

    /// Clone of the entry under the cursor, empty when the history is cleared
    pub fn current_state(&self) -> AnnotationCollection {
        self.current_index
            .and_then(|i| self.history.get(i))
            .map(|s| s.annotations.clone())
            .unwrap_or_default()
    }

    pub fn history_info(&self) -> HistoryInfo {
        let current_action = self
            .current_index
            .and_then(|i| self.history.get(i))
            .map_or_else(|| "Initial state".to_string(), |s| s.action.clone());

        HistoryInfo {
            can_undo: self.can_undo(),
            can_redo: self.can_redo(),
            current_action,
            total_states: self.history.len(),
        }
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn clear(&mut self) {
        self.history.clear();
        self.current_index = None;
    }

    /// Drop all history and start over from `annotations`
    pub fn reset(&mut self, annotations: &AnnotationCollection) {
        self.clear();
        self.save_state(annotations, "Reset");
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
