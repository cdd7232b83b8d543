//! Bounded undo/redo history

pub mod manager;

pub use manager::{HistoryInfo, HistoryState, UndoRedoManager};

pub const DEFAULT_HISTORY_CAPACITY: usize = 50;
