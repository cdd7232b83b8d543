//! Annotation core
//!
//! Frame-indexed keypoint annotations, the editing operations over them, the
//! pointer-driven interaction controller, a bounded undo/redo history and
//! skeleton templates.

pub mod error;
pub mod export;
pub mod geometry;
pub mod history;
pub mod ids;
pub mod interaction;
pub mod model;
pub mod session;
pub mod template;
pub mod time;

// Re-export commonly used types
pub use error::{AnnotationError, Result};
pub use geometry::{Point, SelectionBox};
pub use history::{HistoryInfo, UndoRedoManager};
pub use interaction::{EventKind, InputEvent, InteractionController, Outcome, PendingDelete};
pub use model::{Annotation, AnnotationCollection, AnnotationFrame, Dot, DotRef, LineSegment};
pub use session::{Session, SessionConfig};
pub use template::{SkeletonTemplate, TemplateResult};
