//! Error types for the annotation core.
//!
//! Editing operations never fail: missing frames, dots or annotations are
//! no-ops. Only file access and template validation report errors.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnnotationError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid annotation JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Unknown skeleton template: {0}")]
    UnknownTemplate(String),

    #[error("Template '{template}' has a line referencing unknown dot key '{key}'")]
    InvalidTemplate { template: String, key: String },
}

pub type Result<T> = std::result::Result<T, AnnotationError>;
