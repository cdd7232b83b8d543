//! Loading and saving the annotation JSON interchange file

use super::AnnotationCollection;
use crate::error::{AnnotationError, Result};
use std::fs;
use std::path::Path;
use tracing::info;

impl AnnotationCollection {
    /// Read a collection from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| AnnotationError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let collection: AnnotationCollection =
            serde_json::from_str(&text).map_err(|source| AnnotationError::Json {
                path: path.to_path_buf(),
                source,
            })?;

        info!(
            "Loaded {} annotations ({} dots, {} lines) from {}",
            collection.len(),
            collection.dot_count(),
            collection.line_count(),
            path.display()
        );
        Ok(collection)
    }

    /// Load a collection, or start empty when the file does not exist yet
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            Ok(Self::new())
        }
    }

    /// Write the collection as pretty-printed JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self).map_err(|source| AnnotationError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, json).map_err(|source| AnnotationError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        info!("Saved {} annotations to {}", self.len(), path.display());
        Ok(())
    }
}
