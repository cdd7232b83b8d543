//! Loading user skeleton templates from JSON files

use super::{SkeletonTemplate, builtin::find_builtin};
use crate::error::{AnnotationError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Searches template directories for `<id>.json` files, falling back to the
/// built-in templates
pub struct TemplateLoader {
    template_dirs: Vec<PathBuf>,
    supported_extensions: Vec<String>,
}

impl TemplateLoader {
    pub fn new() -> Self {
        Self {
            template_dirs: Vec::new(),
            supported_extensions: vec!["json".to_string()],
        }
    }

    pub fn add_template_dir<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.template_dirs.push(dir.as_ref().to_path_buf());
        self
    }

    /// Load a template by id from the directories (case-insensitive file
    /// match), then from the built-ins
    pub fn load_template(&self, id: &str) -> Result<SkeletonTemplate> {
        for candidate in self.generate_template_candidates(id) {
            if let Some(path) = self.find_template_file(&candidate) {
                return Self::read_template(&path);
            }
        }
        find_builtin(id)
    }

    /// Every parseable template file in the directories
    pub fn load_all_templates(&self) -> Result<Vec<SkeletonTemplate>> {
        let mut templates = Vec::new();

        for dir in &self.template_dirs {
            if !dir.exists() {
                continue;
            }
            let entries = fs::read_dir(dir).map_err(|source| AnnotationError::Io {
                path: dir.clone(),
                source,
            })?;

            for entry in entries.flatten() {
                let path = entry.path();
                let supported = path
                    .extension()
                    .map(|ext| ext.to_string_lossy().to_lowercase())
                    .is_some_and(|ext| self.supported_extensions.contains(&ext));
                if supported {
                    templates.push(Self::read_template(&path)?);
                }
            }
        }

        info!("Loaded {} templates from disk", templates.len());
        Ok(templates)
    }

    fn read_template(path: &Path) -> Result<SkeletonTemplate> {
        let text = fs::read_to_string(path).map_err(|source| AnnotationError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let template: SkeletonTemplate =
            serde_json::from_str(&text).map_err(|source| AnnotationError::Json {
                path: path.to_path_buf(),
                source,
            })?;
        template.validate()?;
        debug!(id = %template.id, path = %path.display(), "read template");
        Ok(template)
    }

    fn generate_template_candidates(&self, id: &str) -> Vec<String> {
        self.supported_extensions
            .iter()
            .flat_map(|ext| [format!("{}.{}", id, ext), format!("{}.{}", id.to_lowercase(), ext)])
            .collect()
    }

    fn find_template_file(&self, candidate: &str) -> Option<PathBuf> {
        for dir in &self.template_dirs {
            let path = dir.join(candidate);
            if path.exists() {
                return Some(path);
            }

            if let Ok(entries) = fs::read_dir(dir) {
                for entry in entries.flatten() {
                    let file_name = entry.file_name();
                    if file_name.to_string_lossy().to_lowercase() == candidate.to_lowercase() {
                        return Some(entry.path());
                    }
                }
            }
        }
        None
    }
}

impl Default for TemplateLoader {
    fn default() -> Self {
        Self::new()
    }
}
