//! File-backed template store

use std::path::{Path, PathBuf};

use crate::design::{parse, Design};

use super::registry::{TemplateError, TemplateStore};

/// Default file extension for design sources
pub const DEFAULT_EXTENSION: &str = "rdl";

/// Loads `<base>/<name>.<extension>` on every lookup
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    base_path: PathBuf,
    extension: String,
}

impl DirectoryStore {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            extension: DEFAULT_EXTENSION.to_string(),
        }
    }

    /// Set the file extension (without the leading dot)
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Path a template name maps to, or `None` if the name cannot be a file name
    pub fn path_for(&self, name: &str) -> Option<PathBuf> {
        if name.is_empty()
            || name.contains(['/', '\\'])
            || name == "."
            || name == ".."
        {
            return None;
        }
        Some(
            self.base_path
                .join(format!("{}.{}", name, self.extension)),
        )
    }
}

impl TemplateStore for DirectoryStore {
    fn lookup(&self, name: &str) -> Result<Design, TemplateError> {
        let path = self
            .path_for(name)
            .ok_or_else(|| TemplateError::not_found(name))?;
        if !path.is_file() {
            return Err(TemplateError::not_found(name));
        }

        let source = std::fs::read_to_string(&path).map_err(|e| TemplateError::FileReadError {
            path: path.clone(),
            message: e.to_string(),
        })?;
        let design = parse(&source).map_err(|errors| TemplateError::Parse {
            name: name.to_string(),
            errors,
        })?;

        if design.name != name {
            tracing::warn!(
                template = name,
                declared = %design.name,
                path = %path.display(),
                "template file declares a different report name"
            );
        }
        tracing::debug!(template = name, path = %path.display(), "loaded template");
        Ok(design)
    }
}
