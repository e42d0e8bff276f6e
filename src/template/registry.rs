//! Template stores for looking up designs by name

use std::collections::HashMap;
use std::path::PathBuf;
use thiserror::Error;

use crate::design::{parse, Design};
use crate::ParseError;

/// Errors that can occur during template operations
#[derive(Debug, Error)]
pub enum TemplateError {
    /// Template not found in the store
    #[error("template not found: {name}")]
    NotFound { name: String },

    /// Duplicate template definition
    #[error("duplicate template definition: {name}")]
    Duplicate { name: String },

    /// Error reading template file
    #[error("error reading template file {path}: {message}")]
    FileReadError { path: PathBuf, message: String },

    /// Template source does not parse
    #[error("template {name} does not parse: {}", crate::format_parse_errors(.errors))]
    Parse {
        name: String,
        errors: Vec<ParseError>,
    },
}

impl TemplateError {
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound { name: name.into() }
    }
}

/// Source of sub-report designs, looked up by template name
///
/// Each lookup hands out a fresh design the caller may mutate freely.
pub trait TemplateStore {
    fn lookup(&self, name: &str) -> Result<Design, TemplateError>;
}

impl<S: TemplateStore + ?Sized> TemplateStore for &S {
    fn lookup(&self, name: &str) -> Result<Design, TemplateError> {
        (**self).lookup(name)
    }
}

impl<S: TemplateStore + ?Sized> TemplateStore for Box<S> {
    fn lookup(&self, name: &str) -> Result<Design, TemplateError> {
        (**self).lookup(name)
    }
}

/// In-memory registry of designs keyed by report name
#[derive(Debug, Default, Clone)]
pub struct TemplateRegistry {
    templates: HashMap<String, Design>,
}

impl TemplateRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a design under its report name
    pub fn register(&mut self, design: Design) -> Result<(), TemplateError> {
        if self.templates.contains_key(&design.name) {
            return Err(TemplateError::Duplicate { name: design.name });
        }
        self.templates.insert(design.name.clone(), design);
        Ok(())
    }

    /// Parse design source and register the result
    pub fn register_source(&mut self, source: &str) -> Result<(), TemplateError> {
        let design = parse(source).map_err(|errors| TemplateError::Parse {
            name: "<source>".to_string(),
            errors,
        })?;
        self.register(design)
    }

    /// Get a template by name
    pub fn get(&self, name: &str) -> Option<&Design> {
        self.templates.get(name)
    }

    /// Check if a template exists
    pub fn contains(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }

    /// Get all template names
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.templates.keys().map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

impl TemplateStore for TemplateRegistry {
    fn lookup(&self, name: &str) -> Result<Design, TemplateError> {
        self.get(name)
            .cloned()
            .ok_or_else(|| TemplateError::not_found(name))
    }
}
