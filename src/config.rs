//! Composer configuration loaded from TOML
//!
//! ```toml
//! [templates]
//! directory = "templates"
//! extension = "rdl"
//!
//! [composition]
//! nested = true
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::template::DEFAULT_EXTENSION;

/// Errors that can occur when loading configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse config TOML: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Settings for template lookup and composition
#[derive(Debug, Clone, PartialEq)]
pub struct ComposerConfig {
    /// Directory holding sub-report templates
    pub template_dir: Option<PathBuf>,
    /// File extension of template sources
    pub extension: String,
    /// Compose placeholders inside sub-templates too
    pub nested: bool,
}

/// TOML structure for deserializing configuration
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlConfig {
    templates: Option<TomlTemplates>,
    composition: Option<TomlComposition>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlTemplates {
    directory: Option<PathBuf>,
    extension: Option<String>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlComposition {
    nested: Option<bool>,
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self {
            template_dir: None,
            extension: DEFAULT_EXTENSION.to_string(),
            nested: false,
        }
    }
}

impl ComposerConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a TOML file
    ///
    /// A relative template directory is resolved against the file's directory.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config = Self::from_str(&content)?;
        if let Some(parent) = path.parent() {
            config.template_dir = config.template_dir.take().map(|dir| {
                if dir.is_relative() {
                    parent.join(dir)
                } else {
                    dir
                }
            });
        }
        Ok(config)
    }

    /// Load configuration from a TOML string
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let parsed: TomlConfig = toml::from_str(content)?;
        let defaults = Self::default();

        let (template_dir, extension) = match parsed.templates {
            Some(t) => (t.directory, t.extension.unwrap_or(defaults.extension)),
            None => (None, defaults.extension),
        };
        let nested = parsed
            .composition
            .and_then(|c| c.nested)
            .unwrap_or(defaults.nested);

        Ok(ComposerConfig {
            template_dir,
            extension,
            nested,
        })
    }

    /// Set the template directory
    pub fn with_template_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.template_dir = Some(dir.into());
        self
    }

    /// Set the template file extension
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    /// Enable or disable nested composition
    pub fn with_nested(mut self, nested: bool) -> Self {
        self.nested = nested;
        self
    }
}
