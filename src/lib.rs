//! Report Composer - composes master report designs with embedded sub-reports
//!
//! A master design embeds child reports through placeholders that name a
//! stored template. Composition resolves every placeholder, compiles the
//! referenced templates, rewires each placeholder to a `report` parameter
//! and finally compiles the master.
//!
//! # Example
//!
//! ```rust
//! use report_composer::{compose, TemplateRegistry};
//!
//! let mut store = TemplateRegistry::new();
//! store
//!     .register_source(r#"report "InvoiceLines" { section detail { text "line" } }"#)
//!     .unwrap();
//!
//! let package = compose(
//!     r#"report "Invoice" { section detail { subreport `"InvoiceLines"` } }"#,
//!     &store,
//! )
//! .unwrap();
//!
//! assert_eq!(package.report().name(), "Invoice");
//! assert_eq!(package.subreports()[0].name(), "InvoiceLines");
//! ```

pub mod compiler;
pub mod composition;
pub mod config;
pub mod design;
pub mod error;
pub mod eval;
pub mod template;

pub use compiler::{CompileError, CompiledReport, DesignCompiler, StandardCompiler};
pub use composition::{ComposeError, ComposedReport, Composer, ParameterValue};
pub use config::{ComposerConfig, ConfigError};
pub use design::{parse, Design};
pub use error::ParseError;
pub use eval::{ExpressionEvaluator, ParameterEvaluator};
pub use template::{DirectoryStore, TemplateError, TemplateRegistry, TemplateStore};

use thiserror::Error;

/// Errors that can occur while composing from source
#[derive(Debug, Error)]
pub enum ReportError {
    /// Error parsing the master design
    #[error("parse errors: {}", format_parse_errors(.0))]
    Parse(Vec<ParseError>),

    /// Error during composition
    #[error("composition error: {0}")]
    Compose(#[from] ComposeError),
}

impl From<Vec<ParseError>> for ReportError {
    fn from(errors: Vec<ParseError>) -> Self {
        ReportError::Parse(errors)
    }
}

pub(crate) fn format_parse_errors(errors: &[ParseError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Parse a master design and compose it with the built-in compiler
pub fn compose<S: TemplateStore>(
    source: &str,
    store: S,
) -> Result<ComposedReport<CompiledReport>, ReportError> {
    compose_with_config(source, store, &ComposerConfig::default())
}

/// Parse a master design and compose it using `config`
///
/// Only the composition settings of `config` apply here; the template
/// directory is for callers that build a [`DirectoryStore`] from it.
pub fn compose_with_config<S: TemplateStore>(
    source: &str,
    store: S,
    config: &ComposerConfig,
) -> Result<ComposedReport<CompiledReport>, ReportError> {
    let design = parse(source)?;
    let composer = Composer::new(store, StandardCompiler).with_nested(config.nested);
    Ok(composer.compose(design)?)
}
