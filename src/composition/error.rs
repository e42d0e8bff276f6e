//! Error types for report composition

use thiserror::Error;

use crate::compiler::CompileError;
use crate::design::{ElementRef, Span, ValueType};
use crate::template::TemplateError;

/// Errors that abort a composition
///
/// No partial package is ever returned alongside any of these.
#[derive(Debug, Error)]
pub enum ComposeError {
    /// A placeholder names a template the store does not have
    #[error("referenced sub-template not found: {name}")]
    ReferenceNotFound { name: String, span: Span },

    /// A placeholder expression is not a quoted template name
    #[error("malformed sub-report reference `{expression}`: {reason}")]
    MalformedReference {
        expression: String,
        reason: String,
        span: Span,
    },

    /// The compiler rejected a resolved sub-template
    #[error("failed to compile sub-template '{name}': {source}")]
    SubCompileFailure { name: String, source: CompileError },

    /// The compiler rejected the rewritten master design
    #[error("failed to compile master report '{name}': {source}")]
    MasterCompileFailure { name: String, source: CompileError },

    /// The binding name is already used by a parameter this composition did not create
    #[error("cannot bind sub-report '{name}': parameter already declared as {existing}")]
    DuplicateBindingConflict {
        name: String,
        existing: ValueType,
        span: Span,
    },

    /// A template references itself, directly or through other templates
    #[error("circular sub-report reference: {}", chain.join(" -> "))]
    CircularReference { chain: Vec<String> },

    /// The store failed for a reason other than a missing template
    #[error("failed to load sub-template '{name}': {source}")]
    Store { name: String, source: TemplateError },

    /// A rewrite targeted an element that is not a sub-report placeholder
    #[error("no sub-report placeholder at section {}, element {}", .at.section, .at.index)]
    UnknownPlaceholder { at: ElementRef },
}

impl ComposeError {
    pub fn not_found(name: impl Into<String>, span: Span) -> Self {
        Self::ReferenceNotFound {
            name: name.into(),
            span,
        }
    }

    pub fn malformed(expression: impl Into<String>, reason: impl Into<String>, span: Span) -> Self {
        Self::MalformedReference {
            expression: expression.into(),
            reason: reason.into(),
            span,
        }
    }

    pub fn circular(chain: Vec<String>) -> Self {
        Self::CircularReference { chain }
    }

    /// Get the source span in the offending design if available
    pub fn span(&self) -> Option<&Span> {
        match self {
            Self::ReferenceNotFound { span, .. } => Some(span),
            Self::MalformedReference { span, .. } => Some(span),
            Self::DuplicateBindingConflict { span, .. } => Some(span),
            _ => None,
        }
    }

    /// Name of the template the failure is attributed to, if any
    pub fn template_name(&self) -> Option<&str> {
        match self {
            Self::ReferenceNotFound { name, .. }
            | Self::SubCompileFailure { name, .. }
            | Self::MasterCompileFailure { name, .. }
            | Self::DuplicateBindingConflict { name, .. }
            | Self::Store { name, .. } => Some(name),
            _ => None,
        }
    }
}
