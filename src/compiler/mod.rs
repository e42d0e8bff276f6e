//! Design compilation
//!
//! A [`DesignCompiler`] turns an editable [`Design`] into an immutable
//! artifact. The composition engine only relies on this trait, so any
//! artifact representation can be plugged in; [`StandardCompiler`] is the
//! built-in implementation producing [`CompiledReport`]s.

pub mod expr;
mod report;

use thiserror::Error;

use crate::design::{Design, Span};

pub use expr::{parameter_ref, parse_expression, Chunk, CompiledExpression, ExpressionError};
pub use report::{
    CompiledElement, CompiledReport, CompiledSection, StandardCompiler, SubreportSource,
};

/// Compiles designs into executable artifacts
pub trait DesignCompiler {
    /// Compiled form; cloned into every place the artifact is referenced
    type Artifact: Clone;

    fn compile(&self, design: &Design) -> Result<Self::Artifact, CompileError>;
}

impl<C: DesignCompiler + ?Sized> DesignCompiler for &C {
    type Artifact = C::Artifact;

    fn compile(&self, design: &Design) -> Result<Self::Artifact, CompileError> {
        (**self).compile(design)
    }
}

/// A single problem found while compiling
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub message: String,
    pub span: Option<Span>,
}

impl Diagnostic {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            span: None,
        }
    }

    pub fn at(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span: Some(span),
        }
    }
}

/// Compilation failure with every diagnostic that was found
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", format_diagnostics(.diagnostics))]
pub struct CompileError {
    pub diagnostics: Vec<Diagnostic>,
}

impl CompileError {
    pub fn new(diagnostics: Vec<Diagnostic>) -> Self {
        Self { diagnostics }
    }

    /// Create an error from a single message
    pub fn message(message: impl Into<String>) -> Self {
        Self::new(vec![Diagnostic::new(message)])
    }
}

fn format_diagnostics(diagnostics: &[Diagnostic]) -> String {
    diagnostics
        .iter()
        .map(|d| d.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_error_joins_diagnostics() {
        let err = CompileError::new(vec![
            Diagnostic::new("first"),
            Diagnostic::at("second", 3..5),
        ]);
        assert_eq!(err.to_string(), "first; second");
    }
}
