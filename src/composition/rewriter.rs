//! Design rewriting - binds placeholders to runtime parameters
//!
//! A compiled report cannot be embedded inside another design by value.
//! Instead each placeholder's static reference is replaced with a
//! `report`-typed parameter reference and the parameter is declared on the
//! design; the compiled sub-report is supplied under that name at fill time.

use std::collections::HashSet;

use crate::compiler::parameter_ref;
use crate::design::{Design, Element, Expression, Identifier, ParameterDecl, Spanned, ValueType};

use super::error::ComposeError;
use super::scanner::Placeholder;

/// Rewrites the placeholders of one design
///
/// Tracks the parameters it declared so binding the same name twice is a
/// no-op, while a clash with a pre-existing declaration is an error.
#[derive(Debug, Default)]
pub struct DesignRewriter {
    declared: HashSet<String>,
}

impl DesignRewriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `placeholder` in `design` to the parameter `name`
    pub fn bind(
        &mut self,
        design: &mut Design,
        placeholder: &Placeholder,
        name: &str,
    ) -> Result<(), ComposeError> {
        if !self.declared.contains(name) {
            if let Some(existing) = design.parameter(name) {
                return Err(ComposeError::DuplicateBindingConflict {
                    name: name.to_string(),
                    existing: existing.value_type,
                    span: placeholder.span.clone(),
                });
            }
        }

        match design.element_mut(placeholder.at).map(|e| &mut e.node) {
            Some(Element::Subreport(sub)) => {
                sub.expression = Expression::typed(parameter_ref(name), ValueType::Report);
            }
            _ => return Err(ComposeError::UnknownPlaceholder { at: placeholder.at }),
        }

        if self.declared.insert(name.to_string()) {
            design.parameters.push(Spanned::new(
                ParameterDecl {
                    name: Identifier::new(name),
                    value_type: ValueType::Report,
                },
                placeholder.span.clone(),
            ));
        }
        Ok(())
    }
}
