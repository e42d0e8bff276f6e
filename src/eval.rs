//! Expression evaluation against fill-time values
//!
//! Renderers look expression values up through [`ExpressionEvaluator`].
//! [`ParameterEvaluator`] answers from a merged parameter map (see
//! [`ComposedReport::parameters`](crate::composition::ComposedReport::parameters))
//! and the fields of the object being reported on.

use std::collections::HashMap;

use crate::compiler::{parse_expression, Chunk};
use crate::composition::ParameterValue;

/// Evaluates report expressions
pub trait ExpressionEvaluator {
    type Value;

    /// Value of an expression, or `None` if it cannot be evaluated
    fn value(&self, expression: &str) -> Option<Self::Value>;

    /// Value of an expression formatted for display
    fn formatted_value(&self, expression: &str) -> String;
}

/// Evaluator over parameter and field maps
///
/// A lone `$P{..}` or `$F{..}` reference yields the referenced value, a
/// quoted literal yields its text, and anything else is interpolated into
/// text. Unknown references evaluate to nothing.
#[derive(Debug)]
pub struct ParameterEvaluator<'a, A> {
    parameters: &'a HashMap<String, ParameterValue<A>>,
    fields: &'a HashMap<String, ParameterValue<A>>,
}

impl<'a, A: Clone> ParameterEvaluator<'a, A> {
    pub fn new(
        parameters: &'a HashMap<String, ParameterValue<A>>,
        fields: &'a HashMap<String, ParameterValue<A>>,
    ) -> Self {
        Self { parameters, fields }
    }

    fn lookup(&self, chunk: &Chunk) -> Option<&'a ParameterValue<A>> {
        match chunk {
            Chunk::Parameter(name) => self.parameters.get(name),
            Chunk::Field(path) => self.fields.get(path),
            Chunk::Text(_) => None,
        }
    }
}

impl<A: Clone> ExpressionEvaluator for ParameterEvaluator<'_, A> {
    type Value = ParameterValue<A>;

    fn value(&self, expression: &str) -> Option<ParameterValue<A>> {
        let compiled = match parse_expression(expression) {
            Ok(compiled) => compiled,
            Err(e) => {
                tracing::debug!(expression, error = %e, "cannot evaluate expression");
                return None;
            }
        };

        let meaningful: Vec<&Chunk> = compiled
            .chunks
            .iter()
            .filter(|c| !matches!(c, Chunk::Text(t) if t.trim().is_empty()))
            .collect();

        match meaningful.as_slice() {
            [] => None,
            [Chunk::Text(text)] => {
                let text = text.trim();
                let literal = text
                    .strip_prefix('"')
                    .and_then(|t| t.strip_suffix('"'))
                    .unwrap_or(text);
                Some(ParameterValue::Text(literal.to_string()))
            }
            [reference] => self.lookup(reference).cloned(),
            _ => {
                let mut out = String::new();
                for chunk in &compiled.chunks {
                    match chunk {
                        Chunk::Text(text) => out.push_str(text),
                        reference => {
                            if let Some(value) = self.lookup(reference) {
                                out.push_str(&value.to_string());
                            }
                        }
                    }
                }
                Some(ParameterValue::Text(out))
            }
        }
    }

    fn formatted_value(&self, expression: &str) -> String {
        self.value(expression)
            .map(|v| v.to_string())
            .unwrap_or_default()
    }
}
