//! Built-in compiler producing shareable compiled reports

use std::collections::HashSet;
use std::sync::Arc;

use crate::design::{
    Design, Element, Expression, ParameterDecl, SectionKind, Span, ValueType,
};

use super::expr::{parse_expression, CompiledExpression};
use super::{CompileError, DesignCompiler, Diagnostic};

/// Where a compiled sub-report element gets its report from
#[derive(Debug, Clone, PartialEq)]
pub enum SubreportSource {
    /// Compiled report supplied at fill time through a `report` parameter
    Parameter(String),
    /// Static expression left for the renderer to interpret
    Expression(CompiledExpression),
}

#[derive(Debug, Clone, PartialEq)]
pub enum CompiledElement {
    StaticText(String),
    TextField {
        expression: CompiledExpression,
        value_type: ValueType,
    },
    Subreport(SubreportSource),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompiledSection {
    pub kind: SectionKind,
    pub elements: Vec<CompiledElement>,
}

#[derive(Debug, PartialEq)]
struct CompiledDesign {
    name: String,
    parameters: Vec<ParameterDecl>,
    sections: Vec<CompiledSection>,
}

/// Immutable, executable form of a design
///
/// Clones share the same compiled data. Equality compares compiled content,
/// so compiling the same design twice yields equal reports.
#[derive(Debug, Clone)]
pub struct CompiledReport {
    inner: Arc<CompiledDesign>,
}

impl PartialEq for CompiledReport {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner) || self.inner == other.inner
    }
}

impl CompiledReport {
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn parameters(&self) -> &[ParameterDecl] {
        &self.inner.parameters
    }

    pub fn parameter(&self, name: &str) -> Option<&ParameterDecl> {
        self.inner
            .parameters
            .iter()
            .find(|p| p.name.as_str() == name)
    }

    pub fn sections(&self) -> &[CompiledSection] {
        &self.inner.sections
    }

    /// Parameters that sub-report elements expect to be filled with reports
    pub fn subreport_parameters(&self) -> Vec<&str> {
        self.inner
            .sections
            .iter()
            .flat_map(|s| s.elements.iter())
            .filter_map(|e| match e {
                CompiledElement::Subreport(SubreportSource::Parameter(name)) => {
                    Some(name.as_str())
                }
                _ => None,
            })
            .collect()
    }

    /// True when both handles share the same compiled data
    pub fn same_artifact(&self, other: &CompiledReport) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

/// Default [`DesignCompiler`]
///
/// Validates the whole design and reports every problem at once.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardCompiler;

impl StandardCompiler {
    pub fn new() -> Self {
        Self
    }
}

impl DesignCompiler for StandardCompiler {
    type Artifact = CompiledReport;

    fn compile(&self, design: &Design) -> Result<CompiledReport, CompileError> {
        let mut checker = Checker {
            design,
            diagnostics: Vec::new(),
        };

        if design.name.trim().is_empty() {
            checker.report(Diagnostic::new("report name must not be empty"));
        }
        checker.check_parameters();

        let mut sections = Vec::with_capacity(design.sections.len());
        for section in &design.sections {
            let mut elements = Vec::with_capacity(section.elements.len());
            for element in &section.elements {
                if let Some(compiled) = checker.compile_element(&element.node, &element.span) {
                    elements.push(compiled);
                }
            }
            sections.push(CompiledSection {
                kind: section.kind,
                elements,
            });
        }

        if !checker.diagnostics.is_empty() {
            return Err(CompileError::new(checker.diagnostics));
        }

        Ok(CompiledReport {
            inner: Arc::new(CompiledDesign {
                name: design.name.clone(),
                parameters: design.parameters.iter().map(|p| p.node.clone()).collect(),
                sections,
            }),
        })
    }
}

struct Checker<'d> {
    design: &'d Design,
    diagnostics: Vec<Diagnostic>,
}

impl Checker<'_> {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    fn check_parameters(&mut self) {
        let mut seen = HashSet::new();
        for param in &self.design.parameters {
            let name = param.node.name.as_str();
            if !seen.insert(name) {
                self.report(Diagnostic::at(
                    format!("parameter '{}' declared more than once", name),
                    param.span.clone(),
                ));
            }
        }
    }

    fn compile_element(&mut self, element: &Element, span: &Span) -> Option<CompiledElement> {
        match element {
            Element::StaticText(text) => Some(CompiledElement::StaticText(text.clone())),
            Element::TextField(expr) => {
                if expr.value_type == ValueType::Report {
                    self.report(Diagnostic::at(
                        "text field expressions cannot produce a report",
                        span.clone(),
                    ));
                    return None;
                }
                let expression = self.compile_expression(expr, span)?;
                Some(CompiledElement::TextField {
                    expression,
                    value_type: expr.value_type,
                })
            }
            Element::Subreport(sub) => {
                let expression = self.compile_expression(&sub.expression, span)?;
                if sub.expression.value_type != ValueType::Report {
                    return Some(CompiledElement::Subreport(SubreportSource::Expression(
                        expression,
                    )));
                }
                let Some(name) = expression.as_parameter() else {
                    self.report(Diagnostic::at(
                        format!(
                            "report-typed subreport expression `{}` must be a single parameter reference",
                            sub.expression.text
                        ),
                        span.clone(),
                    ));
                    return None;
                };
                match self.design.parameter(name).map(|p| p.value_type) {
                    Some(ValueType::Report) => Some(CompiledElement::Subreport(
                        SubreportSource::Parameter(name.to_string()),
                    )),
                    Some(other) => {
                        self.report(Diagnostic::at(
                            format!(
                                "subreport parameter '{}' is declared as {}, expected report",
                                name, other
                            ),
                            span.clone(),
                        ));
                        None
                    }
                    // Already reported by compile_expression
                    None => None,
                }
            }
        }
    }

    fn compile_expression(&mut self, expr: &Expression, span: &Span) -> Option<CompiledExpression> {
        let compiled = match parse_expression(&expr.text) {
            Ok(compiled) => compiled,
            Err(e) => {
                self.report(Diagnostic::at(
                    format!("invalid expression `{}`: {}", expr.text, e),
                    span.clone(),
                ));
                return None;
            }
        };

        let undeclared: Vec<String> = compiled
            .parameters()
            .filter(|name| self.design.parameter(name).is_none())
            .map(|name| name.to_string())
            .collect();
        if undeclared.is_empty() {
            return Some(compiled);
        }
        for name in undeclared {
            self.report(Diagnostic::at(
                format!("undeclared parameter '{}'", name),
                span.clone(),
            ));
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::design::{parse, Section, SubreportElement};

    fn compile(source: &str) -> Result<CompiledReport, CompileError> {
        let design = parse(source).expect("Should parse");
        StandardCompiler.compile(&design)
    }

    #[test]
    fn test_compile_simple_design() {
        let report = compile(
            r#"
            report "Invoice" {
                parameter Title: string
                section title { textfield `$P{Title}` }
                section detail { text "Line" textfield `$F{total}`: number }
            }
        "#,
        )
        .expect("Should compile");

        assert_eq!(report.name(), "Invoice");
        assert_eq!(report.parameters().len(), 1);
        assert_eq!(report.sections().len(), 2);
        assert!(matches!(
            &report.sections()[1].elements[1],
            CompiledElement::TextField {
                value_type: ValueType::Number,
                ..
            }
        ));
    }

    #[test]
    fn test_compile_is_deterministic() {
        let source = r#"report "R" { section detail { text "a" } }"#;
        let a = compile(source).unwrap();
        let b = compile(source).unwrap();
        assert_eq!(a, b);
        assert!(!a.same_artifact(&b));
    }

    #[test]
    fn test_static_subreport_reference_compiles() {
        let report = compile(r#"report "R" { section detail { subreport `"Lines"` } }"#)
            .expect("Should compile");
        assert!(matches!(
            &report.sections()[0].elements[0],
            CompiledElement::Subreport(SubreportSource::Expression(_))
        ));
        assert!(report.subreport_parameters().is_empty());
    }

    #[test]
    fn test_report_parameter_subreport() {
        let report = compile(
            r#"
            report "R" {
                parameter Lines: report
                section detail { subreport `$P{Lines}`: report }
            }
        "#,
        )
        .expect("Should compile");
        assert_eq!(report.subreport_parameters(), vec!["Lines"]);
    }

    #[test]
    fn test_undeclared_parameter_is_error() {
        let err = compile(r#"report "R" { section detail { subreport `$P{Lines}`: report } }"#)
            .unwrap_err();
        assert_eq!(err.diagnostics.len(), 1);
        assert!(err.to_string().contains("undeclared parameter 'Lines'"));
        assert!(err.diagnostics[0].span.is_some());
    }

    #[test]
    fn test_report_subreport_needs_report_parameter() {
        let err = compile(
            r#"
            report "R" {
                parameter Lines: string
                section detail { subreport `$P{Lines}`: report }
            }
        "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("expected report"));
    }

    #[test]
    fn test_all_diagnostics_are_collected() {
        let design = Design::new("")
            .with_parameter("A", ValueType::String)
            .with_parameter("A", ValueType::Number)
            .with_section(
                Section::new(SectionKind::Detail)
                    .with_element(Element::field("$P{open"))
                    .with_element(Element::Subreport(SubreportElement {
                        expression: Expression::typed("\"Lines\"", ValueType::Report),
                    })),
            );
        let err = StandardCompiler.compile(&design).unwrap_err();
        assert_eq!(err.diagnostics.len(), 4);
    }
}
