//! Placeholder scanning

use crate::design::{Design, Element, ElementRef, Span};

/// A sub-report placeholder found in a design
#[derive(Debug, Clone, PartialEq)]
pub struct Placeholder {
    pub at: ElementRef,
    /// Expression text as written in the design
    pub expression: String,
    pub span: Span,
}

/// Lazily yield the sub-report placeholders of a design in document order
///
/// Sections are visited in order, then elements within each section. The
/// design is not modified; call again for a fresh scan.
pub fn placeholders(design: &Design) -> impl Iterator<Item = Placeholder> + '_ {
    design
        .sections
        .iter()
        .enumerate()
        .flat_map(|(section, s)| {
            s.elements
                .iter()
                .enumerate()
                .filter_map(move |(index, element)| match &element.node {
                    Element::Subreport(sub) => Some(Placeholder {
                        at: ElementRef { section, index },
                        expression: sub.expression.text.clone(),
                        span: element.span.clone(),
                    }),
                    _ => None,
                })
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::design::{parse, Section, SectionKind};

    #[test]
    fn test_document_order() {
        let design = parse(
            r#"
            report "R" {
                section title { subreport `"A"` }
                section detail {
                    text "x"
                    subreport `"B"`
                    textfield `$F{y}`
                    subreport `"C"`
                }
            }
        "#,
        )
        .unwrap();

        let found: Vec<_> = placeholders(&design).collect();
        let exprs: Vec<_> = found.iter().map(|p| p.expression.as_str()).collect();
        assert_eq!(exprs, vec!["\"A\"", "\"B\"", "\"C\""]);
        assert_eq!(found[1].at, ElementRef { section: 1, index: 1 });
        assert_eq!(found[2].at, ElementRef { section: 1, index: 3 });
    }

    #[test]
    fn test_empty_design_has_no_placeholders() {
        assert_eq!(placeholders(&Design::new("R")).count(), 0);

        let no_elements = Design::new("R").with_section(Section::new(SectionKind::Detail));
        assert_eq!(placeholders(&no_elements).count(), 0);
    }

    #[test]
    fn test_scan_is_restartable() {
        let design = Design::new("R").with_section(
            Section::new(SectionKind::Detail).with_element(Element::subreport("\"A\"")),
        );
        assert_eq!(placeholders(&design).count(), 1);
        assert_eq!(placeholders(&design).count(), 1);
    }
}
