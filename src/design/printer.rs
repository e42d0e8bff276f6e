//! Source printer for designs
//!
//! Printing a [`Design`] yields source that parses back to an equal design
//! (modulo spans). Used to inspect a master after its placeholders have been
//! rewritten.

use std::fmt;

use super::ast::{Design, Element, Expression, ValueType};

impl fmt::Display for Design {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "report {} {{", quote(&self.name))?;
        for param in &self.parameters {
            writeln!(
                f,
                "    parameter {}: {}",
                param.node.name, param.node.value_type
            )?;
        }
        for section in &self.sections {
            if section.elements.is_empty() {
                writeln!(f, "    section {} {{ }}", section.kind.keyword())?;
                continue;
            }
            writeln!(f, "    section {} {{", section.kind.keyword())?;
            for element in &section.elements {
                writeln!(f, "        {}", element.node)?;
            }
            writeln!(f, "    }}")?;
        }
        write!(f, "}}")
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Element::StaticText(text) => write!(f, "text {}", quote(text)),
            Element::TextField(expr) => write!(f, "textfield {}", expr),
            Element::Subreport(sub) => write!(f, "subreport {}", sub.expression),
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "`{}`", self.text)?;
        if self.value_type != ValueType::String {
            write!(f, ": {}", self.value_type)?;
        }
        Ok(())
    }
}

fn quote(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out.push('"');
    out
}
