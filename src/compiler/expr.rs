//! Expression chunking
//!
//! Expression text is split into literal text, `$P{name}` parameter
//! references and `$F{path}` field references. Everything that is not a
//! reference is carried through as text.

use thiserror::Error;

/// Errors found while chunking an expression
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExpressionError {
    #[error("unterminated {kind} reference at offset {offset}")]
    Unterminated { kind: ReferenceKind, offset: usize },

    #[error("empty {kind} reference at offset {offset}")]
    EmptyReference { kind: ReferenceKind, offset: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    Parameter,
    Field,
}

impl std::fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReferenceKind::Parameter => write!(f, "parameter"),
            ReferenceKind::Field => write!(f, "field"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Chunk {
    Text(String),
    Parameter(String),
    Field(String),
}

/// A chunked expression
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CompiledExpression {
    pub chunks: Vec<Chunk>,
}

impl CompiledExpression {
    /// The parameter name if this expression is a single `$P{..}` reference
    pub fn as_parameter(&self) -> Option<&str> {
        let mut refs = self.chunks.iter().filter(|c| !is_blank(c));
        match (refs.next(), refs.next()) {
            (Some(Chunk::Parameter(name)), None) => Some(name),
            _ => None,
        }
    }

    /// The field path if this expression is a single `$F{..}` reference
    pub fn as_field(&self) -> Option<&str> {
        let mut refs = self.chunks.iter().filter(|c| !is_blank(c));
        match (refs.next(), refs.next()) {
            (Some(Chunk::Field(path)), None) => Some(path),
            _ => None,
        }
    }

    /// Names of all parameters referenced, in order of appearance
    pub fn parameters(&self) -> impl Iterator<Item = &str> {
        self.chunks.iter().filter_map(|c| match c {
            Chunk::Parameter(name) => Some(name.as_str()),
            _ => None,
        })
    }
}

fn is_blank(chunk: &Chunk) -> bool {
    matches!(chunk, Chunk::Text(t) if t.trim().is_empty())
}

/// Reference syntax denoting the value of parameter `name`
pub fn parameter_ref(name: &str) -> String {
    format!("$P{{{}}}", name)
}

/// Split expression text into chunks
pub fn parse_expression(text: &str) -> Result<CompiledExpression, ExpressionError> {
    let mut chunks = Vec::new();
    let mut literal = String::new();
    let mut rest = text;
    let mut offset = 0;

    while !rest.is_empty() {
        let kind = if rest.starts_with("$P{") {
            Some(ReferenceKind::Parameter)
        } else if rest.starts_with("$F{") {
            Some(ReferenceKind::Field)
        } else {
            None
        };

        let Some(kind) = kind else {
            let c = rest.chars().next().unwrap_or_default();
            literal.push(c);
            rest = &rest[c.len_utf8()..];
            offset += c.len_utf8();
            continue;
        };

        let close = rest[3..]
            .find('}')
            .ok_or(ExpressionError::Unterminated { kind, offset })?;
        let name = rest[3..3 + close].trim();
        if name.is_empty() {
            return Err(ExpressionError::EmptyReference { kind, offset });
        }

        if !literal.is_empty() {
            chunks.push(Chunk::Text(std::mem::take(&mut literal)));
        }
        chunks.push(match kind {
            ReferenceKind::Parameter => Chunk::Parameter(name.to_string()),
            ReferenceKind::Field => Chunk::Field(name.to_string()),
        });

        let consumed = 3 + close + 1;
        rest = &rest[consumed..];
        offset += consumed;
    }

    if !literal.is_empty() {
        chunks.push(Chunk::Text(literal));
    }
    Ok(CompiledExpression { chunks })
}
