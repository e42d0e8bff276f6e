//! Reference resolution - from placeholder expression to stored design
//!
//! Resolution happens in two steps. The expression text is first reduced to
//! a template name; only the quoted-name shape (`"InvoiceLines"`) is
//! accepted. The name is then looked up in the template store.

use crate::design::lexer::is_identifier;
use crate::design::Design;
use crate::template::{TemplateError, TemplateStore};

use super::error::ComposeError;
use super::scanner::Placeholder;

/// A placeholder's template, found in the store
#[derive(Debug, Clone)]
pub struct ResolvedTemplate {
    pub name: String,
    pub design: Design,
}

/// Extract the template name a placeholder refers to
///
/// Surrounding whitespace and one layer of double quotes are removed, then
/// whitespace inside the quotes. The name must be an identifier that is not
/// a keyword. Anything else is a malformed reference.
pub fn reference_name(placeholder: &Placeholder) -> Result<String, ComposeError> {
    let malformed =
        |reason: &str| ComposeError::malformed(&placeholder.expression, reason, placeholder.span.clone());

    let text = placeholder.expression.trim();
    let inner = text
        .strip_prefix('"')
        .and_then(|t| t.strip_suffix('"'))
        .ok_or_else(|| malformed("expected a quoted template name"))?;

    let name = inner.trim();
    if name.is_empty() {
        return Err(malformed("template name is empty"));
    }
    // The name becomes a parameter declaration, so it must read back as one
    if !is_identifier(name) {
        return Err(malformed(&format!(
            "template name '{}' is not a valid parameter identifier",
            name
        )));
    }
    Ok(name.to_string())
}

/// Look a template up by name, mapping a miss to `ReferenceNotFound`
pub fn load<S: TemplateStore + ?Sized>(
    store: &S,
    name: &str,
    placeholder: &Placeholder,
) -> Result<Design, ComposeError> {
    store.lookup(name).map_err(|e| match e {
        TemplateError::NotFound { .. } => ComposeError::not_found(name, placeholder.span.clone()),
        source => ComposeError::Store {
            name: name.to_string(),
            source,
        },
    })
}

/// Resolve a placeholder to its stored design
pub fn resolve<S: TemplateStore + ?Sized>(
    placeholder: &Placeholder,
    store: &S,
) -> Result<ResolvedTemplate, ComposeError> {
    let name = reference_name(placeholder)?;
    let design = load(store, &name, placeholder)?;
    Ok(ResolvedTemplate { name, design })
}
