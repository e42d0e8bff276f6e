//! Template stores
//!
//! Sub-report placeholders name the template they embed. A [`TemplateStore`]
//! turns such a name back into a design, either from memory
//! ([`TemplateRegistry`]) or from a directory of `.rdl` files
//! ([`DirectoryStore`]).

mod directory;
mod registry;

pub use directory::{DirectoryStore, DEFAULT_EXTENSION};
pub use registry::{TemplateError, TemplateRegistry, TemplateStore};
