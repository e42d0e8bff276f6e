//! Report composition
//!
//! Turns a master design that embeds sub-reports by name into a
//! [`ComposedReport`]: the compiled master, the compiled sub-reports and the
//! parameter bindings that connect them at fill time.
//!
//! # Example
//!
//! ```rust
//! use report_composer::composition::Composer;
//! use report_composer::compiler::StandardCompiler;
//! use report_composer::design::parse;
//! use report_composer::template::TemplateRegistry;
//!
//! let mut store = TemplateRegistry::new();
//! store
//!     .register_source(r#"report "InvoiceLines" { section detail { textfield `$F{item}` } }"#)
//!     .unwrap();
//!
//! let master = parse(r#"
//!     report "Invoice" {
//!         section detail {
//!             text "Lines"
//!             subreport `"InvoiceLines"`
//!         }
//!     }
//! "#).unwrap();
//!
//! let package = Composer::new(&store, StandardCompiler).compose(master).unwrap();
//! assert_eq!(package.subreports().len(), 1);
//! assert!(package.binding("InvoiceLines").is_some());
//! ```

mod composer;
mod error;
mod package;
pub mod resolver;
mod rewriter;
mod scanner;

pub use composer::Composer;
pub use error::ComposeError;
pub use package::{ComposedReport, ParameterValue};
pub use resolver::{reference_name, resolve, ResolvedTemplate};
pub use rewriter::DesignRewriter;
pub use scanner::{placeholders, Placeholder};
