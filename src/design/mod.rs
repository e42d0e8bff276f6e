//! Report design documents: AST, parser and printer

pub mod ast;
mod grammar;
pub mod lexer;
mod printer;

pub use ast::*;
pub use grammar::parse;
