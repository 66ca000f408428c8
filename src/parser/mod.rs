//! Parser module
//!
//! Line-and-indentation driven parser that produces an AST, plus the reader
//! for the `ALG_NAME` directive.

mod ast;
mod directive;
mod lines;
mod parser;

pub use ast::*;
pub use directive::{get_algorithm_name, DEFAULT_ALGORITHM_NAME};
pub use lines::{collect_block, split_lines, SourceLine};
pub use parser::Parser;

use crate::errors::GlossaResult;

/// Parse source code into an AST
pub fn parse(source: &str) -> GlossaResult<Ast> {
    Parser::new(source).parse()
}
