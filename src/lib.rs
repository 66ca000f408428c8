//! pyglossa - Python subset to Greek school pseudocode translator
//!
//! This crate translates a small, indentation-structured Python subset into
//! the two pseudocode dialects of Greek secondary-school algorithm courses:
//! Glossa, with declaration blocks and a function/procedure split, and the
//! looser Pseudoglossa.
//!
//! The pipeline is lexer, parser, type inference, renaming and one emitter
//! driven by a dialect policy. [`translate`] runs all of it.

pub mod errors;
pub mod lexer;
pub mod parser;
pub mod analysis;
pub mod codegen;
pub mod text;

// Re-export commonly used types
pub use errors::{GlossaError, GlossaResult, SourceSpan};
pub use lexer::{Lexer, Token, TokenKind};
pub use parser::{get_algorithm_name, parse, Ast, Parser, DEFAULT_ALGORITHM_NAME};
pub use analysis::{analyze_ast, AnalyzedAst, SymbolTable, Variable};
pub use codegen::{
    emit_loose, emit_strict, generator_for, to_plain_text, CodeGenerator, Dialect,
    GlossaGenerator, Markup, PseudoglossaGenerator, GLOSSA, PSEUDOGLOSSA,
};

use tracing::debug;

/// Settings for one conversion
#[derive(Debug, Clone)]
pub struct Options {
    pub dialect: &'static Dialect,
    pub markup: Markup,
    /// Variables known to exist outside the program, used only for typing
    pub external_globals: Option<SymbolTable>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            dialect: &GLOSSA,
            markup: Markup::Html,
            external_globals: None,
        }
    }
}

impl Options {
    pub fn new(dialect: &'static Dialect) -> Self {
        Self {
            dialect,
            ..Self::default()
        }
    }

    pub fn with_markup(mut self, markup: Markup) -> Self {
        self.markup = markup;
        self
    }

    pub fn with_external_globals(mut self, globals: SymbolTable) -> Self {
        self.external_globals = Some(globals);
        self
    }
}

/// Translate a whole source text
pub fn translate(source: &str, options: &Options) -> GlossaResult<String> {
    let name = get_algorithm_name(source)?;
    debug!(name = %name, dialect = options.dialect.name, "translating");

    let ast = parse(source)?;
    debug!(statements = ast.body.len(), "parsed");

    let analyzed = analyze_ast(ast, &name, options.external_globals.as_ref());
    generator_for(options.dialect, options.markup).generate(&analyzed)
}
