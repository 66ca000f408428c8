//! Code generation
//!
//! Renders an analyzed AST as Glossa or Pseudoglossa. Both generators share
//! one `Emitter` and differ only in their `Dialect` policy and framing.

mod dialect;
mod emitter;
mod expr;
mod glossa;
mod pseudoglossa;

pub use dialect::{
    math_function, type_plural, type_singular, word_keyword, Dialect, GLOSSA, MATH_FUNCTIONS,
    PSEUDOGLOSSA, WORD_KEYWORDS,
};
pub use emitter::{is_function, Emitter};
pub use expr::{highlight_literals, keyword, translate_expression, translate_keywords, translate_pattern};
pub use glossa::GlossaGenerator;
pub use pseudoglossa::PseudoglossaGenerator;

use crate::analysis::{AnalyzedAst, SymbolTable};
use crate::errors::GlossaResult;
use crate::parser::{Stmt, StmtKind};

/// Trait for code generators
pub trait CodeGenerator {
    /// Generate code from the analyzed AST
    fn generate(&mut self, ast: &AnalyzedAst) -> GlossaResult<String>;

    /// Get the file extension for the target language
    fn file_extension(&self) -> &'static str;

    /// Get the name of the target language
    fn language_name(&self) -> &'static str;
}

/// Generator for a dialect
pub fn generator_for(dialect: &'static Dialect, markup: Markup) -> Box<dyn CodeGenerator> {
    if dialect.subprogram_kinds {
        Box::new(GlossaGenerator::new().with_markup(markup))
    } else {
        Box::new(PseudoglossaGenerator::new().with_markup(markup))
    }
}

/// Output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Markup {
    /// Highlight spans, with `<`, `>` and `&` escaped
    #[default]
    Html,
    /// Bare text
    Plain,
}

impl Markup {
    pub fn apply(self, html: String) -> String {
        match self {
            Markup::Html => html,
            Markup::Plain => to_plain_text(&html),
        }
    }
}

/// Render statements in the strict dialect. With `emit_declarations` the
/// statements are framed by a declaration block and `ΑΡΧΗ` one level above
/// `indent`.
pub fn emit_strict(
    stmts: &[Stmt],
    symbols: Option<&SymbolTable>,
    indent: usize,
    emit_declarations: bool,
) -> String {
    if emit_declarations {
        let mut emitter = Emitter::new(&GLOSSA).with_indent(indent.saturating_sub(1));
        emitter.emit_frame(symbols, stmts);
        emitter.finish()
    } else {
        let mut emitter = Emitter::new(&GLOSSA).with_indent(indent);
        emitter.emit_stmts(stmts);
        emitter.finish()
    }
}

/// Render statements in the loose dialect
pub fn emit_loose(stmts: &[Stmt], indent: usize) -> String {
    let mut emitter = Emitter::new(&PSEUDOGLOSSA).with_indent(indent);
    emitter.emit_stmts(stmts);
    emitter.finish()
}

/// Strip markup tags and decode the escaped characters
pub fn to_plain_text(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut rest = html;

    while let Some(c) = rest.chars().next() {
        if c == '<' {
            let end = rest.find('>').map_or(rest.len(), |j| j + 1);
            rest = &rest[end..];
            continue;
        }
        if c == '&' {
            let entity = [("&lt;", '<'), ("&gt;", '>'), ("&amp;", '&')]
                .into_iter()
                .find(|(name, _)| rest.starts_with(name));
            if let Some((name, decoded)) = entity {
                out.push(decoded);
                rest = &rest[name.len()..];
                continue;
            }
        }
        out.push(c);
        rest = &rest[c.len_utf8()..];
    }

    out
}

/// Top-level statements split into the main program and its subprograms
fn split_program(body: &[Stmt]) -> (Vec<Stmt>, Vec<&Stmt>) {
    let (functions, main): (Vec<&Stmt>, Vec<&Stmt>) = body
        .iter()
        .partition(|stmt| matches!(stmt.kind, StmtKind::Function(_)));
    (main.into_iter().cloned().collect(), functions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    #[test]
    fn test_plain_text() {
        assert_eq!(
            to_plain_text("x &lt;- <span class=\"int\">1</span> &amp;&amp; y &gt; 2"),
            "x <- 1 && y > 2"
        );
        assert_eq!(to_plain_text("a & b"), "a & b");
    }

    #[test]
    fn test_emit_strict_with_declarations() {
        let mut ast = parse("x = 1").unwrap();
        crate::analysis::infer_types(&mut ast, None);
        let out = to_plain_text(&emit_strict(&ast.body, Some(&ast.globals), 1, true));
        assert_eq!(out, "ΜΕΤΑΒΛΗΤΕΣ\n    ΑΚΕΡΑΙΕΣ: x\nΑΡΧΗ\n    x <- 1\n");
    }

    #[test]
    fn test_emit_at_indent() {
        let ast = parse("print(1)").unwrap();
        assert_eq!(
            to_plain_text(&emit_strict(&ast.body, None, 2, false)),
            "        ΓΡΑΨΕ 1\n"
        );
        assert_eq!(to_plain_text(&emit_loose(&ast.body, 1)), "    ΓΡΑΨΕ 1\n");
    }

    #[test]
    fn test_generator_for_dialect() {
        assert_eq!(generator_for(&GLOSSA, Markup::Html).file_extension(), "glo");
        assert_eq!(
            generator_for(&PSEUDOGLOSSA, Markup::Plain).language_name(),
            "Pseudoglossa"
        );
    }
}
