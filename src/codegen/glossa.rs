//! Glossa generator
//!
//! Produces a `ΠΡΟΓΡΑΜΜΑ` with its declarations, followed by every
//! subprogram as a `ΣΥΝΑΡΤΗΣΗ` or `ΔΙΑΔΙΚΑΣΙΑ` with its own declarations.

use super::dialect::GLOSSA;
use super::expr::keyword;
use super::{emit_strict, split_program, CodeGenerator, Markup};
use crate::analysis::AnalyzedAst;
use crate::errors::GlossaResult;
use tracing::debug;

/// Glossa code generator
pub struct GlossaGenerator {
    markup: Markup,
    /// Output buffer
    output: String,
}

impl GlossaGenerator {
    pub fn new() -> Self {
        Self {
            markup: Markup::Html,
            output: String::new(),
        }
    }

    pub fn with_markup(mut self, markup: Markup) -> Self {
        self.markup = markup;
        self
    }
}

impl Default for GlossaGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl CodeGenerator for GlossaGenerator {
    fn generate(&mut self, ast: &AnalyzedAst) -> GlossaResult<String> {
        self.output.clear();
        let (main, subprograms) = split_program(&ast.ast.body);
        debug!(
            statements = main.len(),
            subprograms = subprograms.len(),
            "generating Glossa"
        );

        self.output
            .push_str(&format!("{} {}\n", keyword("ΠΡΟΓΡΑΜΜΑ"), ast.algorithm_name));
        self.output
            .push_str(&emit_strict(&main, Some(&ast.ast.globals), 1, true));
        self.output
            .push_str(&format!("{}\n\n", keyword("ΤΕΛΟΣ_ΠΡΟΓΡΑΜΜΑΤΟΣ")));

        for subprogram in subprograms {
            self.output
                .push_str(&emit_strict(std::slice::from_ref(subprogram), None, 0, false));
            self.output.push('\n');
        }

        Ok(self.markup.apply(std::mem::take(&mut self.output)))
    }

    fn file_extension(&self) -> &'static str {
        GLOSSA.extension
    }

    fn language_name(&self) -> &'static str {
        GLOSSA.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::analyze_ast;
    use crate::parser::parse;

    fn generate(source: &str, name: &str) -> String {
        let analyzed = analyze_ast(parse(source).unwrap(), name, None);
        GlossaGenerator::new()
            .with_markup(Markup::Plain)
            .generate(&analyzed)
            .unwrap()
    }

    #[test]
    fn test_program_layout() {
        let source = "\
def double(n):
    return n * 2

x = int(input())
print(double(x))
";
        let expected = "\
ΠΡΟΓΡΑΜΜΑ ΔΙΠΛΟ
ΜΕΤΑΒΛΗΤΕΣ
    ΑΚΕΡΑΙΕΣ: x
ΑΡΧΗ
    ΔΙΑΒΑΣΕ x
    ΓΡΑΨΕ double(x)
ΤΕΛΟΣ_ΠΡΟΓΡΑΜΜΑΤΟΣ

ΣΥΝΑΡΤΗΣΗ double(n): ΑΚΕΡΑΙΑ
ΜΕΤΑΒΛΗΤΕΣ
    ΑΚΕΡΑΙΕΣ: n
ΑΡΧΗ
    double <- n * 2
ΤΕΛΟΣ_ΣΥΝΑΡΤΗΣΗΣ

";
        assert_eq!(generate(source, "ΔΙΠΛΟ"), expected);
    }

    #[test]
    fn test_empty_program_has_no_declarations() {
        assert_eq!(
            generate("print(\"hello\")", "ΓΕΙΑ"),
            "ΠΡΟΓΡΑΜΜΑ ΓΕΙΑ\nΑΡΧΗ\n    ΓΡΑΨΕ \"hello\"\nΤΕΛΟΣ_ΠΡΟΓΡΑΜΜΑΤΟΣ\n\n"
        );
    }

    #[test]
    fn test_html_markup() {
        let analyzed = analyze_ast(parse("x = 1").unwrap(), "Α", None);
        let out = GlossaGenerator::new().generate(&analyzed).unwrap();
        assert!(out.starts_with("<span class=\"func\">ΠΡΟΓΡΑΜΜΑ</span> Α\n"));
        assert!(out.contains("    x &lt;- <span class=\"int\">1</span>\n"));
    }
}
