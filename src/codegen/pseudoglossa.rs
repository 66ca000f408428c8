//! Pseudoglossa generator

use super::dialect::PSEUDOGLOSSA;
use super::expr::keyword;
use super::{emit_loose, split_program, CodeGenerator, Markup};
use crate::analysis::AnalyzedAst;
use crate::errors::GlossaResult;
use tracing::debug;

/// Pseudoglossa code generator
pub struct PseudoglossaGenerator {
    markup: Markup,
    output: String,
}

impl PseudoglossaGenerator {
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

impl Default for PseudoglossaGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl CodeGenerator for PseudoglossaGenerator {
    fn generate(&mut self, ast: &AnalyzedAst) -> GlossaResult<String> {
        self.output.clear();
        let (main, subprograms) = split_program(&ast.ast.body);
        debug!(
            statements = main.len(),
            subprograms = subprograms.len(),
            "generating Pseudoglossa"
        );

        let name = &ast.algorithm_name;
        self.output
            .push_str(&format!("{} {}\n", keyword("ΑΛΓΟΡΙΘΜΟΣ"), name));
        self.output.push_str(&emit_loose(&main, 0));
        self.output
            .push_str(&format!("{} {}\n", keyword("ΤΕΛΟΣ"), name));

        for subprogram in subprograms {
            self.output.push('\n');
            self.output
                .push_str(&emit_loose(std::slice::from_ref(subprogram), 0));
        }

        Ok(self.markup.apply(std::mem::take(&mut self.output)))
    }

    fn file_extension(&self) -> &'static str {
        PSEUDOGLOSSA.extension
    }

    fn language_name(&self) -> &'static str {
        PSEUDOGLOSSA.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::analyze_ast;
    use crate::parser::parse;

    #[test]
    fn test_algorithm_layout() {
        let source = "\
def show(msg):
    print(msg)

total = 0
for i in range(1, 4):
    total = total + i
show(total)
";
        let expected = "\
ΑΛΓΟΡΙΘΜΟΣ ΑΘΡΟΙΣΜΑ
total <- 0
ΓΙΑ i ΑΠΟ 1 ΜΕΧΡΙ 4
    total <- total + i
ΤΕΛΟΣ_ΕΠΑΝΑΛΗΨΗΣ
ΚΑΛΕΣΕ show(total)
ΤΕΛΟΣ ΑΘΡΟΙΣΜΑ

ΑΛΓΟΡΙΘΜΟΣ show
ΔΕΔΟΜΕΝΑ // msg //
ΓΡΑΨΕ msg
ΤΕΛΟΣ show
";
        let analyzed = analyze_ast(parse(source).unwrap(), "ΑΘΡΟΙΣΜΑ", None);
        let out = PseudoglossaGenerator::new()
            .with_markup(Markup::Plain)
            .generate(&analyzed)
            .unwrap();
        assert_eq!(out, expected);
    }

    #[test]
    fn test_no_declarations() {
        let analyzed = analyze_ast(parse("x = 2.5").unwrap(), "Π", None);
        let out = PseudoglossaGenerator::new().generate(&analyzed).unwrap();
        assert!(!out.contains("ΜΕΤΑΒΛΗΤΕΣ"));
        assert!(!out.contains("ΑΡΧΗ"));
    }
}
