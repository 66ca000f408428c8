//! Program-name collision renaming
//!
//! The program name becomes a keyword-like header in the output, so a
//! variable, function or parameter with the same name has to be renamed.
//! Identifier fields are replaced directly; expression text is rewritten
//! whole-word only, leaving string literals alone.

use std::collections::HashSet;

use super::visit::{walk_ast, walk_ast_mut, Visitor, VisitorMut};
use super::SymbolTable;
use crate::parser::{Ast, Expr, Ident};
use crate::text::{contains_whole_word, replace_whole_word};
use tracing::debug;

/// Rename every use of `name` in `ast` when it collides with the program
/// name. Returns the replacement name, or `None` when nothing collided.
pub fn rename_collisions(ast: &mut Ast, name: &str) -> Option<String> {
    let mut usage = Usage::default();
    walk_ast(&mut usage, ast);

    if !usage.is_used(name) {
        return None;
    }

    let replacement = usage.free_name(name);
    debug!(from = %name, to = %replacement, "renaming identifiers that collide with the program name");

    let mut renamer = Renamer {
        from: name,
        to: &replacement,
    };
    walk_ast_mut(&mut renamer, ast);
    Some(replacement)
}

/// Every name the program uses
#[derive(Default)]
struct Usage {
    idents: HashSet<String>,
    exprs: Vec<String>,
}

impl Usage {
    fn is_used(&self, name: &str) -> bool {
        self.idents.contains(name) || self.exprs.iter().any(|text| contains_whole_word(text, name))
    }

    /// `var_<name>`, suffixed `_2`, `_3`, ... until unused
    fn free_name(&self, name: &str) -> String {
        let base = format!("var_{}", name);
        let mut candidate = base.clone();
        let mut suffix = 2;
        while self.is_used(&candidate) {
            candidate = format!("{}_{}", base, suffix);
            suffix += 1;
        }
        candidate
    }
}

impl Visitor for Usage {
    fn visit_expr(&mut self, expr: &Expr) {
        self.exprs.push(expr.text.clone());
    }

    fn visit_ident(&mut self, ident: &Ident) {
        self.idents.insert(ident.name.clone());
    }

    fn visit_symbols(&mut self, table: &SymbolTable) {
        self.idents.extend(table.iter().map(|(name, _)| name.clone()));
    }
}

struct Renamer<'a> {
    from: &'a str,
    to: &'a str,
}

impl VisitorMut for Renamer<'_> {
    fn visit_expr_mut(&mut self, expr: &mut Expr) {
        expr.text = replace_whole_word(&expr.text, self.from, self.to);
    }

    fn visit_ident_mut(&mut self, ident: &mut Ident) {
        if ident.name == self.from {
            ident.name = self.to.to_string();
        }
    }

    fn visit_symbols_mut(&mut self, table: &mut SymbolTable) {
        table.rename(self.from, self.to);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::infer::infer_types;
    use crate::parser::{parse, PrintArgs, StmtKind};

    fn analyzed(source: &str) -> Ast {
        let mut ast = parse(source).unwrap();
        infer_types(&mut ast, None);
        ast
    }

    #[test]
    fn test_no_collision_leaves_ast_unchanged() {
        let mut ast = analyzed("x = 1\nprint(x)");
        let before = ast.clone();
        assert_eq!(rename_collisions(&mut ast, "ΕΜΒΑΔΟΝ"), None);
        assert_eq!(ast, before);
    }

    #[test]
    fn test_renames_everywhere() {
        let source = "\
ΜΕΣΟΣ = 0
for ΜΕΣΟΣ in range(3):
    print(ΜΕΣΟΣ, \"ΜΕΣΟΣ\")
def f(ΜΕΣΟΣ):
    return ΜΕΣΟΣ + ΜΕΣΟΣ_2
";
        let mut ast = analyzed(source);
        assert_eq!(rename_collisions(&mut ast, "ΜΕΣΟΣ"), Some("var_ΜΕΣΟΣ".to_string()));

        assert!(ast.globals.contains("var_ΜΕΣΟΣ"));
        assert!(!ast.globals.contains("ΜΕΣΟΣ"));

        match &ast.body[1].kind {
            StmtKind::For { iterator, body, .. } => {
                assert_eq!(iterator.name, "var_ΜΕΣΟΣ");
                match &body[0].kind {
                    StmtKind::Print(PrintArgs::Expr(e)) => {
                        assert_eq!(e.text, "var_ΜΕΣΟΣ, \"ΜΕΣΟΣ\"")
                    }
                    other => panic!("unexpected {:?}", other),
                }
            }
            other => panic!("unexpected {:?}", other),
        }

        let func = ast.functions().next().unwrap();
        assert_eq!(func.params[0].name.name, "var_ΜΕΣΟΣ");
        assert!(func.locals.contains("var_ΜΕΣΟΣ"));
        match &func.body[0].kind {
            StmtKind::Assign { value, .. } => assert_eq!(value.text, "var_ΜΕΣΟΣ + ΜΕΣΟΣ_2"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_collision_in_expression_only() {
        let mut ast = analyzed("x = ΠΡΟΓ * 2");
        assert_eq!(rename_collisions(&mut ast, "ΠΡΟΓ"), Some("var_ΠΡΟΓ".to_string()));
        match &ast.body[0].kind {
            StmtKind::Assign { value, .. } => assert_eq!(value.text, "var_ΠΡΟΓ * 2"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_suffix_when_replacement_is_taken() {
        let mut ast = analyzed("A = 1\nvar_A = 2\nvar_A_2 = 3");
        assert_eq!(rename_collisions(&mut ast, "A"), Some("var_A_3".to_string()));
    }

    #[test]
    fn test_renaming_is_idempotent() {
        let mut ast = analyzed("ΤΕΣΤ = 1\nprint(ΤΕΣΤ)");
        rename_collisions(&mut ast, "ΤΕΣΤ");
        let once = ast.clone();
        assert_eq!(rename_collisions(&mut ast, "ΤΕΣΤ"), None);
        assert_eq!(ast, once);
    }

    #[test]
    fn test_string_literals_do_not_collide() {
        let mut ast = analyzed("print(\"ΔΟΚΙΜΗ\")");
        assert_eq!(rename_collisions(&mut ast, "ΔΟΚΙΜΗ"), None);
    }
}
