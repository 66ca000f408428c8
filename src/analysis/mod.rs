//! Semantic analysis
//!
//! Type inference over the parsed program and renaming of identifiers that
//! collide with the program name.

mod expr;
mod infer;
mod rename;
mod scope;
mod visit;

pub use expr::{find_calls, infer_type, CallExpr, TypeEnv};
pub use infer::infer_types;
pub use rename::rename_collisions;
pub use scope::{SymbolTable, Variable};
pub use visit::{
    has_self_return, walk_ast, walk_ast_mut, walk_function, walk_function_mut, walk_stmt,
    walk_stmt_mut, walk_stmts, walk_stmts_mut, Visitor, VisitorMut,
};

use crate::parser::Ast;
use tracing::debug;

/// Analyzed program, ready for code generation
#[derive(Debug, Clone)]
pub struct AnalyzedAst {
    pub ast: Ast,
    /// Program name used in the output header
    pub algorithm_name: String,
    /// Replacement for identifiers that were named like the program
    pub renamed: Option<String>,
}

/// Run all analysis passes on the AST
pub fn analyze_ast(
    mut ast: Ast,
    algorithm_name: &str,
    external_globals: Option<&SymbolTable>,
) -> AnalyzedAst {
    infer_types(&mut ast, external_globals);
    debug!(
        globals = ast.globals.len(),
        functions = ast.functions().count(),
        "type inference finished"
    );

    let renamed = rename_collisions(&mut ast, algorithm_name);

    AnalyzedAst {
        ast,
        algorithm_name: algorithm_name.to_string(),
        renamed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{parse, ScalarType};

    #[test]
    fn test_analyze_infers_then_renames() {
        let ast = parse("ΕΜΒΑΔΟΝ = 2.5\ny = ΕΜΒΑΔΟΝ * 2").unwrap();
        let analyzed = analyze_ast(ast, "ΕΜΒΑΔΟΝ", None);
        assert_eq!(analyzed.renamed.as_deref(), Some("var_ΕΜΒΑΔΟΝ"));
        assert_eq!(analyzed.ast.globals.type_of("var_ΕΜΒΑΔΟΝ"), Some(ScalarType::Float));
        assert_eq!(analyzed.ast.globals.type_of("y"), Some(ScalarType::Float));
    }

    #[test]
    fn test_external_globals_feed_inference() {
        let mut external = SymbolTable::new();
        external.define("rate", Variable::declared(ScalarType::Float, Default::default()));
        let ast = parse("total = rate * 3").unwrap();
        let analyzed = analyze_ast(ast, "ΔΟΚΙΜΗ", Some(&external));
        assert_eq!(analyzed.ast.globals.type_of("total"), Some(ScalarType::Float));
        assert!(!analyzed.ast.globals.contains("rate"));
        assert_eq!(analyzed.renamed, None);
    }
}
