//! Generic AST traversal
//!
//! `Visitor` walks a tree by shared reference and `VisitorMut` by mutable
//! reference. Every hook defaults to the matching `walk_*` function, so an
//! implementation only overrides the nodes it cares about and calls the walk
//! function itself when it still wants to descend.

use crate::parser::{Ast, Expr, Function, Ident, PrintArgs, Stmt, StmtKind, TemplatePart};
use super::SymbolTable;

/// Read-only traversal
pub trait Visitor {
    fn visit_stmt(&mut self, stmt: &Stmt) {
        walk_stmt(self, stmt);
    }

    fn visit_function(&mut self, func: &Function) {
        walk_function(self, func);
    }

    /// Every expression: conditions, values, arguments, bounds, patterns
    fn visit_expr(&mut self, _expr: &Expr) {}

    /// Every identifier field: targets, iterators, call and function names, params
    fn visit_ident(&mut self, _ident: &Ident) {}

    /// The program's and each function's symbol table
    fn visit_symbols(&mut self, _table: &SymbolTable) {}
}

pub fn walk_ast<V: Visitor + ?Sized>(visitor: &mut V, ast: &Ast) {
    visitor.visit_symbols(&ast.globals);
    walk_stmts(visitor, &ast.body);
}

pub fn walk_stmts<V: Visitor + ?Sized>(visitor: &mut V, stmts: &[Stmt]) {
    for stmt in stmts {
        visitor.visit_stmt(stmt);
    }
}

pub fn walk_stmt<V: Visitor + ?Sized>(visitor: &mut V, stmt: &Stmt) {
    match &stmt.kind {
        StmtKind::Assign { target, value } => {
            visitor.visit_ident(target);
            visitor.visit_expr(value);
        }
        StmtKind::Input { target, .. } => visitor.visit_ident(target),
        StmtKind::Print(PrintArgs::Expr(expr)) => visitor.visit_expr(expr),
        StmtKind::Print(PrintArgs::Template(parts)) => {
            for part in parts {
                if let TemplatePart::Expr(expr) = part {
                    visitor.visit_expr(expr);
                }
            }
        }
        StmtKind::Call { name, args } => {
            visitor.visit_ident(name);
            for arg in args {
                visitor.visit_expr(arg);
            }
        }
        StmtKind::If {
            condition,
            body,
            elifs,
            else_body,
        } => {
            visitor.visit_expr(condition);
            walk_stmts(visitor, body);
            for elif in elifs {
                visitor.visit_expr(&elif.condition);
                walk_stmts(visitor, &elif.body);
            }
            if let Some(else_body) = else_body {
                walk_stmts(visitor, else_body);
            }
        }
        StmtKind::While { condition, body } => {
            visitor.visit_expr(condition);
            walk_stmts(visitor, body);
        }
        StmtKind::For {
            iterator,
            start,
            end,
            step,
            body,
        } => {
            visitor.visit_ident(iterator);
            visitor.visit_expr(start);
            visitor.visit_expr(end);
            if let Some(step) = step {
                visitor.visit_expr(step);
            }
            walk_stmts(visitor, body);
        }
        StmtKind::Match {
            subject,
            cases,
            default,
        } => {
            visitor.visit_expr(subject);
            for case in cases {
                visitor.visit_expr(&case.pattern);
                walk_stmts(visitor, &case.body);
            }
            if let Some(default) = default {
                walk_stmts(visitor, default);
            }
        }
        StmtKind::Function(func) => visitor.visit_function(func),
        StmtKind::Return(value) => visitor.visit_expr(value),
    }
}

pub fn walk_function<V: Visitor + ?Sized>(visitor: &mut V, func: &Function) {
    visitor.visit_ident(&func.name);
    for param in &func.params {
        visitor.visit_ident(&param.name);
    }
    visitor.visit_symbols(&func.locals);
    walk_stmts(visitor, &func.body);
}

/// Mutating traversal
pub trait VisitorMut {
    fn visit_stmt_mut(&mut self, stmt: &mut Stmt) {
        walk_stmt_mut(self, stmt);
    }

    fn visit_function_mut(&mut self, func: &mut Function) {
        walk_function_mut(self, func);
    }

    fn visit_expr_mut(&mut self, _expr: &mut Expr) {}

    fn visit_ident_mut(&mut self, _ident: &mut Ident) {}

    fn visit_symbols_mut(&mut self, _table: &mut SymbolTable) {}
}

pub fn walk_ast_mut<V: VisitorMut + ?Sized>(visitor: &mut V, ast: &mut Ast) {
    visitor.visit_symbols_mut(&mut ast.globals);
    walk_stmts_mut(visitor, &mut ast.body);
}

pub fn walk_stmts_mut<V: VisitorMut + ?Sized>(visitor: &mut V, stmts: &mut [Stmt]) {
    for stmt in stmts {
        visitor.visit_stmt_mut(stmt);
    }
}

pub fn walk_stmt_mut<V: VisitorMut + ?Sized>(visitor: &mut V, stmt: &mut Stmt) {
    match &mut stmt.kind {
        StmtKind::Assign { target, value } => {
            visitor.visit_ident_mut(target);
            visitor.visit_expr_mut(value);
        }
        StmtKind::Input { target, .. } => visitor.visit_ident_mut(target),
        StmtKind::Print(PrintArgs::Expr(expr)) => visitor.visit_expr_mut(expr),
        StmtKind::Print(PrintArgs::Template(parts)) => {
            for part in parts {
                if let TemplatePart::Expr(expr) = part {
                    visitor.visit_expr_mut(expr);
                }
            }
        }
        StmtKind::Call { name, args } => {
            visitor.visit_ident_mut(name);
            for arg in args {
                visitor.visit_expr_mut(arg);
            }
        }
        StmtKind::If {
            condition,
            body,
            elifs,
            else_body,
        } => {
            visitor.visit_expr_mut(condition);
            walk_stmts_mut(visitor, body);
            for elif in elifs {
                visitor.visit_expr_mut(&mut elif.condition);
                walk_stmts_mut(visitor, &mut elif.body);
            }
            if let Some(else_body) = else_body {
                walk_stmts_mut(visitor, else_body);
            }
        }
        StmtKind::While { condition, body } => {
            visitor.visit_expr_mut(condition);
            walk_stmts_mut(visitor, body);
        }
        StmtKind::For {
            iterator,
            start,
            end,
            step,
            body,
        } => {
            visitor.visit_ident_mut(iterator);
            visitor.visit_expr_mut(start);
            visitor.visit_expr_mut(end);
            if let Some(step) = step {
                visitor.visit_expr_mut(step);
            }
            walk_stmts_mut(visitor, body);
        }
        StmtKind::Match {
            subject,
            cases,
            default,
        } => {
            visitor.visit_expr_mut(subject);
            for case in cases {
                visitor.visit_expr_mut(&mut case.pattern);
                walk_stmts_mut(visitor, &mut case.body);
            }
            if let Some(default) = default {
                walk_stmts_mut(visitor, default);
            }
        }
        StmtKind::Function(func) => visitor.visit_function_mut(func),
        StmtKind::Return(value) => visitor.visit_expr_mut(value),
    }
}

pub fn walk_function_mut<V: VisitorMut + ?Sized>(visitor: &mut V, func: &mut Function) {
    visitor.visit_ident_mut(&mut func.name);
    for param in &mut func.params {
        visitor.visit_ident_mut(&mut param.name);
    }
    visitor.visit_symbols_mut(&mut func.locals);
    walk_stmts_mut(visitor, &mut func.body);
}

/// Whether `stmts` assign to `function`'s own name anywhere, nested
/// branches and loops included, nested definitions excluded
pub fn has_self_return(stmts: &[Stmt], function: &str) -> bool {
    struct SelfReturn<'a> {
        function: &'a str,
        found: bool,
    }

    impl Visitor for SelfReturn<'_> {
        fn visit_stmt(&mut self, stmt: &Stmt) {
            if let StmtKind::Assign { target, .. } = &stmt.kind {
                if target.name == self.function {
                    self.found = true;
                }
            }
            if !self.found {
                walk_stmt(self, stmt);
            }
        }

        fn visit_function(&mut self, _func: &Function) {}
    }

    let mut finder = SelfReturn {
        function,
        found: false,
    };
    walk_stmts(&mut finder, stmts);
    finder.found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    struct Names(Vec<String>);

    impl Visitor for Names {
        fn visit_ident(&mut self, ident: &Ident) {
            self.0.push(ident.name.clone());
        }
    }

    #[test]
    fn test_walk_visits_identifiers_in_order() {
        let ast = parse("x = 1\nfor i in range(x):\n    show(i)\ndef f(a):\n    b = a").unwrap();
        let mut names = Names(Vec::new());
        walk_ast(&mut names, &ast);
        assert_eq!(names.0, vec!["x", "i", "show", "f", "a", "b"]);
    }

    #[test]
    fn test_mutating_walk_reaches_nested_expressions() {
        struct Upper;
        impl VisitorMut for Upper {
            fn visit_expr_mut(&mut self, expr: &mut Expr) {
                expr.text = expr.text.to_uppercase();
            }
        }

        let mut ast = parse("while x:\n    if y:\n        z = w").unwrap();
        walk_ast_mut(&mut Upper, &mut ast);
        let mut texts = Vec::new();
        struct Collect<'a>(&'a mut Vec<String>);
        impl Visitor for Collect<'_> {
            fn visit_expr(&mut self, expr: &Expr) {
                self.0.push(expr.text.clone());
            }
        }
        walk_ast(&mut Collect(&mut texts), &ast);
        assert_eq!(texts, vec!["X", "Y", "W"]);
    }

    #[test]
    fn test_self_return_detection() {
        let ast = parse("def f(n):\n    if n > 0:\n        return n\n\ndef g():\n    print(1)").unwrap();
        let funcs: Vec<_> = ast.functions().collect();
        assert!(has_self_return(&funcs[0].body, "f"));
        assert!(!has_self_return(&funcs[1].body, "g"));
    }
}
