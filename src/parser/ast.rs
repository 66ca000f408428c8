//! Abstract Syntax Tree (AST) definitions
//!
//! These types represent the structure of a source program after parsing.
//! Expressions are not broken down into trees: they keep their source text,
//! which the analysis re-tokenizes for typing and the emitter rewrites into
//! pseudocode.

use crate::analysis::SymbolTable;
use crate::errors::SourceSpan;
use std::fmt;

/// A complete program
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ast {
    /// Top-level statements, function definitions included, in source order
    pub body: Vec<Stmt>,
    /// Program-level variables, seeded from declaration lines
    pub globals: SymbolTable,
}

impl Ast {
    /// Iterate over the function definitions at program level
    pub fn functions(&self) -> impl Iterator<Item = &Function> {
        self.body.iter().filter_map(|stmt| match &stmt.kind {
            StmtKind::Function(func) => Some(func),
            _ => None,
        })
    }
}

/// A statement
#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: SourceSpan,
}

impl Stmt {
    pub fn new(kind: StmtKind, span: SourceSpan) -> Self {
        Self { kind, span }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    /// `x = expr`; also `return expr` inside a function, targeting the function name
    Assign { target: Ident, value: Expr },
    /// `x = input()`, optionally wrapped in a conversion such as `int(input())`
    Input {
        target: Ident,
        conversion: Option<ScalarType>,
    },
    /// `print(...)`
    Print(PrintArgs),
    /// A call used as a statement: `name(args)`
    Call { name: Ident, args: Vec<Expr> },
    /// `if` with its `elif` and `else` clauses
    If {
        condition: Expr,
        body: Vec<Stmt>,
        elifs: Vec<ElifBranch>,
        else_body: Option<Vec<Stmt>>,
    },
    /// `while cond:`
    While { condition: Expr, body: Vec<Stmt> },
    /// `for i in range(...)`, with the range already decomposed
    For {
        iterator: Ident,
        start: Expr,
        end: Expr,
        step: Option<Expr>,
        body: Vec<Stmt>,
    },
    /// `match subject:` with its `case` clauses; `case _:` is the default
    Match {
        subject: Expr,
        cases: Vec<MatchCase>,
        default: Option<Vec<Stmt>>,
    },
    /// `def name(params) -> type:`
    Function(Function),
    /// `return expr` outside of any function
    Return(Expr),
}

impl StmtKind {
    /// Short label used in summaries and logs
    pub fn label(&self) -> &'static str {
        match self {
            StmtKind::Assign { .. } => "assign",
            StmtKind::Input { .. } => "input",
            StmtKind::Print(_) => "print",
            StmtKind::Call { .. } => "call",
            StmtKind::If { .. } => "if",
            StmtKind::While { .. } => "while",
            StmtKind::For { .. } => "for",
            StmtKind::Match { .. } => "match",
            StmtKind::Function(_) => "function",
            StmtKind::Return(_) => "return",
        }
    }
}

/// An `elif` clause
#[derive(Debug, Clone, PartialEq)]
pub struct ElifBranch {
    pub condition: Expr,
    pub body: Vec<Stmt>,
}

/// A `case` clause; `pattern` is kept as written (`1 | 2` included)
#[derive(Debug, Clone, PartialEq)]
pub struct MatchCase {
    pub pattern: Expr,
    pub body: Vec<Stmt>,
}

/// Arguments of a `print` statement
#[derive(Debug, Clone, PartialEq)]
pub enum PrintArgs {
    /// Plain argument list, kept as one piece of text
    Expr(Expr),
    /// A single f-string, split into literal text and `{...}` expressions
    Template(Vec<TemplatePart>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum TemplatePart {
    Text(String),
    Expr(Expr),
}

/// A function definition
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub name: Ident,
    pub params: Vec<Param>,
    /// Return type from a `-> type` annotation (`-> None` leaves it empty)
    pub declared_return: Option<ScalarType>,
    /// Return type found by inference
    pub return_type: Option<ScalarType>,
    /// Local variables, parameters included
    pub locals: SymbolTable,
    pub body: Vec<Stmt>,
}

impl Function {
    /// The declared return type, or the inferred one
    pub fn result_type(&self) -> Option<ScalarType> {
        self.declared_return.or(self.return_type)
    }
}

/// A function parameter
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: Ident,
    /// Annotated type, later filled in by inference
    pub ty: Option<ScalarType>,
    pub span: SourceSpan,
}

/// An identifier with source location
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Ident {
    pub name: String,
    pub span: SourceSpan,
}

impl Ident {
    pub fn new(name: impl Into<String>, span: SourceSpan) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// An expression, kept as trimmed source text
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub text: String,
    pub span: SourceSpan,
}

impl Expr {
    pub fn new(text: impl Into<String>, span: SourceSpan) -> Self {
        Self {
            text: text.into(),
            span,
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// The scalar types of the source language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarType {
    Int,
    Float,
    Str,
    Bool,
}

impl ScalarType {
    /// Parse a type keyword: `int float str bool` in any case, or one of
    /// the Greek plural (declaration) and singular (return type) forms.
    pub fn from_keyword(word: &str) -> Option<ScalarType> {
        match word.to_lowercase().as_str() {
            "int" => return Some(ScalarType::Int),
            "float" => return Some(ScalarType::Float),
            "str" => return Some(ScalarType::Str),
            "bool" => return Some(ScalarType::Bool),
            _ => {}
        }
        match word.to_uppercase().as_str() {
            "ΑΚΕΡΑΙΕΣ" | "ΑΚΕΡΑΙΑ" => Some(ScalarType::Int),
            "ΠΡΑΓΜΑΤΙΚΕΣ" | "ΠΡΑΓΜΑΤΙΚΗ" => Some(ScalarType::Float),
            "ΧΑΡΑΚΤΗΡΕΣ" | "ΧΑΡΑΚΤΗΡΑΣ" => Some(ScalarType::Str),
            "ΛΟΓΙΚΕΣ" | "ΛΟΓΙΚΗ" => Some(ScalarType::Bool),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ScalarType::Int => "int",
            ScalarType::Float => "float",
            ScalarType::Str => "str",
            ScalarType::Bool => "bool",
        }
    }

    /// Whether this is `int` or `float`
    pub fn is_numeric(&self) -> bool {
        matches!(self, ScalarType::Int | ScalarType::Float)
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_keywords() {
        assert_eq!(ScalarType::from_keyword("int"), Some(ScalarType::Int));
        assert_eq!(ScalarType::from_keyword("FLOAT"), Some(ScalarType::Float));
        assert_eq!(ScalarType::from_keyword("Str"), Some(ScalarType::Str));
        assert_eq!(ScalarType::from_keyword("ΑΚΕΡΑΙΕΣ"), Some(ScalarType::Int));
        assert_eq!(ScalarType::from_keyword("ΠΡΑΓΜΑΤΙΚΗ"), Some(ScalarType::Float));
        assert_eq!(ScalarType::from_keyword("χαρακτηρες"), Some(ScalarType::Str));
        assert_eq!(ScalarType::from_keyword("ΛΟΓΙΚΗ"), Some(ScalarType::Bool));
        assert_eq!(ScalarType::from_keyword("list"), None);
        assert_eq!(ScalarType::from_keyword(""), None);
    }

    #[test]
    fn test_idents_hash_by_name_and_span() {
        use std::collections::HashSet;

        let idents: HashSet<Ident> = [
            Ident::new("x", SourceSpan::new(0, 1)),
            Ident::new("x", SourceSpan::new(0, 1)),
            Ident::new("x", SourceSpan::new(4, 5)),
        ]
        .into_iter()
        .collect();
        assert_eq!(idents.len(), 2);
    }

    #[test]
    fn test_result_type_prefers_declaration() {
        let func = Function {
            name: Ident::new("f", SourceSpan::default()),
            params: vec![],
            declared_return: Some(ScalarType::Float),
            return_type: Some(ScalarType::Int),
            locals: SymbolTable::new(),
            body: vec![],
        };
        assert_eq!(func.result_type(), Some(ScalarType::Float));
    }
}
