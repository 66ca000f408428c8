//! Expression typing
//!
//! Expressions are stored as text. To type one, it is tokenized and run
//! through a small precedence-climbing parser that computes a type for each
//! subexpression instead of building a tree. Anything the parser does not
//! understand types as unresolved.

use crate::lexer::{Keyword, Lexer, Token, TokenKind};
use crate::parser::ScalarType;

/// Where identifier and call types come from
pub trait TypeEnv {
    /// The known type of a variable
    fn variable_type(&self, name: &str) -> Option<ScalarType>;

    /// The known return type of a function
    fn return_type(&self, function: &str) -> Option<ScalarType>;
}

/// Infer the type of an expression. `None` means unresolved.
pub fn infer_type(text: &str, env: &dyn TypeEnv) -> Option<ScalarType> {
    let mut typer = ExprTyper::new(text, env);
    let ty = typer.parse_expr(0).ok()?;
    if typer.at_end() {
        ty
    } else {
        None
    }
}

/// The expression could not be parsed
#[derive(Debug)]
struct Unparsed;

type Typed = Result<Option<ScalarType>, Unparsed>;

// binding powers
const OR: u8 = 1;
const AND: u8 = 2;
const NOT: u8 = 3;
const COMPARE: u8 = 4;
const SUM: u8 = 5;
const PRODUCT: u8 = 6;
const UNARY: u8 = 7;
const POWER: u8 = 8;

#[derive(Debug, Clone, Copy, PartialEq)]
enum BinaryOp {
    Or,
    And,
    Compare,
    Add,
    Sub,
    Mul,
    Div,
    FloorDiv,
    Mod,
    Pow,
}

impl BinaryOp {
    fn from_token(kind: &TokenKind) -> Option<BinaryOp> {
        let op = match kind {
            TokenKind::Keyword(Keyword::Or) => BinaryOp::Or,
            TokenKind::Keyword(Keyword::And) => BinaryOp::And,
            TokenKind::EqEq
            | TokenKind::Eq
            | TokenKind::BangEq
            | TokenKind::LtGt
            | TokenKind::Lt
            | TokenKind::LtEq
            | TokenKind::Gt
            | TokenKind::GtEq => BinaryOp::Compare,
            TokenKind::Plus => BinaryOp::Add,
            TokenKind::Minus => BinaryOp::Sub,
            TokenKind::Star => BinaryOp::Mul,
            TokenKind::Slash => BinaryOp::Div,
            TokenKind::SlashSlash => BinaryOp::FloorDiv,
            TokenKind::Percent => BinaryOp::Mod,
            TokenKind::StarStar => BinaryOp::Pow,
            _ => return None,
        };
        Some(op)
    }

    /// Left and right binding power
    fn binding_power(self) -> (u8, u8) {
        match self {
            BinaryOp::Or => (OR, OR + 1),
            BinaryOp::And => (AND, AND + 1),
            BinaryOp::Compare => (COMPARE, COMPARE + 1),
            BinaryOp::Add | BinaryOp::Sub => (SUM, SUM + 1),
            BinaryOp::Mul | BinaryOp::Div | BinaryOp::FloorDiv | BinaryOp::Mod => {
                (PRODUCT, PRODUCT + 1)
            }
            // right associative, and the right operand may be unary
            BinaryOp::Pow => (POWER + 1, UNARY),
        }
    }

    fn result(self, left: Option<ScalarType>, right: Option<ScalarType>) -> Option<ScalarType> {
        match self {
            BinaryOp::Or | BinaryOp::And | BinaryOp::Compare => Some(ScalarType::Bool),
            BinaryOp::Div => Some(ScalarType::Float),
            BinaryOp::Add if left == Some(ScalarType::Str) || right == Some(ScalarType::Str) => None,
            _ => numeric(left?, right?),
        }
    }
}

/// int with int is int; any other numeric mix is float
fn numeric(left: ScalarType, right: ScalarType) -> Option<ScalarType> {
    match (left, right) {
        (ScalarType::Int, ScalarType::Int) => Some(ScalarType::Int),
        (l, r) if l.is_numeric() && r.is_numeric() => Some(ScalarType::Float),
        _ => None,
    }
}

struct ExprTyper<'a> {
    tokens: Vec<Token>,
    pos: usize,
    env: &'a dyn TypeEnv,
}

impl<'a> ExprTyper<'a> {
    fn new(text: &str, env: &'a dyn TypeEnv) -> Self {
        Self {
            tokens: Lexer::new(text).tokenize(),
            pos: 0,
            env,
        }
    }

    fn peek(&self) -> &TokenKind {
        &self.tokens[self.pos.min(self.tokens.len() - 1)].kind
    }

    fn advance(&mut self) -> TokenKind {
        let kind = self.peek().clone();
        if !kind.is_eof() {
            self.pos += 1;
        }
        kind
    }

    fn at_end(&self) -> bool {
        self.peek().is_eof()
    }

    fn expect(&mut self, kind: &TokenKind) -> Result<(), Unparsed> {
        if self.peek() == kind {
            self.advance();
            Ok(())
        } else {
            Err(Unparsed)
        }
    }

    fn parse_expr(&mut self, min_bp: u8) -> Typed {
        let mut left = self.parse_prefix()?;

        while let Some(op) = BinaryOp::from_token(self.peek()) {
            let (left_bp, right_bp) = op.binding_power();
            if left_bp < min_bp {
                break;
            }
            self.advance();
            let right = self.parse_expr(right_bp)?;
            left = op.result(left, right);
        }

        Ok(left)
    }

    fn parse_prefix(&mut self) -> Typed {
        match self.peek() {
            TokenKind::Keyword(Keyword::Not) => {
                self.advance();
                self.parse_expr(NOT)?;
                Ok(Some(ScalarType::Bool))
            }
            TokenKind::Minus | TokenKind::Plus => {
                self.advance();
                let operand = self.parse_expr(UNARY)?;
                Ok(operand.filter(ScalarType::is_numeric))
            }
            _ => self.parse_primary(),
        }
    }

    fn parse_primary(&mut self) -> Typed {
        match self.advance() {
            TokenKind::Integer(_) => Ok(Some(ScalarType::Int)),
            TokenKind::Float(_) => Ok(Some(ScalarType::Float)),
            TokenKind::String { .. } => Ok(Some(ScalarType::Str)),
            TokenKind::Keyword(Keyword::True | Keyword::False) => Ok(Some(ScalarType::Bool)),
            TokenKind::Keyword(Keyword::None) => Ok(None),
            TokenKind::LParen => {
                let inner = self.parse_expr(0)?;
                self.expect(&TokenKind::RParen)?;
                Ok(inner)
            }
            TokenKind::Ident(name) => self.parse_name(name),
            _ => Err(Unparsed),
        }
    }

    /// A variable, a call, or a dotted name such as `math.pi`
    fn parse_name(&mut self, name: String) -> Typed {
        let mut path = vec![name];
        while self.peek() == &TokenKind::Dot {
            self.advance();
            match self.advance() {
                TokenKind::Ident(part) => path.push(part),
                _ => return Err(Unparsed),
            }
        }

        if self.peek() == &TokenKind::LParen {
            self.advance();
            let args = self.parse_args()?;
            return Ok(self.call_type(&path, &args));
        }

        match path.as_slice() {
            [name] => Ok(self.env.variable_type(name)),
            [module, constant] if module == "math" && matches!(constant.as_str(), "pi" | "e") => {
                Ok(Some(ScalarType::Float))
            }
            _ => Ok(None),
        }
    }

    /// Arguments after an opening parenthesis, through the closing one
    fn parse_args(&mut self) -> Result<Vec<Option<ScalarType>>, Unparsed> {
        let mut args = Vec::new();
        if self.peek() == &TokenKind::RParen {
            self.advance();
            return Ok(args);
        }
        loop {
            args.push(self.parse_expr(0)?);
            match self.advance() {
                TokenKind::Comma => continue,
                TokenKind::RParen => return Ok(args),
                _ => return Err(Unparsed),
            }
        }
    }

    fn call_type(&self, path: &[String], args: &[Option<ScalarType>]) -> Option<ScalarType> {
        match path {
            [name] => match name.as_str() {
                "int" | "float" | "str" | "bool" => ScalarType::from_keyword(name),
                "abs" => args.first().copied().flatten(),
                _ => self.env.return_type(name),
            },
            [module, _] if module == "math" => Some(ScalarType::Float),
            _ => None,
        }
    }
}

/// A call found inside an expression
#[derive(Debug, Clone, PartialEq)]
pub struct CallExpr {
    pub name: String,
    /// Argument source texts, trimmed
    pub args: Vec<String>,
}

/// Every call `name(...)` in an expression, nested ones included, in the
/// order their names appear. Dotted calls such as `math.sqrt(x)` are skipped.
pub fn find_calls(text: &str) -> Vec<CallExpr> {
    let tokens = Lexer::new(text).tokenize();
    let mut calls = Vec::new();

    for i in 0..tokens.len() {
        let Some(name) = tokens[i].ident() else {
            continue;
        };
        if tokens.get(i + 1).map(|t| &t.kind) != Some(&TokenKind::LParen) {
            continue;
        }
        if i > 0 && tokens[i - 1].kind == TokenKind::Dot {
            continue;
        }

        let mut depth = 0usize;
        let mut start = i + 2;
        let mut args = Vec::new();
        for j in i + 1..tokens.len() {
            match &tokens[j].kind {
                TokenKind::LParen | TokenKind::LBracket => depth += 1,
                TokenKind::RParen | TokenKind::RBracket => {
                    depth -= 1;
                    if depth == 0 {
                        if j > start || !args.is_empty() {
                            args.push(argument_text(text, &tokens, start, j));
                        }
                        break;
                    }
                }
                TokenKind::Comma if depth == 1 => {
                    args.push(argument_text(text, &tokens, start, j));
                    start = j + 1;
                }
                TokenKind::Eof => break,
                _ => {}
            }
        }

        calls.push(CallExpr {
            name: name.to_string(),
            args,
        });
    }

    calls
}

fn argument_text(text: &str, tokens: &[Token], from: usize, to: usize) -> String {
    if from >= to {
        return String::new();
    }
    text[tokens[from].span.start..tokens[to - 1].span.end]
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[derive(Default)]
    struct Env {
        vars: HashMap<&'static str, ScalarType>,
        funcs: HashMap<&'static str, ScalarType>,
    }

    impl TypeEnv for Env {
        fn variable_type(&self, name: &str) -> Option<ScalarType> {
            self.vars.get(name).copied()
        }

        fn return_type(&self, function: &str) -> Option<ScalarType> {
            self.funcs.get(function).copied()
        }
    }

    fn env() -> Env {
        let mut env = Env::default();
        env.vars.insert("i", ScalarType::Int);
        env.vars.insert("f", ScalarType::Float);
        env.vars.insert("s", ScalarType::Str);
        env.vars.insert("b", ScalarType::Bool);
        env.funcs.insert("area", ScalarType::Float);
        env
    }

    fn ty(text: &str) -> Option<ScalarType> {
        infer_type(text, &env())
    }

    #[test]
    fn test_literals() {
        assert_eq!(ty("5"), Some(ScalarType::Int));
        assert_eq!(ty("5.0"), Some(ScalarType::Float));
        assert_eq!(ty("\"a\""), Some(ScalarType::Str));
        assert_eq!(ty("'a'"), Some(ScalarType::Str));
        assert_eq!(ty("True"), Some(ScalarType::Bool));
        assert_eq!(ty("None"), None);
    }

    #[test]
    fn test_arithmetic() {
        assert_eq!(ty("i + i"), Some(ScalarType::Int));
        assert_eq!(ty("i + f"), Some(ScalarType::Float));
        assert_eq!(ty("f * f"), Some(ScalarType::Float));
        assert_eq!(ty("i / i"), Some(ScalarType::Float));
        assert_eq!(ty("x / y"), Some(ScalarType::Float));
        assert_eq!(ty("i // 2"), Some(ScalarType::Int));
        assert_eq!(ty("i % 2"), Some(ScalarType::Int));
        assert_eq!(ty("2 ** f"), Some(ScalarType::Float));
        assert_eq!(ty("i + x"), None);
        assert_eq!(ty("-i"), Some(ScalarType::Int));
        assert_eq!(ty("-(f + 1)"), Some(ScalarType::Float));
    }

    #[test]
    fn test_string_concatenation_is_untyped() {
        assert_eq!(ty("s + s"), None);
        assert_eq!(ty("\"a\" + i"), None);
    }

    #[test]
    fn test_logic_and_comparisons() {
        assert_eq!(ty("i > 0"), Some(ScalarType::Bool));
        assert_eq!(ty("x == y"), Some(ScalarType::Bool));
        assert_eq!(ty("a <> b"), Some(ScalarType::Bool));
        assert_eq!(ty("i = 1"), Some(ScalarType::Bool));
        assert_eq!(ty("b and not b"), Some(ScalarType::Bool));
        assert_eq!(ty("i > 0 or f < 1"), Some(ScalarType::Bool));
        assert_eq!(ty("not x"), Some(ScalarType::Bool));
    }

    #[test]
    fn test_precedence() {
        // the comparison binds last, so the whole thing is bool
        assert_eq!(ty("i + 1 > f * 2"), Some(ScalarType::Bool));
        assert_eq!(ty("(i + 1) * 2"), Some(ScalarType::Int));
        assert_eq!(ty("-2 ** 2"), Some(ScalarType::Int));
    }

    #[test]
    fn test_calls() {
        assert_eq!(ty("area(2, 3)"), Some(ScalarType::Float));
        assert_eq!(ty("unknown(1)"), None);
        assert_eq!(ty("int(s)"), Some(ScalarType::Int));
        assert_eq!(ty("str(i)"), Some(ScalarType::Str));
        assert_eq!(ty("abs(i)"), Some(ScalarType::Int));
        assert_eq!(ty("abs(f - 1)"), Some(ScalarType::Float));
        assert_eq!(ty("math.sqrt(i)"), Some(ScalarType::Float));
        assert_eq!(ty("math.pi * 2"), Some(ScalarType::Float));
        assert_eq!(ty("area(1, 2) + i"), Some(ScalarType::Float));
    }

    #[test]
    fn test_unparseable() {
        assert_eq!(ty(""), None);
        assert_eq!(ty("i +"), None);
        assert_eq!(ty("(i"), None);
        assert_eq!(ty("i i"), None);
        assert_eq!(ty("1 | 2"), None);
    }

    #[test]
    fn test_find_calls() {
        let calls = find_calls("f(a, g(b + 1)) + math.sqrt(x) + h()");
        let names: Vec<_> = calls.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["f", "g", "h"]);
        assert_eq!(calls[0].args, vec!["a", "g(b + 1)"]);
        assert_eq!(calls[1].args, vec!["b + 1"]);
        assert!(calls[2].args.is_empty());
    }

    #[test]
    fn test_find_calls_ignores_strings() {
        assert!(find_calls("\"f(x)\" + y").is_empty());
    }
}
