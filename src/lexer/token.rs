//! Token definitions for the Python subset
//!
//! Defines all token types produced by the lexer.

use crate::errors::SourceSpan;
use std::fmt;

/// A token produced by the lexer
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// The kind of token
    pub kind: TokenKind,
    /// Source location of this token
    pub span: SourceSpan,
}

impl Token {
    pub fn new(kind: TokenKind, span: SourceSpan) -> Self {
        Self { kind, span }
    }

    /// Check whether this token is the given keyword
    pub fn is_keyword(&self, kw: Keyword) -> bool {
        matches!(&self.kind, TokenKind::Keyword(k) if *k == kw)
    }

    /// Check whether this token is an identifier with exactly this name
    pub fn is_ident(&self, name: &str) -> bool {
        matches!(&self.kind, TokenKind::Ident(n) if n == name)
    }

    /// The identifier name, if this is an identifier
    pub fn ident(&self) -> Option<&str> {
        match &self.kind {
            TokenKind::Ident(n) => Some(n),
            _ => None,
        }
    }
}

/// Hard keywords. `match`, `case`, `print`, `input` and `range` are
/// recognized by position instead, so they stay usable as names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    // Control flow
    If,
    Elif,
    Else,
    While,
    For,
    In,
    Def,
    Return,
    Pass,

    // Operators
    And,
    Or,
    Not,

    // Literals
    True,
    False,
    None,
}

impl Keyword {
    /// Try to parse a string as a keyword
    pub fn parse(s: &str) -> Option<Keyword> {
        match s {
            "if" => Some(Keyword::If),
            "elif" => Some(Keyword::Elif),
            "else" => Some(Keyword::Else),
            "while" => Some(Keyword::While),
            "for" => Some(Keyword::For),
            "in" => Some(Keyword::In),
            "def" => Some(Keyword::Def),
            "return" => Some(Keyword::Return),
            "pass" => Some(Keyword::Pass),
            "and" => Some(Keyword::And),
            "or" => Some(Keyword::Or),
            "not" => Some(Keyword::Not),
            "True" => Some(Keyword::True),
            "False" => Some(Keyword::False),
            "None" => Some(Keyword::None),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Keyword::If => "if",
            Keyword::Elif => "elif",
            Keyword::Else => "else",
            Keyword::While => "while",
            Keyword::For => "for",
            Keyword::In => "in",
            Keyword::Def => "def",
            Keyword::Return => "return",
            Keyword::Pass => "pass",
            Keyword::And => "and",
            Keyword::Or => "or",
            Keyword::Not => "not",
            Keyword::True => "True",
            Keyword::False => "False",
            Keyword::None => "None",
        }
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The kind of a token
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Literals
    /// Integer literal, kept as written
    Integer(String),
    /// Decimal literal (`1.5`, `.5`, `2e3`), kept as written
    Float(String),
    /// String literal including its quotes; `template` is set for `f"..."`
    String { raw: String, template: bool },
    /// Identifier
    Ident(String),
    /// Keyword
    Keyword(Keyword),

    // Punctuation
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `[`
    LBracket,
    /// `]`
    RBracket,
    /// `,`
    Comma,
    /// `:`
    Colon,
    /// `.`
    Dot,

    // Arithmetic
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Star,
    /// `**`
    StarStar,
    /// `/`
    Slash,
    /// `//`
    SlashSlash,
    /// `%`
    Percent,

    // Comparison and assignment
    /// `=`
    Eq,
    /// `==`
    EqEq,
    /// `!=`
    BangEq,
    /// `<`
    Lt,
    /// `<=`
    LtEq,
    /// `>`
    Gt,
    /// `>=`
    GtEq,
    /// `<>`, already in pseudocode form
    LtGt,

    // Augmented assignment
    /// `+=`
    PlusEq,
    /// `-=`
    MinusEq,
    /// `*=`
    StarEq,
    /// `/=`
    SlashEq,
    /// `//=`
    SlashSlashEq,
    /// `%=`
    PercentEq,

    /// `->`
    Arrow,

    // Special
    /// End of input
    Eof,
    /// Error token (lexer error, but we keep going)
    Error(String),
}

impl TokenKind {
    /// Check if this is an EOF token
    pub fn is_eof(&self) -> bool {
        matches!(self, TokenKind::Eof)
    }

    /// Check if this is an error token
    pub fn is_error(&self) -> bool {
        matches!(self, TokenKind::Error(_))
    }

    /// The binary operator an augmented assignment applies, e.g. `+` for `+=`
    pub fn augmented_operator(&self) -> Option<&'static str> {
        match self {
            TokenKind::PlusEq => Some("+"),
            TokenKind::MinusEq => Some("-"),
            TokenKind::StarEq => Some("*"),
            TokenKind::SlashEq => Some("/"),
            TokenKind::SlashSlashEq => Some("//"),
            TokenKind::PercentEq => Some("%"),
            _ => None,
        }
    }

    /// Get a human-readable description of this token kind
    pub fn description(&self) -> &'static str {
        match self {
            TokenKind::Integer(_) => "integer literal",
            TokenKind::Float(_) => "decimal literal",
            TokenKind::String { .. } => "string literal",
            TokenKind::Ident(_) => "identifier",
            TokenKind::Keyword(_) => "keyword",
            TokenKind::LParen => "'('",
            TokenKind::RParen => "')'",
            TokenKind::LBracket => "'['",
            TokenKind::RBracket => "']'",
            TokenKind::Comma => "','",
            TokenKind::Colon => "':'",
            TokenKind::Dot => "'.'",
            TokenKind::Plus => "'+'",
            TokenKind::Minus => "'-'",
            TokenKind::Star => "'*'",
            TokenKind::StarStar => "'**'",
            TokenKind::Slash => "'/'",
            TokenKind::SlashSlash => "'//'",
            TokenKind::Percent => "'%'",
            TokenKind::Eq => "'='",
            TokenKind::EqEq => "'=='",
            TokenKind::BangEq => "'!='",
            TokenKind::Lt => "'<'",
            TokenKind::LtEq => "'<='",
            TokenKind::Gt => "'>'",
            TokenKind::GtEq => "'>='",
            TokenKind::LtGt => "'<>'",
            TokenKind::PlusEq => "'+='",
            TokenKind::MinusEq => "'-='",
            TokenKind::StarEq => "'*='",
            TokenKind::SlashEq => "'/='",
            TokenKind::SlashSlashEq => "'//='",
            TokenKind::PercentEq => "'%='",
            TokenKind::Arrow => "'->'",
            TokenKind::Eof => "end of line",
            TokenKind::Error(_) => "error",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Integer(n) | TokenKind::Float(n) => write!(f, "{}", n),
            TokenKind::String { raw, .. } => write!(f, "{}", raw),
            TokenKind::Ident(s) => write!(f, "{}", s),
            TokenKind::Keyword(kw) => write!(f, "{}", kw),
            TokenKind::Error(msg) => write!(f, "{}", msg),
            _ => write!(f, "{}", self.description()),
        }
    }
}
