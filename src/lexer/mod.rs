//! Lexer module for the Python subset
//!
//! Hand-written lexer that tokenizes one line or expression at a time.

mod scanner;
mod token;

pub use scanner::Lexer;
pub use token::{Keyword, Token, TokenKind};
