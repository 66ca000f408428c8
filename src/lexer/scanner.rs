//! Hand-written lexer/scanner for the Python subset
//!
//! Tokenizes a single logical line (or a single expression). Block structure
//! comes from indentation and is handled by the parser, so newlines and
//! comments never reach the scanner.

use super::token::{Keyword, Token, TokenKind};
use crate::errors::SourceSpan;

/// The lexer/scanner for one line of source
pub struct Lexer<'src> {
    /// The text being lexed
    source: &'src str,
    /// Byte offset of `source` within the whole program, added to every span
    base: usize,
    pos: usize,
    start: usize,
}

impl<'src> Lexer<'src> {
    /// Create a new lexer for the given text
    pub fn new(source: &'src str) -> Self {
        Self::with_offset(source, 0)
    }

    /// Create a lexer whose spans are shifted by `base` bytes
    pub fn with_offset(source: &'src str, base: usize) -> Self {
        Self {
            source,
            base,
            pos: 0,
            start: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.source[self.pos..].chars().next()
    }

    fn peek_next(&self) -> Option<char> {
        let mut chars = self.source[self.pos..].chars();
        chars.next();
        chars.next()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    /// Span of the current lexeme, in whole-program bytes
    fn current_span(&self) -> SourceSpan {
        SourceSpan::new(self.base + self.start, self.base + self.pos)
    }

    fn current_lexeme(&self) -> &'src str {
        &self.source[self.start..self.pos]
    }

    fn make_token(&self, kind: TokenKind) -> Token {
        Token::new(kind, self.current_span())
    }

    fn match_char(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.advance();
        }
    }

    /// Scan a number literal; the first character has been consumed
    fn scan_number(&mut self) -> Token {
        let mut is_float = self.current_lexeme() == ".";

        while self.peek().is_some_and(|c| c.is_ascii_digit() || c == '_') {
            self.advance();
        }

        if !is_float
            && self.peek() == Some('.')
            && !self.peek_next().is_some_and(|c| c.is_alphabetic() || c == '_')
        {
            is_float = true;
            self.advance();
            while self.peek().is_some_and(|c| c.is_ascii_digit() || c == '_') {
                self.advance();
            }
        }

        if matches!(self.peek(), Some('e' | 'E')) {
            let exponent_follows = match self.peek_next() {
                Some(c) if c.is_ascii_digit() => true,
                Some('+' | '-') => {
                    let mut chars = self.source[self.pos..].chars().skip(2);
                    chars.next().is_some_and(|c| c.is_ascii_digit())
                }
                _ => false,
            };
            if exponent_follows {
                is_float = true;
                self.advance();
                if matches!(self.peek(), Some('+' | '-')) {
                    self.advance();
                }
                while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                    self.advance();
                }
            }
        }

        let text = self.current_lexeme().to_string();
        if is_float {
            self.make_token(TokenKind::Float(text))
        } else {
            self.make_token(TokenKind::Integer(text))
        }
    }

    /// Scan a string literal; the opening quote has been consumed.
    /// Escapes are kept verbatim, the pseudocode output reuses the raw text.
    fn scan_string(&mut self, quote: char, template: bool) -> Token {
        while let Some(c) = self.advance() {
            if c == '\\' {
                if self.advance().is_none() {
                    break;
                }
                continue;
            }
            if c == quote {
                let raw = self.current_lexeme().to_string();
                return self.make_token(TokenKind::String { raw, template });
            }
        }

        self.make_token(TokenKind::Error("unterminated string".to_string()))
    }

    /// Identifier, hard keyword, or the `f` prefix of a template string
    fn scan_identifier(&mut self) -> Token {
        while self.peek().is_some_and(|c| c.is_alphanumeric() || c == '_') {
            self.advance();
        }

        let text = self.current_lexeme();

        // f-strings: the prefix glues onto the literal
        if matches!(text, "f" | "F") {
            if let Some(quote @ ('"' | '\'')) = self.peek() {
                self.advance();
                return self.scan_string(quote, true);
            }
        }

        if let Some(kw) = Keyword::parse(text) {
            self.make_token(TokenKind::Keyword(kw))
        } else {
            self.make_token(TokenKind::Ident(text.to_string()))
        }
    }

    /// Next token; yields `Eof` forever once the line is exhausted
    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace();
        self.start = self.pos;

        let Some(c) = self.advance() else {
            return self.make_token(TokenKind::Eof);
        };

        // Identifiers and keywords
        if c.is_alphabetic() || c == '_' {
            return self.scan_identifier();
        }

        // Numbers
        if c.is_ascii_digit() || (c == '.' && self.peek().is_some_and(|n| n.is_ascii_digit())) {
            return self.scan_number();
        }

        // String literals
        if c == '"' || c == '\'' {
            return self.scan_string(c, false);
        }

        // Punctuation and operators
        match c {
            '(' => self.make_token(TokenKind::LParen),
            ')' => self.make_token(TokenKind::RParen),
            '[' => self.make_token(TokenKind::LBracket),
            ']' => self.make_token(TokenKind::RBracket),
            ',' => self.make_token(TokenKind::Comma),
            ':' => self.make_token(TokenKind::Colon),
            '.' => self.make_token(TokenKind::Dot),

            '+' => {
                if self.match_char('=') {
                    self.make_token(TokenKind::PlusEq)
                } else {
                    self.make_token(TokenKind::Plus)
                }
            }

            '-' => {
                if self.match_char('=') {
                    self.make_token(TokenKind::MinusEq)
                } else if self.match_char('>') {
                    self.make_token(TokenKind::Arrow)
                } else {
                    self.make_token(TokenKind::Minus)
                }
            }

            '*' => {
                if self.match_char('*') {
                    self.make_token(TokenKind::StarStar)
                } else if self.match_char('=') {
                    self.make_token(TokenKind::StarEq)
                } else {
                    self.make_token(TokenKind::Star)
                }
            }

            '/' => {
                if self.match_char('/') {
                    if self.match_char('=') {
                        self.make_token(TokenKind::SlashSlashEq)
                    } else {
                        self.make_token(TokenKind::SlashSlash)
                    }
                } else if self.match_char('=') {
                    self.make_token(TokenKind::SlashEq)
                } else {
                    self.make_token(TokenKind::Slash)
                }
            }

            '%' => {
                if self.match_char('=') {
                    self.make_token(TokenKind::PercentEq)
                } else {
                    self.make_token(TokenKind::Percent)
                }
            }

            '!' => {
                if self.match_char('=') {
                    self.make_token(TokenKind::BangEq)
                } else {
                    self.make_token(TokenKind::Error("unexpected character: !".to_string()))
                }
            }

            '=' => {
                if self.match_char('=') {
                    self.make_token(TokenKind::EqEq)
                } else {
                    self.make_token(TokenKind::Eq)
                }
            }

            '<' => {
                if self.match_char('=') {
                    self.make_token(TokenKind::LtEq)
                } else if self.match_char('>') {
                    self.make_token(TokenKind::LtGt)
                } else {
                    self.make_token(TokenKind::Lt)
                }
            }

            '>' => {
                if self.match_char('=') {
                    self.make_token(TokenKind::GtEq)
                } else {
                    self.make_token(TokenKind::Gt)
                }
            }

            _ => self.make_token(TokenKind::Error(format!("unexpected character: {}", c))),
        }
    }

    /// Collect all tokens into a vector, ending with `Eof`
    pub fn tokenize(mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let is_eof = token.kind.is_eof();
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(source: &str) -> Vec<TokenKind> {
        Lexer::new(source)
            .tokenize()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    fn ident(name: &str) -> TokenKind {
        TokenKind::Ident(name.to_string())
    }

    #[test]
    fn test_basic_tokens() {
        let tokens = lex("( ) [ ] , : .");
        assert_eq!(
            tokens,
            vec![
                TokenKind::LParen,
                TokenKind::RParen,
                TokenKind::LBracket,
                TokenKind::RBracket,
                TokenKind::Comma,
                TokenKind::Colon,
                TokenKind::Dot,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_operators() {
        let tokens = lex("+ - * ** / // % == != <= >= <> -> += //=");
        assert_eq!(
            tokens,
            vec![
                TokenKind::Plus,
                TokenKind::Minus,
                TokenKind::Star,
                TokenKind::StarStar,
                TokenKind::Slash,
                TokenKind::SlashSlash,
                TokenKind::Percent,
                TokenKind::EqEq,
                TokenKind::BangEq,
                TokenKind::LtEq,
                TokenKind::GtEq,
                TokenKind::LtGt,
                TokenKind::Arrow,
                TokenKind::PlusEq,
                TokenKind::SlashSlashEq,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_numbers() {
        let tokens = lex("42 3.14 .5 2e10 7.");
        assert_eq!(
            tokens,
            vec![
                TokenKind::Integer("42".to_string()),
                TokenKind::Float("3.14".to_string()),
                TokenKind::Float(".5".to_string()),
                TokenKind::Float("2e10".to_string()),
                TokenKind::Float("7.".to_string()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_strings_keep_raw_text() {
        let tokens = lex(r#""hello" 'it\'s' f"x={x}""#);
        assert_eq!(
            tokens,
            vec![
                TokenKind::String {
                    raw: "\"hello\"".to_string(),
                    template: false
                },
                TokenKind::String {
                    raw: r"'it\'s'".to_string(),
                    template: false
                },
                TokenKind::String {
                    raw: "f\"x={x}\"".to_string(),
                    template: true
                },
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_unterminated_string() {
        let tokens = lex("\"abc");
        assert!(tokens[0].is_error());
    }

    #[test]
    fn test_keywords_and_contextual_names() {
        let tokens = lex("if x and not y match case print");
        assert_eq!(
            tokens,
            vec![
                TokenKind::Keyword(Keyword::If),
                ident("x"),
                TokenKind::Keyword(Keyword::And),
                TokenKind::Keyword(Keyword::Not),
                ident("y"),
                ident("match"),
                ident("case"),
                ident("print"),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_greek_identifiers() {
        let tokens = lex("ΑΘΡΟΙΣΜΑ = μέσος_όρος2");
        assert_eq!(
            tokens,
            vec![ident("ΑΘΡΟΙΣΜΑ"), TokenKind::Eq, ident("μέσος_όρος2"), TokenKind::Eof]
        );
    }

    #[test]
    fn test_spans_are_offset() {
        let tokens = Lexer::with_offset("x = 1", 10).tokenize();
        assert_eq!(tokens[0].span, SourceSpan::new(10, 11));
        assert_eq!(tokens[2].span, SourceSpan::new(14, 15));
    }

    #[test]
    fn test_method_call_on_integer_is_not_float() {
        let tokens = lex("math.pi");
        assert_eq!(tokens, vec![ident("math"), TokenKind::Dot, ident("pi"), TokenKind::Eof]);
    }
}
