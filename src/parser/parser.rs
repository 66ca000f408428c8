//! Line-oriented recursive parser
//!
//! Each statement occupies one line. Lines are tokenized individually and
//! matched against the statement forms in a fixed order, first match wins.
//! Compound statements take the indented block that follows them and parse
//! it recursively.

use super::ast::*;
use super::directive::is_directive_name;
use super::lines::{collect_block, next_non_blank, split_lines, SourceLine};
use crate::analysis::{SymbolTable, Variable};
use crate::errors::{GlossaError, GlossaResult, SourceSpan};
use crate::lexer::{Keyword, Lexer, Token, TokenKind};
use crate::text::is_valid_identifier;

/// Header line that may open a declaration block
const DECLARATIONS_HEADER: &str = "ΜΕΤΑΒΛΗΤΕΣ";

/// The parser for one source program
pub struct Parser<'src> {
    /// Lines of the source
    lines: Vec<SourceLine<'src>>,
    /// Program-level declarations collected while parsing
    globals: SymbolTable,
}

impl<'src> Parser<'src> {
    /// Create a new parser for the given source code
    pub fn new(source: &'src str) -> Self {
        Self {
            lines: split_lines(source),
            globals: SymbolTable::new(),
        }
    }

    /// Parse the source code into an AST
    pub fn parse(mut self) -> GlossaResult<Ast> {
        let lines = std::mem::take(&mut self.lines);
        let body = self.parse_block(&lines, None)?;
        Ok(Ast {
            body,
            globals: self.globals,
        })
    }

    /// Parse a run of lines. `function` names the enclosing function, if any.
    fn parse_block(
        &mut self,
        lines: &[SourceLine<'src>],
        function: Option<&str>,
    ) -> GlossaResult<Vec<Stmt>> {
        let mut stmts = Vec::new();
        let mut next = 0;

        while next < lines.len() {
            let line = lines[next];
            next += 1;
            if line.is_blank() {
                continue;
            }
            let tokens = LineTokens::new(line)?;
            if let Some(stmt) = self.parse_stmt(&tokens, lines, &mut next, function)? {
                stmts.push(stmt);
            }
        }

        Ok(stmts)
    }

    /// Parse the statement on one line. `next` indexes the line after it and
    /// is advanced past any block the statement owns.
    fn parse_stmt(
        &mut self,
        tokens: &LineTokens<'src>,
        lines: &[SourceLine<'src>],
        next: &mut usize,
        function: Option<&str>,
    ) -> GlossaResult<Option<Stmt>> {
        let span = tokens.span();

        if tokens.check_keyword(0, Keyword::Return) {
            return self.parse_return(tokens, function).map(Some);
        }

        if let Some(kind) = parse_print(tokens)? {
            return Ok(Some(Stmt::new(kind, span)));
        }

        if let Some(kind) = parse_input(tokens)? {
            return Ok(Some(Stmt::new(kind, span)));
        }

        if let Some(kind) = parse_call(tokens)? {
            return Ok(Some(Stmt::new(kind, span)));
        }

        if tokens.ident(0).is_some() && tokens.is_assignment_operator(1) {
            if tokens.ident(0).is_some_and(is_directive_name) {
                return Ok(None);
            }
            return parse_assignment(tokens).map(|kind| Some(Stmt::new(kind, span)));
        }

        if tokens.check_keyword(0, Keyword::If) {
            let kind = self.parse_if(tokens, lines, next, function)?;
            return Ok(Some(Stmt::new(kind, span)));
        }

        if tokens.check_keyword(0, Keyword::While) {
            let condition = tokens.header_expr(1, "while")?;
            let body = self.parse_body(tokens, lines, next, "while", function)?;
            return Ok(Some(Stmt::new(StmtKind::While { condition, body }, span)));
        }

        if tokens.check_keyword(0, Keyword::For) {
            let kind = self.parse_for(tokens, lines, next, function)?;
            return Ok(Some(Stmt::new(kind, span)));
        }

        if tokens.is_ident(0, "match") && tokens.len() > 2 && tokens.ends_with_colon() {
            let kind = self.parse_match(tokens, lines, next, function)?;
            return Ok(Some(Stmt::new(kind, span)));
        }

        if tokens.check_keyword(0, Keyword::Def) {
            if function.is_some() {
                return Err(GlossaError::syntax(
                    "nested function definitions are not supported",
                    span,
                ));
            }
            let func = self.parse_function(tokens, lines, next)?;
            return Ok(Some(Stmt::new(StmtKind::Function(func), span)));
        }

        if is_declarations_header(tokens.line) {
            return match function {
                None => Ok(None),
                Some(_) => Err(misplaced_declaration(span)),
            };
        }

        if let Some((ty, names)) = parse_declaration(tokens)? {
            if function.is_some() {
                return Err(misplaced_declaration(span));
            }
            for name in names {
                self.globals.define(name.name, Variable::declared(ty, name.span));
            }
            return Ok(None);
        }

        if tokens.check_keyword(0, Keyword::Pass) && tokens.len() == 1 {
            return Ok(None);
        }

        for clause in [Keyword::Elif, Keyword::Else] {
            if tokens.check_keyword(0, clause) {
                return Err(GlossaError::syntax(
                    format!("'{}' without a matching 'if'", clause),
                    span,
                ));
            }
        }

        Err(GlossaError::syntax(
            format!("unrecognized statement: {}", tokens.text),
            span,
        ))
    }

    /// `return expr`: inside a function it assigns the function's own name
    fn parse_return(&self, tokens: &LineTokens<'src>, function: Option<&str>) -> GlossaResult<Stmt> {
        let span = tokens.span();
        if tokens.len() == 1 {
            return Err(GlossaError::syntax("'return' needs a value", span));
        }
        let value = tokens.slice(1, tokens.len());
        let kind = match function {
            Some(name) => StmtKind::Assign {
                target: Ident::new(name, tokens.token(0).span),
                value,
            },
            None => StmtKind::Return(value),
        };
        Ok(Stmt::new(kind, span))
    }

    /// Take the block owned by a header line and parse it
    fn parse_body(
        &mut self,
        header: &LineTokens<'src>,
        lines: &[SourceLine<'src>],
        next: &mut usize,
        what: &str,
        function: Option<&str>,
    ) -> GlossaResult<Vec<Stmt>> {
        let block = take_block(header, lines, next, what)?;
        self.parse_block(block, function)
    }

    fn parse_if(
        &mut self,
        tokens: &LineTokens<'src>,
        lines: &[SourceLine<'src>],
        next: &mut usize,
        function: Option<&str>,
    ) -> GlossaResult<StmtKind> {
        let condition = tokens.header_expr(1, "if")?;
        let body = self.parse_body(tokens, lines, next, "if", function)?;
        let indent = tokens.line.indent();

        let mut elifs = Vec::new();
        let mut else_body = None;

        while let Some(index) = next_non_blank(lines, *next) {
            let line = lines[index];
            if line.indent() != indent {
                break;
            }
            let clause = LineTokens::new(line)?;

            if clause.check_keyword(0, Keyword::Elif) {
                *next = index + 1;
                let condition = clause.header_expr(1, "elif")?;
                let body = self.parse_body(&clause, lines, next, "elif", function)?;
                elifs.push(ElifBranch { condition, body });
            } else if clause.check_keyword(0, Keyword::Else) {
                if clause.len() != 2 || !clause.ends_with_colon() {
                    return Err(GlossaError::syntax("expected 'else:'", clause.span()));
                }
                *next = index + 1;
                else_body = Some(self.parse_body(&clause, lines, next, "else", function)?);
                break;
            } else {
                break;
            }
        }

        Ok(StmtKind::If {
            condition,
            body,
            elifs,
            else_body,
        })
    }

    fn parse_for(
        &mut self,
        tokens: &LineTokens<'src>,
        lines: &[SourceLine<'src>],
        next: &mut usize,
        function: Option<&str>,
    ) -> GlossaResult<StmtKind> {
        let len = tokens.len();
        let close = tokens.matching_close(4);
        let well_formed = tokens.ident(1).is_some()
            && tokens.check_keyword(2, Keyword::In)
            && tokens.is_ident(3, "range")
            && tokens.kind(4) == &TokenKind::LParen
            && len >= 7
            && close == Some(len - 2)
            && tokens.ends_with_colon();
        if !well_formed {
            return Err(GlossaError::syntax(
                "only 'for <name> in range(...):' loops are supported",
                tokens.span(),
            ));
        }

        let iterator = tokens.ident_at(1)?;
        let args = tokens.arguments(5, len - 2)?;
        let found = args.len();
        let mut args = args.into_iter();
        let (start, end, step) = match (args.next(), args.next(), args.next(), args.next()) {
            (Some(end), None, None, None) => {
                let zero = Expr::new("0", SourceSpan::new(end.span.start, end.span.start));
                (zero, end, None)
            }
            (Some(start), Some(end), None, None) => (start, end, None),
            (Some(start), Some(end), Some(step), None) => (start, end, Some(step)),
            _ => {
                return Err(GlossaError::InvalidRangeArity {
                    found,
                    span: tokens.span_of(3, len - 1),
                })
            }
        };

        let body = self.parse_body(tokens, lines, next, "for", function)?;
        Ok(StmtKind::For {
            iterator,
            start,
            end,
            step,
            body,
        })
    }

    fn parse_match(
        &mut self,
        tokens: &LineTokens<'src>,
        lines: &[SourceLine<'src>],
        next: &mut usize,
        function: Option<&str>,
    ) -> GlossaResult<StmtKind> {
        let subject = tokens.header_expr(1, "match")?;
        let block = take_block(tokens, lines, next, "match")?;

        let mut cases = Vec::new();
        let mut default = None;
        let mut index = 0;

        while let Some(start) = next_non_blank(block, index) {
            let line = block[start];
            let clause = LineTokens::new(line)?;
            let is_case = clause.is_ident(0, "case") && clause.len() > 2 && clause.ends_with_colon();
            if !is_case {
                return Err(GlossaError::InvalidMatchCaseSyntax {
                    line: line.content().to_string(),
                    span: line.span(),
                });
            }

            let pattern = clause.slice(1, clause.len() - 1);
            index = start + 1;
            let body = self.parse_body(&clause, block, &mut index, "case", function)?;

            if pattern.text == "_" {
                if default.is_some() {
                    return Err(GlossaError::syntax("duplicate 'case _:'", line.span()));
                }
                default = Some(body);
            } else {
                cases.push(MatchCase { pattern, body });
            }
        }

        Ok(StmtKind::Match {
            subject,
            cases,
            default,
        })
    }

    fn parse_function(
        &mut self,
        tokens: &LineTokens<'src>,
        lines: &[SourceLine<'src>],
        next: &mut usize,
    ) -> GlossaResult<Function> {
        let len = tokens.len();
        let malformed = || {
            GlossaError::syntax(
                "expected 'def name(params):' or 'def name(params) -> type:'",
                tokens.span(),
            )
        };

        if tokens.ident(1).is_none() || tokens.kind(2) != &TokenKind::LParen || !tokens.ends_with_colon() {
            return Err(malformed());
        }
        let name = tokens.ident_at(1)?;
        let close = tokens.matching_close(2).ok_or_else(malformed)?;

        let declared_return = if close + 2 == len {
            None
        } else if tokens.kind(close + 1) == &TokenKind::Arrow && close + 4 == len {
            let ty = tokens.token(close + 2);
            match &ty.kind {
                TokenKind::Keyword(Keyword::None) => None,
                TokenKind::Ident(word) => Some(
                    ScalarType::from_keyword(word)
                        .ok_or_else(|| GlossaError::unknown_type(word.as_str(), ty.span))?,
                ),
                _ => {
                    return Err(GlossaError::syntax(
                        "expected a return type after '->'",
                        ty.span,
                    ))
                }
            }
        } else {
            return Err(malformed());
        };

        let mut params = Vec::new();
        for (from, to) in tokens.split_commas(3, close) {
            params.push(parse_param(tokens, from, to)?);
        }

        let block = take_block(tokens, lines, next, "def")?;
        let (locals, rest) = parse_leading_declarations(block)?;
        let body = self.parse_block(rest, Some(&name.name))?;

        Ok(Function {
            name,
            params,
            declared_return,
            return_type: None,
            locals,
            body,
        })
    }
}

/// The tokens of one statement line
struct LineTokens<'src> {
    line: SourceLine<'src>,
    /// The statement text of the line
    text: &'src str,
    /// Byte offset of `text` in the source
    base: usize,
    /// Tokens of `text`, ending with `Eof`
    tokens: Vec<Token>,
}

impl<'src> LineTokens<'src> {
    fn new(line: SourceLine<'src>) -> GlossaResult<Self> {
        let text = line.content();
        let base = line.content_offset();
        let tokens = Lexer::with_offset(text, base).tokenize();

        if let Some(token) = tokens.iter().find(|t| t.kind.is_error()) {
            return Err(GlossaError::syntax(token.kind.to_string(), token.span));
        }

        Ok(Self {
            line,
            text,
            base,
            tokens,
        })
    }

    /// Number of tokens, not counting the end marker
    fn len(&self) -> usize {
        self.tokens.len() - 1
    }

    /// Token at `i`; past the end this is the end marker
    fn token(&self, i: usize) -> &Token {
        &self.tokens[i.min(self.tokens.len() - 1)]
    }

    fn kind(&self, i: usize) -> &TokenKind {
        &self.token(i).kind
    }

    fn span(&self) -> SourceSpan {
        self.line.span()
    }

    fn check_keyword(&self, i: usize, kw: Keyword) -> bool {
        self.token(i).is_keyword(kw)
    }

    fn is_ident(&self, i: usize, name: &str) -> bool {
        self.token(i).is_ident(name)
    }

    fn ident(&self, i: usize) -> Option<&str> {
        self.token(i).ident()
    }

    fn is_assignment_operator(&self, i: usize) -> bool {
        let kind = self.kind(i);
        *kind == TokenKind::Eq || kind.augmented_operator().is_some()
    }

    fn ends_with_colon(&self) -> bool {
        self.len() > 0 && *self.kind(self.len() - 1) == TokenKind::Colon
    }

    /// Parse an identifier at `i`, checking its character set
    fn ident_at(&self, i: usize) -> GlossaResult<Ident> {
        let token = self.token(i);
        match &token.kind {
            TokenKind::Ident(name) if is_valid_identifier(name) => Ok(Ident::new(name.as_str(), token.span)),
            TokenKind::Ident(name) => Err(GlossaError::invalid_identifier(name.as_str(), token.span)),
            other => Err(GlossaError::syntax(
                format!("expected identifier, found {}", other.description()),
                token.span,
            )),
        }
    }

    /// Span from the start of token `from` to the end of token `to - 1`
    fn span_of(&self, from: usize, to: usize) -> SourceSpan {
        self.token(from).span.merge(self.token(to.saturating_sub(1)).span)
    }

    /// The source text of tokens `from..to` as an expression
    fn slice(&self, from: usize, to: usize) -> Expr {
        let span = self.span_of(from, to);
        let text = &self.text[span.start - self.base..span.end - self.base];
        Expr::new(text.trim(), span)
    }

    /// The expression between a header keyword and the final `:`
    fn header_expr(&self, from: usize, what: &str) -> GlossaResult<Expr> {
        if !self.ends_with_colon() {
            return Err(GlossaError::syntax(
                format!("expected ':' at the end of the '{}' line", what),
                self.span(),
            ));
        }
        if self.len() <= from + 1 {
            return Err(GlossaError::syntax(
                format!("missing condition after '{}'", what),
                self.span(),
            ));
        }
        Ok(self.slice(from, self.len() - 1))
    }

    /// Index of the bracket closing the one opened at `open`
    fn matching_close(&self, open: usize) -> Option<usize> {
        let mut depth = 0usize;
        for i in open..self.len() {
            match self.kind(i) {
                TokenKind::LParen | TokenKind::LBracket => depth += 1,
                TokenKind::RParen | TokenKind::RBracket => {
                    depth = depth.checked_sub(1)?;
                    if depth == 0 {
                        return Some(i);
                    }
                }
                _ => {}
            }
            if depth == 0 {
                return None;
            }
        }
        None
    }

    /// Token ranges of `from..to` separated by top-level commas
    fn split_commas(&self, from: usize, to: usize) -> Vec<(usize, usize)> {
        if from >= to {
            return Vec::new();
        }
        let mut ranges = Vec::new();
        let mut depth = 0usize;
        let mut start = from;
        for i in from..to {
            match self.kind(i) {
                TokenKind::LParen | TokenKind::LBracket => depth += 1,
                TokenKind::RParen | TokenKind::RBracket => depth = depth.saturating_sub(1),
                TokenKind::Comma if depth == 0 => {
                    ranges.push((start, i));
                    start = i + 1;
                }
                _ => {}
            }
        }
        ranges.push((start, to));
        ranges
    }

    /// Comma-separated expressions in `from..to`
    fn arguments(&self, from: usize, to: usize) -> GlossaResult<Vec<Expr>> {
        self.split_commas(from, to)
            .into_iter()
            .map(|(start, end)| {
                if start == end {
                    Err(GlossaError::syntax("empty argument", self.token(start).span))
                } else {
                    Ok(self.slice(start, end))
                }
            })
            .collect()
    }
}

/// `print(...)`, with an f-string argument split into parts
fn parse_print(tokens: &LineTokens<'_>) -> GlossaResult<Option<StmtKind>> {
    let len = tokens.len();
    if !tokens.is_ident(0, "print")
        || tokens.kind(1) != &TokenKind::LParen
        || tokens.matching_close(1) != Some(len - 1)
    {
        return Ok(None);
    }

    if len == 3 {
        return Ok(Some(StmtKind::Print(PrintArgs::Expr(Expr::new(
            "",
            tokens.span_of(1, 3),
        )))));
    }

    let first = tokens.token(2);
    if len == 4 && matches!(first.kind, TokenKind::String { template: true, .. }) {
        return Ok(Some(StmtKind::Print(PrintArgs::Template(parse_template(first)?))));
    }

    Ok(Some(StmtKind::Print(PrintArgs::Expr(tokens.slice(2, len - 1)))))
}

/// Split an f-string token into text and `{expr}` parts
fn parse_template(token: &Token) -> GlossaResult<Vec<TemplatePart>> {
    let TokenKind::String { raw, .. } = &token.kind else {
        return Ok(Vec::new());
    };
    // skip the prefix letter and the quotes, one byte each
    let content = &raw[2..raw.len() - 1];
    let base = token.span.start + 2;

    let mut parts = Vec::new();
    let mut text = String::new();
    let mut chars = content.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        let doubled = chars.peek().map(|&(_, n)| n) == Some(c);
        match c {
            '{' | '}' if doubled => {
                chars.next();
                text.push(c);
            }
            '{' => {
                let close = content[i..].find('}').map(|j| i + j).ok_or_else(|| {
                    GlossaError::syntax(
                        "unclosed '{' in f-string",
                        SourceSpan::new(base + i, base + content.len()),
                    )
                })?;
                let span = SourceSpan::new(base + i + 1, base + close);
                let inner = content[i + 1..close].trim();
                if inner.is_empty() {
                    return Err(GlossaError::syntax("empty expression in f-string", span));
                }
                if !text.is_empty() {
                    parts.push(TemplatePart::Text(std::mem::take(&mut text)));
                }
                parts.push(TemplatePart::Expr(Expr::new(inner, span)));
                while chars.peek().is_some_and(|&(j, _)| j <= close) {
                    chars.next();
                }
            }
            _ => text.push(c),
        }
    }

    if !text.is_empty() {
        parts.push(TemplatePart::Text(text));
    }
    Ok(parts)
}

/// `x = input(...)` or `x = int(input(...))` and the other conversions
fn parse_input(tokens: &LineTokens<'_>) -> GlossaResult<Option<StmtKind>> {
    let len = tokens.len();
    if tokens.ident(0).is_none() || tokens.kind(1) != &TokenKind::Eq {
        return Ok(None);
    }

    let direct = tokens.is_ident(2, "input")
        && tokens.kind(3) == &TokenKind::LParen
        && tokens.matching_close(3) == Some(len - 1);

    let conversion = tokens
        .ident(2)
        .filter(|name| matches!(*name, "int" | "float" | "str" | "bool"))
        .and_then(ScalarType::from_keyword);
    let wrapped = conversion.is_some()
        && tokens.kind(3) == &TokenKind::LParen
        && tokens.is_ident(4, "input")
        && tokens.kind(5) == &TokenKind::LParen
        && tokens.matching_close(5) == Some(len - 2)
        && tokens.matching_close(3) == Some(len - 1);

    if !direct && !wrapped {
        return Ok(None);
    }

    Ok(Some(StmtKind::Input {
        target: tokens.ident_at(0)?,
        conversion: if wrapped { conversion } else { None },
    }))
}

/// A call statement `name(args)`
fn parse_call(tokens: &LineTokens<'_>) -> GlossaResult<Option<StmtKind>> {
    let len = tokens.len();
    if tokens.ident(0).is_none()
        || tokens.kind(1) != &TokenKind::LParen
        || tokens.matching_close(1) != Some(len - 1)
    {
        return Ok(None);
    }
    let token = tokens.token(0);
    let name = Ident::new(token.ident().unwrap_or_default(), token.span);
    let args = tokens.arguments(2, len - 1)?;
    Ok(Some(StmtKind::Call { name, args }))
}

/// `x = expr` and the augmented forms, which are desugared
fn parse_assignment(tokens: &LineTokens<'_>) -> GlossaResult<StmtKind> {
    let target = tokens.ident_at(0)?;
    let len = tokens.len();
    if len < 3 {
        return Err(GlossaError::syntax("missing value in assignment", tokens.span()));
    }
    let rhs = tokens.slice(2, len);

    let value = match tokens.kind(1).augmented_operator() {
        None => rhs,
        Some(op) => {
            let compound = has_top_level_operator(tokens, 2, len);
            let text = if compound {
                format!("{} {} ({})", target.name, op, rhs.text)
            } else {
                format!("{} {} {}", target.name, op, rhs.text)
            };
            Expr::new(text, rhs.span)
        }
    };

    Ok(StmtKind::Assign { target, value })
}

/// Whether tokens `from..to` contain an operator outside any brackets
fn has_top_level_operator(tokens: &LineTokens<'_>, from: usize, to: usize) -> bool {
    let mut depth = 0usize;
    for i in from..to {
        let kind = tokens.kind(i);
        match kind {
            TokenKind::LParen | TokenKind::LBracket => depth += 1,
            TokenKind::RParen | TokenKind::RBracket => depth = depth.saturating_sub(1),
            _ if depth == 0 && is_operator(kind) => return true,
            _ => {}
        }
    }
    false
}

fn is_operator(kind: &TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Plus
            | TokenKind::Minus
            | TokenKind::Star
            | TokenKind::StarStar
            | TokenKind::Slash
            | TokenKind::SlashSlash
            | TokenKind::Percent
            | TokenKind::EqEq
            | TokenKind::BangEq
            | TokenKind::Lt
            | TokenKind::LtEq
            | TokenKind::Gt
            | TokenKind::GtEq
            | TokenKind::LtGt
            | TokenKind::Keyword(Keyword::And | Keyword::Or | Keyword::Not)
    )
}

/// A parameter: `name` or `name: type`
fn parse_param(tokens: &LineTokens<'_>, from: usize, to: usize) -> GlossaResult<Param> {
    let span = tokens.span_of(from, to.max(from + 1));
    match to - from {
        1 => Ok(Param {
            name: tokens.ident_at(from)?,
            ty: None,
            span,
        }),
        3 if tokens.kind(from + 1) == &TokenKind::Colon => {
            let name = tokens.ident_at(from)?;
            let ty_token = tokens.token(from + 2);
            let word = ty_token.ident().unwrap_or_default();
            let ty = ScalarType::from_keyword(word).ok_or_else(|| {
                GlossaError::unknown_type(ty_token.kind.to_string(), ty_token.span)
            })?;
            Ok(Param {
                name,
                ty: Some(ty),
                span,
            })
        }
        _ => Err(GlossaError::syntax("expected 'name' or 'name: type' parameter", span)),
    }
}

/// A declaration line `<type>: a, b, c`. `None` if the line has another shape.
fn parse_declaration(tokens: &LineTokens<'_>) -> GlossaResult<Option<(ScalarType, Vec<Ident>)>> {
    let Some(word) = tokens.ident(0) else {
        return Ok(None);
    };
    if tokens.kind(1) != &TokenKind::Colon || tokens.len() < 3 {
        return Ok(None);
    }

    let ty = ScalarType::from_keyword(word)
        .ok_or_else(|| GlossaError::unknown_type(word, tokens.token(0).span))?;

    let list_start = tokens.token(2).span.start - tokens.base;
    let mut names = Vec::new();
    let mut offset = list_start;
    for piece in tokens.text[list_start..].split(',') {
        let name = piece.trim();
        let start = tokens.base + offset + (piece.len() - piece.trim_start().len());
        offset += piece.len() + 1;
        if name.is_empty() {
            continue;
        }
        let span = SourceSpan::new(start, start + name.len());
        if !is_valid_identifier(name) {
            return Err(GlossaError::invalid_identifier(name, span));
        }
        names.push(Ident::new(name, span));
    }

    Ok(Some((ty, names)))
}

/// The leading declarations of a function body, optionally headed by
/// `ΜΕΤΑΒΛΗΤΕΣ`. Returns them with the remaining lines.
fn parse_leading_declarations<'a, 'src>(
    block: &'a [SourceLine<'src>],
) -> GlossaResult<(SymbolTable, &'a [SourceLine<'src>])> {
    let mut locals = SymbolTable::new();
    let mut index = 0;

    if let Some(first) = next_non_blank(block, 0) {
        if is_declarations_header(block[first]) {
            index = first + 1;
        }
    }

    while let Some(line_index) = next_non_blank(block, index) {
        let tokens = LineTokens::new(block[line_index])?;
        match parse_declaration(&tokens)? {
            Some((ty, names)) => {
                for name in names {
                    locals.define(name.name, Variable::declared(ty, name.span));
                }
                index = line_index + 1;
            }
            None => {
                index = line_index;
                break;
            }
        }
    }

    Ok((locals, &block[index.min(block.len())..]))
}

fn is_declarations_header(line: SourceLine<'_>) -> bool {
    line.content().to_uppercase() == DECLARATIONS_HEADER
}

fn misplaced_declaration(span: SourceSpan) -> GlossaError {
    GlossaError::syntax(
        "declarations are only allowed at program level or at the start of a function body",
        span,
    )
}

/// Take the indented block after a header line, advancing `next` past it
fn take_block<'a, 'src>(
    header: &LineTokens<'src>,
    lines: &'a [SourceLine<'src>],
    next: &mut usize,
    what: &str,
) -> GlossaResult<&'a [SourceLine<'src>]> {
    let start = *next;
    let end = collect_block(lines, start, header.line.indent());
    *next = end;

    let block = &lines[start..end];
    if block.iter().all(|line| line.is_blank()) {
        return Err(GlossaError::syntax(
            format!("expected an indented block after '{}'", what),
            header.span(),
        ));
    }
    Ok(block)
}
