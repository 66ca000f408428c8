//! Expression translation
//!
//! Two passes over expression text. The first translates operators, word
//! keywords and math functions, escapes `<`, `>` and `&`, and collapses
//! whitespace, all outside string literals. The second wraps string and
//! numeric literals in highlight spans, copying markup from the first pass
//! through untouched.

use super::dialect::{math_function, word_keyword};
use crate::text::{is_word_char, StringMask};

pub const KEYWORD_CLASS: &str = "func";
pub const STRING_CLASS: &str = "str";
pub const NUMBER_CLASS: &str = "int";

/// Wrap `text` in a highlight span
pub fn span(class: &str, text: &str) -> String {
    format!("<span class=\"{}\">{}</span>", class, text)
}

/// A keyword of the target language
pub fn keyword(word: &str) -> String {
    span(KEYWORD_CLASS, word)
}

/// Translate an expression into highlighted target-language markup
pub fn translate_expression(text: &str) -> String {
    highlight_literals(&translate_keywords(text))
        .trim()
        .to_string()
}

/// Render a `case` pattern; alternatives `a | b` become `a, b`
pub fn translate_pattern(text: &str) -> String {
    let mask = StringMask::new(text);
    let mut alternatives = Vec::new();
    let mut start = 0;
    for (i, c) in text.char_indices() {
        if c == '|' && !mask.is_inside(i) {
            alternatives.push(&text[start..i]);
            start = i + 1;
        }
    }
    alternatives.push(&text[start..]);

    alternatives
        .into_iter()
        .map(|alt| translate_expression(alt.trim()))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Quote literal text as a string literal and highlight it.
///
/// Escape sequences already in `text` are kept; bare double quotes get one.
pub fn quote_text(text: &str) -> String {
    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push('"');
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some(next) => {
                    quoted.push('\\');
                    quoted.push(next);
                }
                None => quoted.push_str("\\\\"),
            },
            '"' => quoted.push_str("\\\""),
            _ => quoted.push(c),
        }
    }
    quoted.push('"');
    translate_expression(&quoted)
}

/// First pass: operators, keywords, math functions, escaping, whitespace
pub fn translate_keywords(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut pos = 0;

    while let Some(c) = text[pos..].chars().next() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            push_escaped(&mut out, c);
            pos += c.len_utf8();
            continue;
        }

        let rest = &text[pos..];
        if is_word_char(c) {
            let word = word_at(rest);
            out.push_str(&translate_word(word, &rest[word.len()..]));
            pos += word.len();
            continue;
        }

        let (translated, len): (String, usize) = if rest.starts_with("//") {
            (keyword("div"), 2)
        } else if rest.starts_with("**") {
            ("^".to_string(), 2)
        } else if rest.starts_with("==") {
            ("=".to_string(), 2)
        } else if rest.starts_with("!=") {
            ("&lt;&gt;".to_string(), 2)
        } else if c == '%' {
            (keyword("mod"), 1)
        } else if c.is_whitespace() {
            if !out.is_empty() && !out.ends_with(' ') {
                out.push(' ');
            }
            pos += c.len_utf8();
            continue;
        } else {
            if c == '"' || c == '\'' {
                quote = Some(c);
            }
            push_escaped(&mut out, c);
            pos += c.len_utf8();
            continue;
        };
        out.push_str(&translated);
        pos += len;
    }

    out
}

/// The word at the start of `text`, extended over `math.<name>`
fn word_at(text: &str) -> &str {
    let end = text.find(|c: char| !is_word_char(c)).unwrap_or(text.len());
    let word = &text[..end];
    if word == "math" && text[end..].starts_with('.') {
        let tail = &text[end + 1..];
        let len = tail.find(|c: char| !is_word_char(c)).unwrap_or(tail.len());
        if len > 0 {
            return &text[..end + 1 + len];
        }
    }
    word
}

fn translate_word(word: &str, after: &str) -> String {
    if after.trim_start().starts_with('(') {
        if let Some(name) = math_function(word) {
            return name.to_string();
        }
    }
    match word_keyword(word) {
        Some(translated) => keyword(translated),
        None => word.to_string(),
    }
}

fn push_escaped(out: &mut String, c: char) {
    match c {
        '<' => out.push_str("&lt;"),
        '>' => out.push_str("&gt;"),
        '&' => out.push_str("&amp;"),
        _ => out.push(c),
    }
}

/// Second pass: wrap string and numeric literals in spans. Existing `<...>`
/// markup is copied verbatim so spans never nest.
pub fn highlight_literals(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev: Option<char> = None;
    let mut pos = 0;

    while let Some(c) = text[pos..].chars().next() {
        let rest = &text[pos..];

        if c == '<' {
            let len = rest.find('>').map_or(rest.len(), |j| j + 1);
            out.push_str(&rest[..len]);
            pos += len;
            prev = Some('>');
            continue;
        }

        if c == '"' || c == '\'' {
            if let Some(len) = literal_len(rest, c) {
                out.push_str(&span(STRING_CLASS, &rest[..len]));
                pos += len;
                prev = Some(c);
                continue;
            }
        }

        if (c.is_ascii_digit() || c == '.') && !prev.is_some_and(is_word_char) {
            if let Some(len) = number_len(rest) {
                out.push_str(&span(NUMBER_CLASS, &rest[..len]));
                pos += len;
                prev = rest[..len].chars().next_back();
                continue;
            }
        }

        out.push(c);
        pos += c.len_utf8();
        prev = Some(c);
    }

    out
}

/// Byte length of the number literal opening `text`.
///
/// Accepts what the lexer reads as a number: `1_000`, `2.`, `.5`, `1e5`,
/// `3.2E-4`.
fn number_len(text: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    let digits_from =
        |i: usize| i + bytes[i..].iter().take_while(|b| b.is_ascii_digit() || **b == b'_').count();

    let mut end = digits_from(0);
    if bytes.get(end) == Some(&b'.') {
        let after = bytes.get(end + 1).copied();
        let fraction = after.is_some_and(|b| b.is_ascii_digit());
        let trailing_dot = end > 0 && !after.is_some_and(|b| b.is_ascii_alphabetic() || b == b'_' || b >= 0x80);
        if fraction || trailing_dot {
            end = digits_from(end + 1);
        }
    }
    if end == 0 {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut i = end + 1;
        if matches!(bytes.get(i), Some(b'+' | b'-')) {
            i += 1;
        }
        if bytes.get(i).is_some_and(u8::is_ascii_digit) {
            end = digits_from(i);
        }
    }
    Some(end)
}

/// Byte length of the string literal opening `text`, quotes included
fn literal_len(text: &str, quote: char) -> Option<usize> {
    let mut escaped = false;
    for (i, c) in text.char_indices().skip(1) {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == quote {
            return Some(i + c.len_utf8());
        }
    }
    None
}
