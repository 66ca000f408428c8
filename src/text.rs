//! String-literal aware text scanning
//!
//! Expressions are carried through the pipeline as source text. Renaming and
//! keyword translation both rewrite that text, and both must leave the inside
//! of string literals alone and only touch whole words.

/// Marks which byte positions of a text lie inside a string literal.
///
/// Tracks single and double quotes independently (a `'` inside `"..."` does
/// not open anything) and honours backslash escapes within a literal. The
/// opening quote is outside; the content and closing quote are inside.
pub struct StringMask {
    inside: Vec<bool>,
}

impl StringMask {
    pub fn new(text: &str) -> Self {
        let mut inside = vec![false; text.len() + 1];
        let mut quote: Option<char> = None;
        let mut escaped = false;

        for (i, c) in text.char_indices() {
            let flag = quote.is_some();
            for slot in &mut inside[i..i + c.len_utf8()] {
                *slot = flag;
            }

            match quote {
                Some(q) => {
                    if escaped {
                        escaped = false;
                    } else if c == '\\' {
                        escaped = true;
                    } else if c == q {
                        quote = None;
                    }
                }
                None => {
                    if c == '"' || c == '\'' {
                        quote = Some(c);
                    }
                }
            }
        }

        inside[text.len()] = quote.is_some();
        Self { inside }
    }

    /// Whether the byte at `index` is inside a string literal
    pub fn is_inside(&self, index: usize) -> bool {
        self.inside.get(index).copied().unwrap_or(false)
    }
}


/// Characters that make up a word for boundary checks
pub fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Whether `text[start..start + len]` is delimited by non-word characters
pub fn is_word_boundary(text: &str, start: usize, len: usize) -> bool {
    let before = text[..start].chars().next_back();
    let after = text[start + len..].chars().next();
    !before.is_some_and(is_word_char) && !after.is_some_and(is_word_char)
}

/// Replace every whole-word occurrence of `from` outside string literals
pub fn replace_whole_word(text: &str, from: &str, to: &str) -> String {
    if from.is_empty() || !text.contains(from) {
        return text.to_string();
    }

    let mask = StringMask::new(text);
    let mut out = String::with_capacity(text.len());
    let mut i = 0;

    while i < text.len() {
        if !mask.is_inside(i)
            && text[i..].starts_with(from)
            && is_word_boundary(text, i, from.len())
        {
            out.push_str(to);
            i += from.len();
            continue;
        }
        let c = text[i..].chars().next().unwrap_or_default();
        out.push(c);
        i += c.len_utf8().max(1);
    }

    out
}

/// Whether `word` occurs as a whole word outside string literals
pub fn contains_whole_word(text: &str, word: &str) -> bool {
    if word.is_empty() || !text.contains(word) {
        return false;
    }
    let mask = StringMask::new(text);
    text.match_indices(word)
        .any(|(i, _)| !mask.is_inside(i) && is_word_boundary(text, i, word.len()))
}

fn is_latin_or_greek_letter(c: char) -> bool {
    if c.is_ascii_alphabetic() {
        return true;
    }
    if !c.is_alphabetic() {
        return false;
    }
    matches!(c,
        '\u{00C0}'..='\u{024F}'
        | '\u{1E00}'..='\u{1EFF}'
        | '\u{0370}'..='\u{03FF}'
        | '\u{1F00}'..='\u{1FFF}')
}

/// Identifiers are Latin or Greek letters, ASCII digits and `_`, and must not
/// start with a digit.
pub fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        None => false,
        Some(first) if first.is_ascii_digit() => false,
        Some(_) => name
            .chars()
            .all(|c| c == '_' || c.is_ascii_digit() || is_latin_or_greek_letter(c)),
    }
}
