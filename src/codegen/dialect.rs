//! Dialect policies and keyword tables

use crate::parser::ScalarType;

/// How a dialect frames and declares things
#[derive(Debug, PartialEq, Eq)]
pub struct Dialect {
    pub name: &'static str,
    pub extension: &'static str,
    /// Emit `ΜΕΤΑΒΛΗΤΕΣ` blocks at program and subprogram scope
    pub declarations: bool,
    /// Split subprograms into `ΣΥΝΑΡΤΗΣΗ` and `ΔΙΑΔΙΚΑΣΙΑ`
    pub subprogram_kinds: bool,
}

pub static GLOSSA: Dialect = Dialect {
    name: "Glossa",
    extension: "glo",
    declarations: true,
    subprogram_kinds: true,
};

pub static PSEUDOGLOSSA: Dialect = Dialect {
    name: "Pseudoglossa",
    extension: "ps",
    declarations: false,
    subprogram_kinds: false,
};

/// Word operators and constants, translated when they stand as whole words
pub static WORD_KEYWORDS: &[(&str, &str)] = &[
    ("and", "ΚΑΙ"),
    ("or", "Η"),
    ("not", "ΟΧΙ"),
    ("True", "ΑΛΗΘΗΣ"),
    ("False", "ΨΕΥΔΗΣ"),
];

/// Math functions, translated only when called
pub static MATH_FUNCTIONS: &[(&str, &str)] = &[
    ("math.sqrt", "Τ_Ρ"),
    ("math.sin", "ΗΜ"),
    ("math.cos", "ΣΥΝ"),
    ("math.tan", "ΕΦ"),
    ("math.log", "ΛΟΓ"),
    ("math.exp", "Ε"),
    ("math.fabs", "Α_Τ"),
    ("abs", "Α_Τ"),
    ("math.floor", "Α_Μ"),
    ("math.trunc", "Α_Μ"),
];

pub fn word_keyword(word: &str) -> Option<&'static str> {
    lookup(WORD_KEYWORDS, word)
}

pub fn math_function(name: &str) -> Option<&'static str> {
    lookup(MATH_FUNCTIONS, name)
}

fn lookup(table: &'static [(&'static str, &'static str)], key: &str) -> Option<&'static str> {
    table.iter().find(|(from, _)| *from == key).map(|(_, to)| *to)
}

/// Type keyword heading a declaration line
pub fn type_plural(ty: Option<ScalarType>) -> &'static str {
    match ty {
        Some(ScalarType::Float) => "ΠΡΑΓΜΑΤΙΚΕΣ",
        Some(ScalarType::Str) => "ΧΑΡΑΚΤΗΡΕΣ",
        Some(ScalarType::Bool) => "ΛΟΓΙΚΕΣ",
        Some(ScalarType::Int) | None => "ΑΚΕΡΑΙΕΣ",
    }
}

/// Type keyword after a function header
pub fn type_singular(ty: Option<ScalarType>) -> &'static str {
    match ty {
        Some(ScalarType::Float) => "ΠΡΑΓΜΑΤΙΚΗ",
        Some(ScalarType::Str) => "ΧΑΡΑΚΤΗΡΑΣ",
        Some(ScalarType::Bool) => "ΛΟΓΙΚΗ",
        Some(ScalarType::Int) | None => "ΑΚΕΡΑΙΑ",
    }
}
