//! The `ALG_NAME` directive
//!
//! `ALG_NAME = "name"` names the translated program. It is read separately
//! from the statement grammar, which skips the line.

use super::lines::split_lines;
use crate::errors::{GlossaError, GlossaResult, SourceSpan};
use crate::lexer::{Keyword, Lexer, TokenKind};
use crate::text::is_valid_identifier;

/// Program name used when the source has no directive
pub const DEFAULT_ALGORITHM_NAME: &str = "ΔΟΚΙΜΗ";

/// Whether `name` spells the directive (compared case-insensitively)
pub fn is_directive_name(name: &str) -> bool {
    name.eq_ignore_ascii_case("ALG_NAME")
}

/// Read the program name from the first `ALG_NAME = "..."` line.
///
/// The quoted name is trimmed and must be a valid identifier that is not a
/// keyword.
pub fn get_algorithm_name(source: &str) -> GlossaResult<String> {
    for line in split_lines(source) {
        if line.is_blank() {
            continue;
        }
        let content = line.content();
        let tokens = Lexer::with_offset(content, line.content_offset()).tokenize();

        let is_directive = matches!(tokens.first(), Some(t) if t.ident().is_some_and(is_directive_name))
            && tokens.get(1).is_some_and(|t| t.kind == TokenKind::Eq);
        if !is_directive {
            continue;
        }

        let value_span = match (tokens.get(2), tokens.last()) {
            (Some(first), Some(last)) => first.span.merge(last.span),
            _ => line.span(),
        };

        let raw = match tokens.as_slice() {
            [_, _, value, eof] if eof.kind.is_eof() => match &value.kind {
                TokenKind::String {
                    raw,
                    template: false,
                } => raw.as_str(),
                _ => return Err(not_a_string(value_span)),
            },
            _ => return Err(not_a_string(value_span)),
        };

        return validate_name(&raw[1..raw.len() - 1], value_span);
    }

    Ok(DEFAULT_ALGORITHM_NAME.to_string())
}

fn not_a_string(span: SourceSpan) -> GlossaError {
    GlossaError::algorithm_name("the name must be a quoted string", span)
}

fn validate_name(name: &str, span: SourceSpan) -> GlossaResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(GlossaError::algorithm_name("the name is empty", span));
    }
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        return Err(GlossaError::algorithm_name(
            format!("'{}' cannot start with a digit", name),
            span,
        ));
    }
    if !is_valid_identifier(name) {
        return Err(GlossaError::algorithm_name(
            format!("'{}' contains invalid characters", name),
            span,
        ));
    }
    if Keyword::parse(name).is_some() {
        return Err(GlossaError::algorithm_name(
            format!("'{}' is a keyword", name),
            span,
        ));
    }
    Ok(name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_name() {
        assert_eq!(get_algorithm_name("x = 1\n").unwrap(), "ΔΟΚΙΜΗ");
        assert_eq!(get_algorithm_name("").unwrap(), DEFAULT_ALGORITHM_NAME);
    }

    #[test]
    fn test_reads_first_directive() {
        let source = "# title\nALG_NAME = \"ΕΜΒΑΔΟΝ\"\nALG_NAME = 'other'\n";
        assert_eq!(get_algorithm_name(source).unwrap(), "ΕΜΒΑΔΟΝ");
    }

    #[test]
    fn test_single_quotes_and_trimming() {
        assert_eq!(get_algorithm_name("ALG_NAME = '  Area_2 '").unwrap(), "Area_2");
        assert_eq!(get_algorithm_name("alg_name='x'").unwrap(), "x");
    }

    #[test]
    fn test_invalid_names() {
        for source in [
            "ALG_NAME = \"\"",
            "ALG_NAME = \"2ND\"",
            "ALG_NAME = \"a-b\"",
            "ALG_NAME = \"ΠΡΟΓ ΡΑΜΜΑ\"",
            "ALG_NAME = NAME",
            "ALG_NAME = f\"x\"",
        ] {
            let err = get_algorithm_name(source).unwrap_err();
            assert!(
                matches!(err, GlossaError::InvalidAlgorithmName { .. }),
                "{source}: {err}"
            );
        }
    }

    #[test]
    fn test_keywords_are_not_names() {
        for name in ["and", "or", "not", "True", "False", "None", "while"] {
            let err = get_algorithm_name(&format!("ALG_NAME = \"{name}\"")).unwrap_err();
            assert_eq!(
                err.to_string(),
                format!("Invalid algorithm name: '{name}' is a keyword")
            );
        }
        // only exact spellings are keywords
        assert_eq!(get_algorithm_name("ALG_NAME = \"AND\"").unwrap(), "AND");
    }

    #[test]
    fn test_digit_message() {
        let err = get_algorithm_name("ALG_NAME = \"1abc\"").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid algorithm name: '1abc' cannot start with a digit"
        );
    }
}
