//! Error handling for pyglossa
//!
//! Every error is fatal to the conversion that raised it and carries the
//! source span of the offending construct, so that diagnostics can point at it.

mod diagnostic;

use std::ops::Range;
use thiserror::Error;

pub use diagnostic::{format_error, offset_to_line_col, print_error};

/// A span in the source code, represented as a byte range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SourceSpan {
    /// Start byte offset (inclusive)
    pub start: usize,
    /// End byte offset (exclusive)
    pub end: usize,
}

impl SourceSpan {
    /// Create a new source span
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Merge two spans into one that covers both
    pub fn merge(self, other: Self) -> Self {
        Self {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Get the length of this span
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Check if the span is empty
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

impl From<Range<usize>> for SourceSpan {
    fn from(range: Range<usize>) -> Self {
        Self::new(range.start, range.end)
    }
}

impl From<SourceSpan> for Range<usize> {
    fn from(span: SourceSpan) -> Self {
        span.start..span.end
    }
}

/// The main error type for pyglossa operations
#[derive(Error, Debug)]
pub enum GlossaError {
    #[error("Invalid algorithm name: {message}")]
    InvalidAlgorithmName { message: String, span: SourceSpan },

    #[error("Unknown type: '{name}'")]
    UnknownType { name: String, span: SourceSpan },

    #[error("Invalid identifier: '{name}'")]
    InvalidIdentifier { name: String, span: SourceSpan },

    #[error("Invalid range() in for loop: expected 1 to 3 arguments, found {found}")]
    InvalidRangeArity { found: usize, span: SourceSpan },

    #[error("Invalid match syntax: {line}")]
    InvalidMatchCaseSyntax { line: String, span: SourceSpan },

    #[error("Syntax error: {message}")]
    Syntax { message: String, span: SourceSpan },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl GlossaError {
    /// Get the source span associated with this error, if any
    pub fn span(&self) -> Option<SourceSpan> {
        match self {
            GlossaError::InvalidAlgorithmName { span, .. }
            | GlossaError::UnknownType { span, .. }
            | GlossaError::InvalidIdentifier { span, .. }
            | GlossaError::InvalidRangeArity { span, .. }
            | GlossaError::InvalidMatchCaseSyntax { span, .. }
            | GlossaError::Syntax { span, .. } => Some(*span),
            GlossaError::Io(_) => None,
        }
    }

    /// Short category label used as the report headline
    pub fn kind(&self) -> &'static str {
        match self {
            GlossaError::InvalidAlgorithmName { .. } => "Invalid algorithm name",
            GlossaError::UnknownType { .. } => "Unknown type",
            GlossaError::InvalidIdentifier { .. } => "Invalid identifier",
            GlossaError::InvalidRangeArity { .. } => "Invalid range",
            GlossaError::InvalidMatchCaseSyntax { .. } => "Invalid match syntax",
            GlossaError::Syntax { .. } => "Syntax error",
            GlossaError::Io(_) => "IO error",
        }
    }

    /// Create a syntax error
    pub fn syntax(message: impl Into<String>, span: SourceSpan) -> Self {
        GlossaError::Syntax {
            message: message.into(),
            span,
        }
    }

    /// Create an algorithm name error
    pub fn algorithm_name(message: impl Into<String>, span: SourceSpan) -> Self {
        GlossaError::InvalidAlgorithmName {
            message: message.into(),
            span,
        }
    }

    pub fn unknown_type(name: impl Into<String>, span: SourceSpan) -> Self {
        GlossaError::UnknownType {
            name: name.into(),
            span,
        }
    }

    pub fn invalid_identifier(name: impl Into<String>, span: SourceSpan) -> Self {
        GlossaError::InvalidIdentifier {
            name: name.into(),
            span,
        }
    }
}

/// Result type alias for pyglossa operations
pub type GlossaResult<T> = Result<T, GlossaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_merge() {
        let a = SourceSpan::new(4, 9);
        let b = SourceSpan::new(1, 6);
        assert_eq!(a.merge(b), SourceSpan::new(1, 9));
        assert_eq!(a.len(), 5);
        assert!(SourceSpan::new(3, 3).is_empty());
    }

    #[test]
    fn test_error_messages() {
        let err = GlossaError::InvalidRangeArity {
            found: 4,
            span: SourceSpan::new(0, 1),
        };
        assert_eq!(
            err.to_string(),
            "Invalid range() in for loop: expected 1 to 3 arguments, found 4"
        );
        assert_eq!(err.span(), Some(SourceSpan::new(0, 1)));

        let err = GlossaError::unknown_type("ΔΕΚΑΔΙΚΕΣ", SourceSpan::default());
        assert_eq!(err.to_string(), "Unknown type: 'ΔΕΚΑΔΙΚΕΣ'");
        assert_eq!(err.kind(), "Unknown type");
    }
}
