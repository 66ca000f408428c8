//! Source lines and indentation blocks
//!
//! The statement grammar works one physical line at a time. Block structure
//! is recovered from leading whitespace: a block is every line after its
//! header that is either blank or indented deeper than the header.

use crate::errors::SourceSpan;
use crate::text::StringMask;

/// One physical line of the source
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SourceLine<'src> {
    /// 1-based line number
    pub number: usize,
    /// Byte offset of the first character of the line
    pub offset: usize,
    /// The line as written, without its terminator
    pub raw: &'src str,
}

impl<'src> SourceLine<'src> {
    /// Number of leading whitespace characters
    pub fn indent(&self) -> usize {
        self.raw.chars().take_while(|c| c.is_whitespace()).count()
    }

    /// The statement text: leading whitespace, a trailing `#` comment and
    /// trailing whitespace removed.
    pub fn content(&self) -> &'src str {
        let text = self.raw.trim_start();
        let text = match comment_start(text) {
            Some(i) => &text[..i],
            None => text,
        };
        text.trim_end()
    }

    /// Byte offset of `content()` within the whole source
    pub fn content_offset(&self) -> usize {
        self.offset + (self.raw.len() - self.raw.trim_start().len())
    }

    /// Span covering `content()`
    pub fn span(&self) -> SourceSpan {
        let start = self.content_offset();
        SourceSpan::new(start, start + self.content().len())
    }

    /// Blank and comment-only lines carry no statement
    pub fn is_blank(&self) -> bool {
        self.content().is_empty()
    }
}

/// Split source text into lines, recording each line's byte offset.
/// Both `\n` and `\r\n` terminators are accepted.
pub fn split_lines(source: &str) -> Vec<SourceLine<'_>> {
    let mut lines = Vec::new();
    let mut offset = 0;

    for (i, piece) in source.split('\n').enumerate() {
        let raw = piece.strip_suffix('\r').unwrap_or(piece);
        lines.push(SourceLine {
            number: i + 1,
            offset,
            raw,
        });
        offset += piece.len() + 1;
    }

    lines
}

/// Find the `#` that starts a comment, ignoring any inside string literals
fn comment_start(text: &str) -> Option<usize> {
    if !text.contains('#') {
        return None;
    }
    let mask = StringMask::new(text);
    text.match_indices('#')
        .map(|(i, _)| i)
        .find(|&i| !mask.is_inside(i))
}

/// Collect the block that follows a header line.
///
/// Starting at `start`, consumes lines until the first non-blank line whose
/// indentation is at most `header_indent`. Blank lines inside the block are
/// kept. Returns the exclusive end index; that line is left for the caller.
pub fn collect_block(lines: &[SourceLine<'_>], start: usize, header_indent: usize) -> usize {
    let mut end = start;
    while end < lines.len() {
        let line = &lines[end];
        if !line.is_blank() && line.indent() <= header_indent {
            break;
        }
        end += 1;
    }
    end
}

/// Index of the next non-blank line at or after `start`
pub fn next_non_blank(lines: &[SourceLine<'_>], start: usize) -> Option<usize> {
    (start..lines.len()).find(|&i| !lines[i].is_blank())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_lines_offsets() {
        let lines = split_lines("a = 1\r\n  b = 2\nc");
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].raw, "a = 1");
        assert_eq!(lines[1].offset, 7);
        assert_eq!(lines[1].content(), "b = 2");
        assert_eq!(lines[1].content_offset(), 9);
        assert_eq!(lines[2].number, 3);
    }

    #[test]
    fn test_content_strips_comments_outside_strings() {
        let lines = split_lines("x = 1  # set x\nprint(\"#1\") # done\n# only a comment");
        assert_eq!(lines[0].content(), "x = 1");
        assert_eq!(lines[1].content(), "print(\"#1\")");
        assert!(lines[2].is_blank());
    }

    #[test]
    fn test_indent_counts_characters() {
        let lines = split_lines("\tx\n    y\nz");
        assert_eq!(lines[0].indent(), 1);
        assert_eq!(lines[1].indent(), 4);
        assert_eq!(lines[2].indent(), 0);
    }

    #[test]
    fn test_block_ends_at_dedent() {
        let source = "if x:\n    a = 1\n\n    b = 2\nc = 3";
        let lines = split_lines(source);
        let end = collect_block(&lines, 1, 0);
        assert_eq!(end, 4);
        assert_eq!(lines[end].content(), "c = 3");
    }

    #[test]
    fn test_block_keeps_blank_lines() {
        let source = "while x:\n    a = 1\n\n\n    b = 2\n";
        let lines = split_lines(source);
        let end = collect_block(&lines, 1, 0);
        assert_eq!(end, lines.len());
        assert!(lines[1..end].iter().any(|l| l.content() == "b = 2"));
    }

    #[test]
    fn test_block_ends_at_same_indent() {
        let source = "    if x:\n        a = 1\n    b = 2";
        let lines = split_lines(source);
        assert_eq!(collect_block(&lines, 1, 4), 2);
    }

    #[test]
    fn test_empty_block() {
        let lines = split_lines("if x:\ny = 1");
        assert_eq!(collect_block(&lines, 1, 0), 1);
        assert_eq!(next_non_blank(&lines, 1), Some(1));
    }
}
