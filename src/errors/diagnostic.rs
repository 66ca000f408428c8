//! Pretty error reporting using ariadne
//!
//! Renders a conversion error against the source text it came from.

use ariadne::{Color, Config, IndexType, Label, Report, ReportKind, Source};
use crate::errors::GlossaError;

fn build_report(error: &GlossaError) -> Report<'static, std::ops::Range<usize>> {
    let span_range = error.span().map(|s| s.start..s.end).unwrap_or(0..0);

    // spans are byte offsets; Greek source makes that differ from chars
    let mut report = Report::build(ReportKind::Error, span_range.clone())
        .with_config(Config::default().with_index_type(IndexType::Byte))
        .with_message(error.kind());

    if error.span().is_some() {
        report = report.with_label(
            Label::new(span_range)
                .with_message(error.to_string())
                .with_color(Color::Red),
        );
    }

    report.finish()
}

/// Print an error with source context to stderr
pub fn print_error(source: &str, error: &GlossaError) {
    if let GlossaError::Io(e) = error {
        eprintln!("IO error: {}", e);
        return;
    }

    if build_report(error).eprint(Source::from(source)).is_err() {
        eprintln!("{}", error);
    }
}

/// Format an error as a string (for testing and for callers that show errors themselves)
pub fn format_error(source: &str, error: &GlossaError) -> String {
    if let GlossaError::Io(e) = error {
        return format!("IO error: {}", e);
    }

    let mut output = Vec::new();
    if build_report(error)
        .write(Source::from(source), &mut output)
        .is_err()
    {
        return error.to_string();
    }

    String::from_utf8_lossy(&output).into_owned()
}

/// Get the 1-based line and column for a byte offset
pub fn offset_to_line_col(source: &str, offset: usize) -> (usize, usize) {
    let mut line = 1;
    let mut col = 1;

    for (i, c) in source.char_indices() {
        if i >= offset {
            break;
        }
        if c == '\n' {
            line += 1;
            col = 1;
        } else {
            col += 1;
        }
    }

    (line, col)
}
