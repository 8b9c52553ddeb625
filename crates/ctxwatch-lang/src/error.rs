//! Error types for parsing and compilation.

use crate::span::{offset_to_line_col, Span};
use thiserror::Error;

/// Error during lexing or parsing.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct ParseError {
    /// The error message.
    pub message: String,
    /// Source span where the error occurred.
    pub span: Span,
    /// Optional hint for fixing the error.
    pub hint: Option<String>,
}

impl ParseError {
    /// Create a new parse error.
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
            hint: None,
        }
    }

    /// Add a hint to the error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    /// Format the error with the offending source line and a caret.
    pub fn format_with_source(&self, source: &str) -> String {
        render(&self.message, self.span, self.hint.as_deref(), source)
    }
}

/// Error while lowering a parsed condition to a filter expression.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct CompileError {
    /// The error message.
    pub message: String,
    /// Source span where the error occurred.
    pub span: Span,
    /// Error kind for programmatic handling.
    pub kind: CompileErrorKind,
}

/// Kinds of compilation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompileErrorKind {
    /// A literal cannot be used with the operator (e.g. `age < null`).
    InvalidLiteral,
    /// A LIKE pattern is malformed (e.g. ends in a lone escape).
    InvalidPattern,
}

impl CompileError {
    /// Create a new compile error.
    pub fn new(message: impl Into<String>, span: Span, kind: CompileErrorKind) -> Self {
        Self {
            message: message.into(),
            span,
            kind,
        }
    }

    /// Format the error with the offending source line and a caret.
    pub fn format_with_source(&self, source: &str) -> String {
        render(&self.message, self.span, None, source)
    }
}

/// Any failure turning predicate text into a filter expression.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LangError {
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("compile error: {0}")]
    Compile(#[from] CompileError),
}

impl LangError {
    /// Source span of the underlying error.
    pub fn span(&self) -> Span {
        match self {
            LangError::Parse(e) => e.span,
            LangError::Compile(e) => e.span,
        }
    }

    /// Format the underlying error against its source.
    pub fn format_with_source(&self, source: &str) -> String {
        match self {
            LangError::Parse(e) => e.format_with_source(source),
            LangError::Compile(e) => e.format_with_source(source),
        }
    }
}

fn render(message: &str, span: Span, hint: Option<&str>, source: &str) -> String {
    let (line, col) = offset_to_line_col(source, span.start);
    let mut result = format!("error: {}\n", message);
    result.push_str(&format!("  --> line {}:{}\n", line, col));

    if let Some(source_line) = source.lines().nth(line - 1) {
        result.push_str(&format!("   |\n{:3}| {}\n   |", line, source_line));
        for _ in 0..col {
            result.push(' ');
        }
        result.push('^');

        let remaining = source_line.len().saturating_sub(col - 1);
        for _ in 1..span.len().min(remaining) {
            result.push('~');
        }
        result.push('\n');
    }

    if let Some(hint) = hint {
        result.push_str(&format!("   = hint: {}\n", hint));
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_points_at_span() {
        let source = "age >> 18";
        let err = ParseError::new("expected literal value, found Gt", Span::new(5, 6))
            .with_hint("use a single comparison operator");
        let formatted = err.format_with_source(source);

        assert!(formatted.contains("line 1:6"));
        assert!(formatted.contains("  1| age >> 18"));
        assert!(formatted.contains("hint: use a single comparison operator"));
    }

    #[test]
    fn test_lang_error_span() {
        let err: LangError =
            CompileError::new("bad", Span::new(2, 4), CompileErrorKind::InvalidLiteral).into();
        assert_eq!(err.span(), Span::new(2, 4));
        assert_eq!(err.to_string(), "compile error: bad");
    }
}
