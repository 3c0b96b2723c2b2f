//! Parse error types.

use crate::Span;
use std::fmt;

/// A parse error with location information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// The kind of error.
    pub kind: ParseErrorKind,
    /// The span where the error occurred.
    pub span: Span,
    /// Optional context message.
    pub context: Option<String>,
    /// Optional hint for fixing the error.
    pub hint: Option<String>,
}

impl ParseError {
    /// Create a new parse error.
    #[must_use]
    pub const fn new(kind: ParseErrorKind, span: Span) -> Self {
        Self {
            kind,
            span,
            context: None,
            hint: None,
        }
    }

    /// Add context to this error.
    #[must_use]
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Add a hint for fixing this error.
    #[must_use]
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    /// Get the span of this error.
    #[must_use]
    pub const fn span(&self) -> (usize, usize) {
        (self.span.start, self.span.end)
    }

    /// Get a numeric code for the error kind.
    #[must_use]
    pub const fn kind_code(&self) -> u32 {
        match &self.kind {
            ParseErrorKind::UnexpectedChar => 1,
            ParseErrorKind::UnexpectedEof => 2,
            ParseErrorKind::Expected(_) => 3,
            ParseErrorKind::MissingHeader => 4,
            ParseErrorKind::InvalidString(_) => 5,
            ParseErrorKind::InvalidRecords(_) => 6,
            ParseErrorKind::DuplicateCrate(_) => 7,
            ParseErrorKind::MissingEpilogue => 8,
            ParseErrorKind::TrailingContent => 9,
        }
    }

    /// Get the error message.
    #[must_use]
    pub fn message(&self) -> String {
        format!("{}", self.kind)
    }

    /// Get a short label for the error.
    #[must_use]
    pub const fn label(&self) -> &str {
        match &self.kind {
            ParseErrorKind::UnexpectedChar => "unexpected character",
            ParseErrorKind::UnexpectedEof => "unexpected end of file",
            ParseErrorKind::Expected(_) => "expected different token",
            ParseErrorKind::MissingHeader => "missing listing header",
            ParseErrorKind::InvalidString(_) => "invalid string literal",
            ParseErrorKind::InvalidRecords(_) => "invalid record array",
            ParseErrorKind::DuplicateCrate(_) => "duplicate crate key",
            ParseErrorKind::MissingEpilogue => "missing registration epilogue",
            ParseErrorKind::TrailingContent => "trailing content",
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if let Some(ctx) = &self.context {
            write!(f, " ({ctx})")?;
        }
        Ok(())
    }
}

impl std::error::Error for ParseError {}

/// Kinds of parse errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// A character the lexer could not tokenize.
    UnexpectedChar,
    /// Unexpected end of file.
    UnexpectedEof,
    /// Expected a specific token.
    Expected(String),
    /// The `(function() {var implementors = {};` header is missing.
    MissingHeader,
    /// Invalid string literal (bad escape sequence).
    InvalidString(String),
    /// The record array is not valid JSON of the expected shape.
    InvalidRecords(String),
    /// The same crate key is assigned more than once.
    DuplicateCrate(String),
    /// The register-or-queue epilogue is missing or malformed.
    MissingEpilogue,
    /// Content after the closing of the IIFE.
    TrailingContent,
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedChar => write!(f, "syntax error: unexpected character"),
            Self::UnexpectedEof => write!(f, "unexpected end of file"),
            Self::Expected(what) => write!(f, "expected {what}"),
            Self::MissingHeader => write!(f, "missing listing header"),
            Self::InvalidString(msg) => write!(f, "invalid string literal: {msg}"),
            Self::InvalidRecords(msg) => write!(f, "invalid record array: {msg}"),
            Self::DuplicateCrate(name) => {
                write!(f, "crate '{name}' is registered more than once")
            }
            Self::MissingEpilogue => write!(f, "missing registration epilogue"),
            Self::TrailingContent => write!(f, "unexpected content after listing"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_new() {
        let err = ParseError::new(ParseErrorKind::UnexpectedEof, Span::new(0, 5));
        assert_eq!(err.span(), (0, 5));
        assert!(err.context.is_none());
        assert!(err.hint.is_none());
    }

    #[test]
    fn parse_error_with_context() {
        let err = ParseError::new(ParseErrorKind::MissingEpilogue, Span::new(0, 5))
            .with_context("in listing tail");
        let display = format!("{err}");
        assert!(display.contains("missing registration epilogue"));
        assert!(display.contains("in listing tail"));
    }

    #[test]
    fn kind_codes_are_unique() {
        let kinds = [
            ParseErrorKind::UnexpectedChar,
            ParseErrorKind::UnexpectedEof,
            ParseErrorKind::Expected("x".to_string()),
            ParseErrorKind::MissingHeader,
            ParseErrorKind::InvalidString("bad".to_string()),
            ParseErrorKind::InvalidRecords("bad".to_string()),
            ParseErrorKind::DuplicateCrate("a".to_string()),
            ParseErrorKind::MissingEpilogue,
            ParseErrorKind::TrailingContent,
        ];
        let mut codes: Vec<u32> = kinds
            .into_iter()
            .map(|kind| ParseError::new(kind, Span::new(0, 1)).kind_code())
            .collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), 9);
    }

    #[test]
    fn labels_are_nonempty() {
        let kinds = [
            ParseErrorKind::UnexpectedChar,
            ParseErrorKind::UnexpectedEof,
            ParseErrorKind::Expected("x".to_string()),
            ParseErrorKind::MissingHeader,
            ParseErrorKind::InvalidString("bad".to_string()),
            ParseErrorKind::InvalidRecords("bad".to_string()),
            ParseErrorKind::DuplicateCrate("a".to_string()),
            ParseErrorKind::MissingEpilogue,
            ParseErrorKind::TrailingContent,
        ];
        for kind in kinds {
            assert!(!ParseError::new(kind, Span::new(0, 1)).label().is_empty());
        }
    }
}
