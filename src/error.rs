//! Failure types for parsing.
//!
//! [`ParseError`] is the internal, recoverable failure passed between parsers.
//! [`SyntaxError`] is what an entry point hands back to callers: the failure
//! together with the source it happened in, rendered in the
//! `name:line: description` format and usable as a `miette` diagnostic.
//! [`Error`] adds I/O for file-based entry points.

use std::{fmt, io, path::PathBuf, sync::Arc};

use miette::{Diagnostic, LabeledSpan, NamedSource, SourceCode};
use serde::Serialize;
use thiserror::Error;

use crate::{position::Position, source::Source};

/// Provenance of a failure's expected description.
///
/// Descriptions attached by [`with_name`](crate::ParserExt::with_name) are
/// `Named` and survive enclosing names; everything else is `Unnamed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Tag {
    Unnamed,
    Named,
}

impl Tag {
    /// `Named` only when both sides are.
    pub fn and(self, other: Tag) -> Tag {
        match (self, other) {
            (Tag::Named, Tag::Named) => Tag::Named,
            _ => Tag::Unnamed,
        }
    }
}

/// A failed parse step.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    /// Input ran out while something was still expected.
    #[error("{}", describe(.expected.as_deref(), Some("<EOF>")))]
    UnexpectedEndOfInput {
        expected: Option<String>,
        offset: usize,
        position: Position,
        tag: Tag,
    },
    /// The input did not match what was expected.
    #[error("{}", describe(.expected.as_deref(), .got.as_deref().map(quoted).as_deref()))]
    UnexpectedToken {
        expected: Option<String>,
        got: Option<String>,
        offset: usize,
        position: Position,
        tag: Tag,
    },
    /// Lazy references nested deeper than the configured limit.
    #[error("Grammar recursion too deep: more than {limit} nested rule references")]
    RecursionLimit {
        limit: usize,
        offset: usize,
        position: Position,
    },
}

fn quoted(got: &str) -> String {
    format!("'{got}'")
}

fn describe(expected: Option<&str>, got: Option<&str>) -> String {
    match (expected, got) {
        (Some(expected), Some(got)) => format!("Expected {expected}, but got {got}"),
        (Some(expected), None) => format!("Expected {expected}"),
        (None, Some(got)) => format!("Unexpected {got}"),
        (None, None) => "Unexpected input".to_string(),
    }
}

impl ParseError {
    // =====================
    // Construction
    // =====================

    /// Input is exhausted; points one past the end of the last line.
    pub fn end_of_input(source: &Source<'_>, expected: impl Into<String>) -> Self {
        let offset = source.text().len();
        ParseError::UnexpectedEndOfInput {
            expected: Some(expected.into()),
            offset,
            position: source.position_at(offset).end_of_line(),
            tag: Tag::Unnamed,
        }
    }

    /// Mismatch at the start of `remainder`.
    pub fn unexpected_token(
        source: &Source<'_>,
        remainder: &str,
        expected: impl Into<String>,
        got: Option<String>,
    ) -> Self {
        let offset = source.offset_of(remainder);
        ParseError::UnexpectedToken {
            expected: Some(expected.into()),
            got,
            offset,
            position: source.position_at(offset),
            tag: Tag::Unnamed,
        }
    }

    pub fn recursion_limit(source: &Source<'_>, remainder: &str) -> Self {
        let offset = source.offset_of(remainder);
        ParseError::RecursionLimit {
            limit: source.config().max_depth,
            offset,
            position: source.position_at(offset),
        }
    }

    // =====================
    // Accessors
    // =====================

    pub fn expected(&self) -> Option<&str> {
        match self {
            ParseError::UnexpectedEndOfInput { expected, .. }
            | ParseError::UnexpectedToken { expected, .. } => expected.as_deref(),
            ParseError::RecursionLimit { .. } => None,
        }
    }

    pub fn got(&self) -> Option<&str> {
        match self {
            ParseError::UnexpectedToken { got, .. } => got.as_deref(),
            _ => None,
        }
    }

    pub fn offset(&self) -> usize {
        match self {
            ParseError::UnexpectedEndOfInput { offset, .. }
            | ParseError::UnexpectedToken { offset, .. }
            | ParseError::RecursionLimit { offset, .. } => *offset,
        }
    }

    pub fn position(&self) -> &Position {
        match self {
            ParseError::UnexpectedEndOfInput { position, .. }
            | ParseError::UnexpectedToken { position, .. }
            | ParseError::RecursionLimit { position, .. } => position,
        }
    }

    pub fn tag(&self) -> Tag {
        match self {
            ParseError::UnexpectedEndOfInput { tag, .. }
            | ParseError::UnexpectedToken { tag, .. } => *tag,
            ParseError::RecursionLimit { .. } => Tag::Unnamed,
        }
    }

    pub fn is_named(&self) -> bool {
        self.tag() == Tag::Named
    }

    pub fn is_end_of_input(&self) -> bool {
        matches!(self, ParseError::UnexpectedEndOfInput { .. })
    }

    /// Whether an enclosing alternative may try something else instead.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, ParseError::RecursionLimit { .. })
    }

    // =====================
    // Rewriting
    // =====================

    /// Replaces the expected description with `name` unless an inner name
    /// already claimed this failure.
    pub fn named(self, name: &str) -> Self {
        match self {
            ParseError::UnexpectedEndOfInput {
                offset,
                position,
                tag: Tag::Unnamed,
                ..
            } => ParseError::UnexpectedEndOfInput {
                expected: Some(name.to_string()),
                offset,
                position,
                tag: Tag::Named,
            },
            ParseError::UnexpectedToken {
                got,
                offset,
                position,
                tag: Tag::Unnamed,
                ..
            } => ParseError::UnexpectedToken {
                expected: Some(name.to_string()),
                got,
                offset,
                position,
                tag: Tag::Named,
            },
            other => other,
        }
    }

    /// Fills in a missing expected description.
    pub fn or_expected(self, fallback: impl FnOnce() -> String) -> Self {
        match self {
            ParseError::UnexpectedEndOfInput {
                expected: None,
                offset,
                position,
                tag,
            } => ParseError::UnexpectedEndOfInput {
                expected: Some(fallback()),
                offset,
                position,
                tag,
            },
            ParseError::UnexpectedToken {
                expected: None,
                got,
                offset,
                position,
                tag,
            } => ParseError::UnexpectedToken {
                expected: Some(fallback()),
                got,
                offset,
                position,
                tag,
            },
            other => other,
        }
    }

    /// Combines the failures of two ordered alternatives into one.
    ///
    /// Position and offset come from `left`. The description joins both
    /// expectations with `or` unless they are identical. The result is named
    /// only if both sides were, and it is an end-of-input failure exactly when
    /// `right` was.
    pub fn merge(
        left: ParseError,
        right: ParseError,
        left_description: impl FnOnce() -> String,
        right_description: impl FnOnce() -> String,
    ) -> ParseError {
        let left_expected = left
            .expected()
            .map(str::to_string)
            .unwrap_or_else(left_description);
        let right_expected = right
            .expected()
            .map(str::to_string)
            .unwrap_or_else(right_description);
        let expected = if left_expected == right_expected {
            left_expected
        } else {
            format!("{left_expected} or {right_expected}")
        };
        let tag = left.tag().and(right.tag());
        let offset = left.offset();

        if right.is_end_of_input() {
            ParseError::UnexpectedEndOfInput {
                expected: Some(expected),
                offset,
                position: left.position().clone().end_of_line(),
                tag,
            }
        } else {
            ParseError::UnexpectedToken {
                expected: Some(expected),
                got: left.got().map(str::to_string),
                offset,
                position: left.position().clone(),
                tag,
            }
        }
    }
}

// ============================================================================
// SYNTAX ERROR - user-facing diagnostic
// ============================================================================

/// A parse failure attached to the source it occurred in.
#[derive(Debug, Clone)]
pub struct SyntaxError {
    error: ParseError,
    source: Arc<NamedSource<String>>,
    name: String,
}

impl SyntaxError {
    pub fn new(error: ParseError, source: &Source<'_>) -> Self {
        Self {
            error,
            source: source.to_named_source(),
            name: source.name().to_string(),
        }
    }

    pub fn error(&self) -> &ParseError {
        &self.error
    }

    pub fn into_parse_error(self) -> ParseError {
        self.error
    }

    pub fn source_name(&self) -> &str {
        &self.name
    }

    pub fn position(&self) -> &Position {
        self.error.position()
    }

    pub fn expected(&self) -> Option<&str> {
        self.error.expected()
    }

    pub fn got(&self) -> Option<&str> {
        self.error.got()
    }

    pub fn offset(&self) -> usize {
        self.error.offset()
    }
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let position = self.error.position();
        write!(
            f,
            "{}:{}: {}\n{}",
            self.name, position.line_number, self.error, position
        )
    }
}

impl std::error::Error for SyntaxError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

impl Diagnostic for SyntaxError {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match self.error {
            ParseError::UnexpectedEndOfInput { .. } => "grakmat::unexpected_eof",
            ParseError::UnexpectedToken { .. } => "grakmat::unexpected_token",
            ParseError::RecursionLimit { .. } => "grakmat::recursion_limit",
        };
        Some(Box::new(code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self.error {
            ParseError::RecursionLimit { .. } => Some(Box::new(
                "the grammar may be left-recursive, or the input is nested too deeply",
            )),
            _ => None,
        }
    }

    fn source_code(&self) -> Option<&dyn SourceCode> {
        Some(self.source.as_ref() as &dyn SourceCode)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let text = self.source.inner();
        let start = self.error.offset().min(text.len());
        let len = text[start..].chars().next().map_or(0, char::len_utf8);
        let label = LabeledSpan::new(Some(self.error.to_string()), start, len);
        Some(Box::new(std::iter::once(label)))
    }
}

// ============================================================================
// TOP-LEVEL ERROR
// ============================================================================

/// Failures of entry points that read their input themselves.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Failed to read '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Invalid configuration in '{}': {source}", .path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
}

impl Diagnostic for Error {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Error::Io { .. } => Some(Box::new("grakmat::io")),
            Error::Config { .. } => Some(Box::new("grakmat::config")),
            Error::Syntax(e) => e.code(),
        }
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Error::Io { .. } => None,
            Error::Config { .. } => Some(Box::new(
                "known settings are `preview_length` and `max_depth`",
            )),
            Error::Syntax(e) => e.help(),
        }
    }

    fn source_code(&self) -> Option<&dyn SourceCode> {
        match self {
            Error::Io { .. } | Error::Config { .. } => None,
            Error::Syntax(e) => e.source_code(),
        }
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        match self {
            Error::Io { .. } | Error::Config { .. } => None,
            Error::Syntax(e) => e.labels(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_and_requires_both_named() {
        assert_eq!(Tag::Named.and(Tag::Named), Tag::Named);
        assert_eq!(Tag::Named.and(Tag::Unnamed), Tag::Unnamed);
        assert_eq!(Tag::Unnamed.and(Tag::Named), Tag::Unnamed);
    }

    #[test]
    fn end_of_input_message() {
        let source = Source::new("ab");
        let error = ParseError::end_of_input(&source, "'c'");
        assert_eq!(error.to_string(), "Expected 'c', but got <EOF>");
        assert_eq!(error.position().column_number, 3);
    }

    #[test]
    fn token_message_quotes_got() {
        let source = Source::new("bc");
        let error = ParseError::unexpected_token(&source, "bc", "'a'", Some("b".into()));
        assert_eq!(error.to_string(), "Expected 'a', but got 'b'");

        let error = ParseError::unexpected_token(&source, "bc", "'a'", None);
        assert_eq!(error.to_string(), "Expected 'a'");
    }

    #[test]
    fn naming_keeps_inner_name() {
        let source = Source::new("x");
        let error = ParseError::unexpected_token(&source, "x", "'a'", Some("x".into()))
            .named("inner")
            .named("outer");
        assert_eq!(error.expected(), Some("inner"));
        assert!(error.is_named());
        assert_eq!(error.got(), Some("x"));
    }

    #[test]
    fn merge_prefers_left_position() {
        let source = Source::new("a\nbz");
        let left = ParseError::unexpected_token(&source, "bz", "'c'", Some("b".into()));
        let right = ParseError::unexpected_token(&source, "z", "'d'", Some("z".into()));
        let merged = ParseError::merge(left, right, String::new, String::new);
        assert_eq!(merged.expected(), Some("'c' or 'd'"));
        assert_eq!(merged.got(), Some("b"));
        assert_eq!(merged.position(), &Position::new(2, 1, "bz"));
        assert_eq!(merged.tag(), Tag::Unnamed);
    }

    #[test]
    fn merge_collapses_identical_expectations() {
        let source = Source::new("x");
        let left = ParseError::unexpected_token(&source, "x", "NUMBER", None).named("NUMBER");
        let right = ParseError::unexpected_token(&source, "x", "NUMBER", None).named("NUMBER");
        let merged = ParseError::merge(left, right, String::new, String::new);
        assert_eq!(merged.expected(), Some("NUMBER"));
        assert!(merged.is_named());
    }

    #[test]
    fn merge_takes_kind_from_right() {
        let source = Source::new("ab");
        let left = ParseError::unexpected_token(&source, "b", "'x'", Some("b".into()));
        let right = ParseError::end_of_input(&source, "'y'");
        let merged = ParseError::merge(left, right, String::new, String::new);
        assert!(merged.is_end_of_input());
        assert_eq!(merged.position().column_number, 3);

        let left = ParseError::end_of_input(&source, "'x'");
        let right = ParseError::unexpected_token(&source, "b", "'y'", Some("b".into()));
        let merged = ParseError::merge(left, right, String::new, String::new);
        assert!(!merged.is_end_of_input());
        assert_eq!(merged.got(), None);
    }

    #[test]
    fn merge_falls_back_to_descriptions() {
        let source = Source::new("x");
        let left = ParseError::unexpected_token(&source, "x", "'a'", None);
        let right = ParseError::UnexpectedToken {
            expected: None,
            got: None,
            offset: 0,
            position: source.position_at(0),
            tag: Tag::Unnamed,
        };
        let merged = ParseError::merge(left, right, || unreachable!(), || "digit".to_string());
        assert_eq!(merged.expected(), Some("'a' or digit"));
    }

    #[test]
    fn syntax_error_format() {
        let source = Source::named("ab\ncd", "test.txt");
        let error = ParseError::unexpected_token(&source, "d", "'x'", Some("d".into()));
        let syntax = SyntaxError::new(error, &source);
        assert_eq!(
            syntax.to_string(),
            "test.txt:2: Expected 'x', but got 'd'\n2: cd\n    ^"
        );
    }
}
