//! Leaf parsers that look at characters directly.

use std::{fmt, marker::PhantomData};

use crate::{
    error::ParseError,
    parser::{ParseResult, Parsed, Parser},
    position::{bound_length, char_prefix_len},
    source::Source,
};

/// Splits off the first character of `input`, failing at end of input.
fn next_char<'a>(
    source: &Source<'a>,
    input: &'a str,
    expected: impl FnOnce() -> String,
) -> Result<(char, &'a str), ParseError> {
    let mut chars = input.chars();
    match chars.next() {
        Some(c) => Ok((c, chars.as_str())),
        None => Err(ParseError::end_of_input(source, expected())),
    }
}

// ============================================================================
// CHARACTERS
// ============================================================================

/// Exactly the character `c`.
pub fn char_(c: char) -> CharParser {
    CharParser { expected: c }
}

#[derive(Debug, Clone, Copy)]
pub struct CharParser {
    expected: char,
}

impl Parser for CharParser {
    type Output = char;

    fn expected_description(&self) -> String {
        format!("'{}'", self.expected)
    }

    fn eat<'a>(&self, source: &Source<'a>, input: &'a str) -> ParseResult<'a, char> {
        let (c, rest) = next_char(source, input, || self.expected_description())?;
        if c == self.expected {
            Ok(Parsed::new(c, rest))
        } else {
            Err(ParseError::unexpected_token(
                source,
                input,
                self.expected_description(),
                Some(c.to_string()),
            ))
        }
    }
}

/// Any one character from `chars`.
pub fn any_of(chars: impl Into<String>) -> AnyOf {
    AnyOf {
        chars: chars.into(),
    }
}

#[derive(Debug, Clone)]
pub struct AnyOf {
    chars: String,
}

impl Parser for AnyOf {
    type Output = char;

    fn expected_description(&self) -> String {
        format!("[{}]", self.chars)
    }

    fn eat<'a>(&self, source: &Source<'a>, input: &'a str) -> ParseResult<'a, char> {
        let (c, rest) = next_char(source, input, || self.expected_description())?;
        if self.chars.contains(c) {
            Ok(Parsed::new(c, rest))
        } else {
            Err(ParseError::unexpected_token(
                source,
                input,
                self.expected_description(),
                Some(c.to_string()),
            ))
        }
    }
}

/// Any one character not in `chars`.
pub fn except(chars: impl Into<String>) -> Except {
    Except {
        chars: chars.into(),
    }
}

#[derive(Debug, Clone)]
pub struct Except {
    chars: String,
}

impl Parser for Except {
    type Output = char;

    fn expected_description(&self) -> String {
        format!("[^{}]", self.chars)
    }

    fn eat<'a>(&self, source: &Source<'a>, input: &'a str) -> ParseResult<'a, char> {
        let (c, rest) = next_char(source, input, || self.expected_description())?;
        if self.chars.contains(c) {
            Err(ParseError::unexpected_token(
                source,
                input,
                self.expected_description(),
                Some(c.to_string()),
            ))
        } else {
            Ok(Parsed::new(c, rest))
        }
    }
}

pub fn any_char() -> AnyChar {
    AnyChar
}

#[derive(Debug, Clone, Copy)]
pub struct AnyChar;

impl Parser for AnyChar {
    type Output = char;

    fn expected_description(&self) -> String {
        "any char".to_string()
    }

    fn eat<'a>(&self, source: &Source<'a>, input: &'a str) -> ParseResult<'a, char> {
        let (c, rest) = next_char(source, input, || self.expected_description())?;
        Ok(Parsed::new(c, rest))
    }
}

// ============================================================================
// STRINGS
// ============================================================================

/// Exactly the text `expected`.
///
/// The empty string always matches; a single character behaves like
/// [`char_`] but yields a `String`.
pub fn string(expected: impl Into<String>) -> StringParser {
    let expected = expected.into();
    StringParser {
        length: expected.chars().count(),
        expected,
    }
}

#[derive(Debug, Clone)]
pub struct StringParser {
    expected: String,
    length: usize,
}

impl Parser for StringParser {
    type Output = String;

    fn expected_description(&self) -> String {
        match self.length {
            0 => EMPTY_DESCRIPTION.to_string(),
            1 => format!("'{}'", self.expected),
            _ => format!("\"{}\"", self.expected),
        }
    }

    fn eat<'a>(&self, source: &Source<'a>, input: &'a str) -> ParseResult<'a, String> {
        if let Some(rest) = input.strip_prefix(self.expected.as_str()) {
            return Ok(Parsed::new(self.expected.clone(), rest));
        }
        let available = char_prefix_len(input, self.length);
        if input[..available].chars().count() < self.length {
            return Err(ParseError::end_of_input(source, self.expected_description()));
        }
        let got = bound_length(&input[..available], source.config().preview_length);
        Err(ParseError::unexpected_token(
            source,
            input,
            self.expected_description(),
            Some(got),
        ))
    }
}

// ============================================================================
// EMPTY
// ============================================================================

const EMPTY_DESCRIPTION: &str = "empty string";

/// Matches nothing and yields `None`.
pub fn empty<T>() -> Empty<T> {
    Empty {
        _marker: PhantomData,
    }
}

pub struct Empty<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for Empty<T> {
    fn clone(&self) -> Self {
        empty()
    }
}

impl<T> fmt::Debug for Empty<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Empty")
    }
}

impl<T> Parser for Empty<T> {
    type Output = Option<T>;

    fn expected_description(&self) -> String {
        EMPTY_DESCRIPTION.to_string()
    }

    fn eat<'a>(&self, _source: &Source<'a>, input: &'a str) -> ParseResult<'a, Option<T>> {
        Ok(Parsed::new(None, input))
    }
}

/// Matches nothing and yields `""`.
pub fn empty_string() -> StringParser {
    string("")
}

// ============================================================================
// CLOSURES
// ============================================================================

/// A parser backed by a closure, for matching logic no combinator expresses.
pub fn from_fn<T, F>(description: impl Into<String>, eat: F) -> FnParser<T, F>
where
    F: for<'a> Fn(&Source<'a>, &'a str) -> ParseResult<'a, T>,
{
    FnParser {
        description: description.into(),
        eat,
        _marker: PhantomData,
    }
}

pub struct FnParser<T, F> {
    description: String,
    eat: F,
    _marker: PhantomData<fn() -> T>,
}

impl<T, F: Clone> Clone for FnParser<T, F> {
    fn clone(&self) -> Self {
        Self {
            description: self.description.clone(),
            eat: self.eat.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T, F> fmt::Debug for FnParser<T, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnParser")
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

impl<T, F> Parser for FnParser<T, F>
where
    F: for<'a> Fn(&Source<'a>, &'a str) -> ParseResult<'a, T>,
{
    type Output = T;

    fn expected_description(&self) -> String {
        self.description.clone()
    }

    fn eat<'a>(&self, source: &Source<'a>, input: &'a str) -> ParseResult<'a, T> {
        (self.eat)(source, input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eat<'a, P: Parser>(parser: &P, text: &'a str) -> ParseResult<'a, P::Output> {
        parser.eat(&Source::new(text), text)
    }

    #[test]
    fn char_consumes_one() {
        let parsed = eat(&char_('a'), "abc").unwrap();
        assert_eq!(parsed, Parsed::new('a', "bc"));
    }

    #[test]
    fn char_reports_offending_character() {
        let error = eat(&char_('a'), "bc").unwrap_err();
        assert_eq!(error.expected(), Some("'a'"));
        assert_eq!(error.got(), Some("b"));
        assert_eq!(error.position().column_number, 1);
    }

    #[test]
    fn char_at_end_of_input() {
        let error = eat(&char_('a'), "").unwrap_err();
        assert!(error.is_end_of_input());
        assert_eq!(error.to_string(), "Expected 'a', but got <EOF>");
    }

    #[test]
    fn string_matches_prefix() {
        assert_eq!(eat(&string("foo"), "foobar").unwrap(), Parsed::new("foo".to_string(), "bar"));
    }

    #[test]
    fn string_mismatch_reports_same_length() {
        let error = eat(&string("foo"), "bazaar").unwrap_err();
        assert_eq!(error.got(), Some("baz"));
        assert_eq!(error.expected(), Some("\"foo\""));
    }

    #[test]
    fn short_input_is_end_of_input() {
        assert!(eat(&string("foo"), "fo").unwrap_err().is_end_of_input());
    }

    #[test]
    fn degenerate_strings() {
        assert_eq!(string("").expected_description(), "empty string");
        assert_eq!(eat(&string(""), "x").unwrap(), Parsed::new(String::new(), "x"));
        assert_eq!(string("a").expected_description(), "'a'");
        assert_eq!(eat(&string("a"), "b").unwrap_err().got(), Some("b"));
    }

    #[test]
    fn classes() {
        assert_eq!(eat(&any_of("abc"), "bx").unwrap().value, 'b');
        assert_eq!(any_of("abc").expected_description(), "[abc]");
        assert_eq!(eat(&except("abc"), "x").unwrap().value, 'x');
        assert_eq!(eat(&except("abc"), "a").unwrap_err().got(), Some("a"));
        assert_eq!(except("abc").expected_description(), "[^abc]");
    }

    #[test]
    fn any_char_fails_only_at_end() {
        assert_eq!(eat(&any_char(), "é!").unwrap(), Parsed::new('é', "!"));
        assert!(eat(&any_char(), "").unwrap_err().is_end_of_input());
    }

    #[test]
    fn empty_consumes_nothing() {
        assert_eq!(eat(&empty::<char>(), "x").unwrap(), Parsed::new(None, "x"));
    }

    #[test]
    fn closure_parser() {
        let upper = from_fn("uppercase letter", |source, input| {
            match input.chars().next() {
                Some(c) if c.is_uppercase() => Ok(Parsed::new(c, &input[c.len_utf8()..])),
                _ => Err(ParseError::unexpected_token(source, input, "uppercase letter", None)),
            }
        });
        assert_eq!(eat(&upper, "Ab").unwrap().value, 'A');
        assert_eq!(upper.parse("a").unwrap_err().expected(), Some("uppercase letter"));
    }
}
