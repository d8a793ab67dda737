//! The [`Parser`] trait, its combinator methods, and the full-input entry
//! points.

use std::{fmt, fs, path::Path, sync::Arc};

use tracing::debug;

use crate::{
    combinators::{And, AtLeast, Before, InRange, Map, Named, Optional, Or, Repeat, Then},
    config::ParseConfig,
    error::{Error, ParseError, SyntaxError},
    position::bound_length,
    source::Source,
    spaced::{SpacedAnd, SpacedAtLeast, SpacedInRange, SpacedRepeat},
};

/// Expected description reported when input is left over after a parse.
pub const END_OF_INPUT: &str = "<end of input>";

/// A value together with the input that was not consumed producing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parsed<'a, T> {
    pub value: T,
    pub remainder: &'a str,
}

impl<'a, T> Parsed<'a, T> {
    pub fn new(value: T, remainder: &'a str) -> Self {
        Self { value, remainder }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Parsed<'a, U> {
        Parsed {
            value: f(self.value),
            remainder: self.remainder,
        }
    }
}

pub type ParseResult<'a, T> = Result<Parsed<'a, T>, ParseError>;

/// A recursive-descent parsing step.
///
/// `eat` consumes a prefix of `input`, which is always a suffix of
/// `source.text()`, and returns the produced value with the rest of the input.
/// Implementations hold no mutable state and may be shared between threads.
pub trait Parser {
    type Output;

    /// Human-readable description of what this parser accepts.
    fn expected_description(&self) -> String;

    fn eat<'a>(&self, source: &Source<'a>, input: &'a str) -> ParseResult<'a, Self::Output>;

    /// Parses all of `input`, failing if anything is left over.
    fn parse(&self, input: &str) -> Result<Self::Output, SyntaxError> {
        self.parse_with(input, crate::source::INLINE_SOURCE_NAME, &ParseConfig::default())
    }

    /// Like [`parse`](Parser::parse), naming the input in diagnostics.
    fn parse_named(&self, input: &str, name: &str) -> Result<Self::Output, SyntaxError> {
        self.parse_with(input, name, &ParseConfig::default())
    }

    fn parse_with(
        &self,
        input: &str,
        name: &str,
        config: &ParseConfig,
    ) -> Result<Self::Output, SyntaxError> {
        let source = Source::named(input, name).with_config(config.clone());
        debug!(source = name, len = input.len(), "parse started");
        let result = self
            .eat(&source, input)
            .and_then(|parsed| require_end(&source, parsed))
            .map_err(|e| e.or_expected(|| self.expected_description()));
        match result {
            Ok(value) => {
                debug!(source = name, "parse succeeded");
                Ok(value)
            }
            Err(e) => {
                debug!(source = name, offset = e.offset(), error = %e, "parse failed");
                Err(SyntaxError::new(e, &source))
            }
        }
    }

    /// Reads and parses a file, naming the source after its path.
    fn parse_file(&self, path: &Path) -> Result<Self::Output, Error> {
        self.parse_file_with(path, &ParseConfig::default())
    }

    fn parse_file_with(&self, path: &Path, config: &ParseConfig) -> Result<Self::Output, Error> {
        let text = fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let name = path.display().to_string();
        Ok(self.parse_with(&text, &name, config)?)
    }
}

fn require_end<'a, T>(source: &Source<'a>, parsed: Parsed<'a, T>) -> Result<T, ParseError> {
    if parsed.remainder.is_empty() {
        return Ok(parsed.value);
    }
    let preview = bound_length(parsed.remainder, source.config().preview_length);
    Err(ParseError::unexpected_token(
        source,
        parsed.remainder,
        END_OF_INPUT,
        Some(preview),
    ))
}

impl<P: Parser + ?Sized> Parser for &P {
    type Output = P::Output;

    fn expected_description(&self) -> String {
        (**self).expected_description()
    }

    fn eat<'a>(&self, source: &Source<'a>, input: &'a str) -> ParseResult<'a, Self::Output> {
        (**self).eat(source, input)
    }
}

impl<P: Parser + ?Sized> Parser for Box<P> {
    type Output = P::Output;

    fn expected_description(&self) -> String {
        (**self).expected_description()
    }

    fn eat<'a>(&self, source: &Source<'a>, input: &'a str) -> ParseResult<'a, Self::Output> {
        (**self).eat(source, input)
    }
}

// ============================================================================
// BOXED PARSER
// ============================================================================

/// A type-erased, cheaply clonable parser.
///
/// Grammars store their rules as `BoxedParser`s so that rules of different
/// concrete types can refer to each other.
pub struct BoxedParser<T> {
    inner: Arc<dyn Parser<Output = T> + Send + Sync>,
}

impl<T> BoxedParser<T> {
    pub fn new<P>(parser: P) -> Self
    where
        P: Parser<Output = T> + Send + Sync + 'static,
    {
        Self {
            inner: Arc::new(parser),
        }
    }
}

impl<T> Clone for BoxedParser<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> fmt::Debug for BoxedParser<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoxedParser").finish_non_exhaustive()
    }
}

impl<T> Parser for BoxedParser<T> {
    type Output = T;

    fn expected_description(&self) -> String {
        self.inner.expected_description()
    }

    fn eat<'a>(&self, source: &Source<'a>, input: &'a str) -> ParseResult<'a, T> {
        self.inner.eat(source, input)
    }
}

// ============================================================================
// COMBINATOR METHODS
// ============================================================================

/// Combinator methods available on every [`Parser`].
pub trait ParserExt: Parser + Sized {
    /// Runs `self` then `next`, yielding both values.
    fn and<B: Parser>(self, next: B) -> And<Self, B> {
        And::new(self, next)
    }

    /// Runs `self` then `next`, keeping `next`'s value.
    fn then<B: Parser>(self, next: B) -> Then<And<Self, B>> {
        Then::new(And::new(self, next))
    }

    /// Runs `self` then `next`, keeping `self`'s value.
    fn before<B: Parser>(self, next: B) -> Before<And<Self, B>> {
        Before::new(And::new(self, next))
    }

    /// Ordered choice: tries `other` only if `self` fails.
    fn or<B: Parser<Output = Self::Output>>(self, other: B) -> Or<Self, B> {
        Or::new(self, other)
    }

    fn map<U, F>(self, transform: F) -> Map<Self, F>
    where
        F: Fn(Self::Output) -> U,
    {
        Map::new(self, transform)
    }

    /// Reports failures as "expected `name`" unless an inner name applies.
    fn with_name(self, name: impl Into<String>) -> Named<Self> {
        Named::new(self, name)
    }

    fn optional(self) -> Optional<Self> {
        Optional::new(self)
    }

    fn repeat(self, times: usize) -> Repeat<Self> {
        Repeat::new(self, times)
    }

    fn at_least(self, times: usize) -> AtLeast<Self> {
        AtLeast::new(self, times)
    }

    fn zero_or_more(self) -> AtLeast<Self> {
        AtLeast::new(self, 0)
    }

    fn one_or_more(self) -> AtLeast<Self> {
        AtLeast::new(self, 1)
    }

    /// Between `min` and `max` matches, inclusive.
    ///
    /// # Panics
    ///
    /// If the range is empty.
    fn in_range(self, range: std::ops::RangeInclusive<usize>) -> InRange<Self> {
        InRange::new(self, *range.start(), *range.end())
    }

    /// Like [`and`](ParserExt::and), skipping optional whitespace in between.
    fn spaced_and<B: Parser>(self, next: B) -> SpacedAnd<Self, B> {
        SpacedAnd::new(self, next)
    }

    fn spaced_then<B: Parser>(self, next: B) -> Then<SpacedAnd<Self, B>> {
        Then::new(SpacedAnd::new(self, next))
    }

    fn spaced_before<B: Parser>(self, next: B) -> Before<SpacedAnd<Self, B>> {
        Before::new(SpacedAnd::new(self, next))
    }

    fn spaced_repeat(self, times: usize) -> SpacedRepeat<Self> {
        SpacedRepeat::new(self, times)
    }

    fn spaced_at_least(self, times: usize) -> SpacedAtLeast<Self> {
        SpacedAtLeast::new(self, times)
    }

    fn spaced_zero_or_more(self) -> SpacedAtLeast<Self> {
        SpacedAtLeast::new(self, 0)
    }

    fn spaced_one_or_more(self) -> SpacedAtLeast<Self> {
        SpacedAtLeast::new(self, 1)
    }

    fn spaced_in_range(self, range: std::ops::RangeInclusive<usize>) -> SpacedInRange<Self> {
        SpacedInRange::new(self, *range.start(), *range.end())
    }

    fn boxed(self) -> BoxedParser<Self::Output>
    where
        Self: Send + Sync + 'static,
    {
        BoxedParser::new(self)
    }
}

impl<P: Parser> ParserExt for P {}
