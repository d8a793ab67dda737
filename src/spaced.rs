//! Whitespace-skipping variants of sequencing and repetition.
//!
//! Whitespace here means space, tab, carriage return and line feed. It is
//! always optional and never shows up in produced values.

use crate::{
    combinators::{collect, AtLeast, InRange, Named},
    parser::{ParseResult, Parsed, Parser, ParserExt},
    primitives::{any_of, AnyOf},
    source::Source,
};

const WHITESPACE: [char; 4] = [' ', '\t', '\r', '\n'];

/// Drops leading whitespace from `input`.
pub fn skip_spaces(input: &str) -> &str {
    input.trim_start_matches(WHITESPACE)
}

/// A single whitespace character.
pub fn space() -> Named<AnyOf> {
    any_of(WHITESPACE.iter().collect::<String>()).with_name("space")
}

/// Any run of whitespace, possibly empty.
pub fn optional_spaces() -> Named<AtLeast<Named<AnyOf>>> {
    space().zero_or_more().with_name("spaces")
}

/// `A`, optional whitespace, then `B`.
#[derive(Debug, Clone)]
pub struct SpacedAnd<A, B> {
    first: A,
    second: B,
}

impl<A, B> SpacedAnd<A, B> {
    pub fn new(first: A, second: B) -> Self {
        Self { first, second }
    }
}

impl<A: Parser, B: Parser> Parser for SpacedAnd<A, B> {
    type Output = (A::Output, B::Output);

    fn expected_description(&self) -> String {
        format!(
            "{} and {}",
            self.first.expected_description(),
            self.second.expected_description()
        )
    }

    fn eat<'a>(&self, source: &Source<'a>, input: &'a str) -> ParseResult<'a, Self::Output> {
        let first = self.first.eat(source, input)?;
        let second = self.second.eat(source, skip_spaces(first.remainder))?;
        Ok(Parsed::new((first.value, second.value), second.remainder))
    }
}

/// Exactly `times` matches, each followed by optional whitespace.
#[derive(Debug, Clone)]
pub struct SpacedRepeat<P> {
    target: P,
    times: usize,
}

impl<P> SpacedRepeat<P> {
    pub fn new(target: P, times: usize) -> Self {
        Self { target, times }
    }
}

impl<P: Parser> Parser for SpacedRepeat<P> {
    type Output = Vec<P::Output>;

    fn expected_description(&self) -> String {
        format!(
            "{} exactly {} times",
            self.target.expected_description(),
            self.times
        )
    }

    fn eat<'a>(&self, source: &Source<'a>, input: &'a str) -> ParseResult<'a, Self::Output> {
        collect(&self.target, source, input, self.times, Some(self.times), true)
    }
}

/// `times` or more matches, each followed by optional whitespace.
#[derive(Debug, Clone)]
pub struct SpacedAtLeast<P> {
    target: P,
    times: usize,
}

impl<P> SpacedAtLeast<P> {
    pub fn new(target: P, times: usize) -> Self {
        Self { target, times }
    }
}

impl<P: Parser> Parser for SpacedAtLeast<P> {
    type Output = Vec<P::Output>;

    fn expected_description(&self) -> String {
        format!(
            "{} at least {} times",
            self.target.expected_description(),
            self.times
        )
    }

    fn eat<'a>(&self, source: &Source<'a>, input: &'a str) -> ParseResult<'a, Self::Output> {
        collect(&self.target, source, input, self.times, None, true)
    }
}

/// Between `min` and `max` matches, each followed by optional whitespace.
#[derive(Debug, Clone)]
pub struct SpacedInRange<P> {
    inner: InRange<P>,
}

impl<P> SpacedInRange<P> {
    /// # Panics
    ///
    /// If `min > max`.
    pub fn new(target: P, min: usize, max: usize) -> Self {
        Self {
            inner: InRange::new(target, min, max),
        }
    }
}

impl<P: Parser> Parser for SpacedInRange<P> {
    type Output = Vec<P::Output>;

    fn expected_description(&self) -> String {
        self.inner.expected_description()
    }

    fn eat<'a>(&self, source: &Source<'a>, input: &'a str) -> ParseResult<'a, Self::Output> {
        let (target, min, max) = self.inner.parts();
        collect(target, source, input, min, Some(max), true)
    }
}
