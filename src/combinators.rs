//! Parsers built out of other parsers.
//!
//! Each combinator is a plain struct holding its children. They are usually
//! built through the [`ParserExt`](crate::ParserExt) methods rather than by
//! name.

use tracing::trace;

use crate::{
    error::ParseError,
    parser::{ParseResult, Parsed, Parser},
    source::Source,
    spaced::skip_spaces,
};

// ============================================================================
// SEQUENCING
// ============================================================================

/// `A` followed by `B`, producing `(a, b)`.
#[derive(Debug, Clone)]
pub struct And<A, B> {
    first: A,
    second: B,
}

impl<A, B> And<A, B> {
    pub fn new(first: A, second: B) -> Self {
        Self { first, second }
    }
}

impl<A: Parser, B: Parser> Parser for And<A, B> {
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
        let second = self.second.eat(source, first.remainder)?;
        Ok(Parsed::new((first.value, second.value), second.remainder))
    }
}

/// Keeps the second half of a pair-producing parser.
#[derive(Debug, Clone)]
pub struct Then<P> {
    pair: P,
}

impl<P> Then<P> {
    pub fn new(pair: P) -> Self {
        Self { pair }
    }
}

impl<P, X, Y> Parser for Then<P>
where
    P: Parser<Output = (X, Y)>,
{
    type Output = Y;

    fn expected_description(&self) -> String {
        self.pair.expected_description()
    }

    fn eat<'a>(&self, source: &Source<'a>, input: &'a str) -> ParseResult<'a, Y> {
        Ok(self.pair.eat(source, input)?.map(|(_, y)| y))
    }
}

/// Keeps the first half of a pair-producing parser.
#[derive(Debug, Clone)]
pub struct Before<P> {
    pair: P,
}

impl<P> Before<P> {
    pub fn new(pair: P) -> Self {
        Self { pair }
    }
}

impl<P, X, Y> Parser for Before<P>
where
    P: Parser<Output = (X, Y)>,
{
    type Output = X;

    fn expected_description(&self) -> String {
        self.pair.expected_description()
    }

    fn eat<'a>(&self, source: &Source<'a>, input: &'a str) -> ParseResult<'a, X> {
        Ok(self.pair.eat(source, input)?.map(|(x, _)| x))
    }
}

// ============================================================================
// ALTERNATION
// ============================================================================

/// Ordered choice between two parsers of the same output type.
///
/// `B` runs against the same input as `A`, and only when `A` fails. When both
/// fail their failures are merged with [`ParseError::merge`].
#[derive(Debug, Clone)]
pub struct Or<A, B> {
    left: A,
    right: B,
}

impl<A, B> Or<A, B> {
    pub fn new(left: A, right: B) -> Self {
        Self { left, right }
    }
}

impl<A, B> Parser for Or<A, B>
where
    A: Parser,
    B: Parser<Output = A::Output>,
{
    type Output = A::Output;

    fn expected_description(&self) -> String {
        format!(
            "{} or {}",
            self.left.expected_description(),
            self.right.expected_description()
        )
    }

    fn eat<'a>(&self, source: &Source<'a>, input: &'a str) -> ParseResult<'a, Self::Output> {
        let left = match self.left.eat(source, input) {
            Ok(parsed) => return Ok(parsed),
            Err(e) if !e.is_recoverable() => return Err(e),
            Err(e) => e,
        };
        trace!(offset = left.offset(), "left alternative failed, trying right");
        let right = match self.right.eat(source, input) {
            Ok(parsed) => return Ok(parsed),
            Err(e) if !e.is_recoverable() => return Err(e),
            Err(e) => e,
        };
        Err(ParseError::merge(
            left,
            right,
            || self.left.expected_description(),
            || self.right.expected_description(),
        ))
    }
}

/// `Some(value)` when the target matches, otherwise `None` without consuming.
#[derive(Debug, Clone)]
pub struct Optional<P> {
    target: P,
}

impl<P> Optional<P> {
    pub fn new(target: P) -> Self {
        Self { target }
    }
}

impl<P: Parser> Parser for Optional<P> {
    type Output = Option<P::Output>;

    fn expected_description(&self) -> String {
        format!("{} or empty string", self.target.expected_description())
    }

    fn eat<'a>(&self, source: &Source<'a>, input: &'a str) -> ParseResult<'a, Self::Output> {
        match self.target.eat(source, input) {
            Ok(parsed) => Ok(parsed.map(Some)),
            Err(e) if e.is_recoverable() => Ok(Parsed::new(None, input)),
            Err(e) => Err(e),
        }
    }
}

// ============================================================================
// TRANSFORMATION AND NAMING
// ============================================================================

#[derive(Clone)]
pub struct Map<P, F> {
    target: P,
    transform: F,
}

impl<P, F> Map<P, F> {
    pub fn new(target: P, transform: F) -> Self {
        Self { target, transform }
    }
}

impl<P: std::fmt::Debug, F> std::fmt::Debug for Map<P, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Map").field("target", &self.target).finish()
    }
}

impl<P, F, U> Parser for Map<P, F>
where
    P: Parser,
    F: Fn(P::Output) -> U,
{
    type Output = U;

    fn expected_description(&self) -> String {
        self.target.expected_description()
    }

    fn eat<'a>(&self, source: &Source<'a>, input: &'a str) -> ParseResult<'a, U> {
        Ok(self.target.eat(source, input)?.map(&self.transform))
    }
}

/// Gives failures of the target a name, unless an inner name got there first.
#[derive(Debug, Clone)]
pub struct Named<P> {
    target: P,
    name: String,
}

impl<P> Named<P> {
    pub fn new(target: P, name: impl Into<String>) -> Self {
        Self {
            target,
            name: name.into(),
        }
    }
}

impl<P: Parser> Parser for Named<P> {
    type Output = P::Output;

    fn expected_description(&self) -> String {
        self.name.clone()
    }

    fn eat<'a>(&self, source: &Source<'a>, input: &'a str) -> ParseResult<'a, P::Output> {
        self.target
            .eat(source, input)
            .map_err(|e| e.named(&self.name))
    }
}

// ============================================================================
// REPETITION
// ============================================================================

/// Matches `target` between `min` and `max` times.
///
/// The first `min` matches are mandatory and their failures propagate. After
/// that matching is greedy and stops at the first recoverable failure, at
/// `max`, or at a match that consumed nothing. With `spaced`, optional
/// whitespace is skipped after every match.
pub(crate) fn collect<'a, P: Parser>(
    target: &P,
    source: &Source<'a>,
    input: &'a str,
    min: usize,
    max: Option<usize>,
    spaced: bool,
) -> ParseResult<'a, Vec<P::Output>> {
    let mut values = Vec::with_capacity(min);
    let mut remainder = input;

    for _ in 0..min {
        let parsed = target.eat(source, remainder)?;
        values.push(parsed.value);
        remainder = if spaced {
            skip_spaces(parsed.remainder)
        } else {
            parsed.remainder
        };
    }

    while max.map_or(true, |max| values.len() < max) {
        let parsed = match target.eat(source, remainder) {
            Ok(parsed) => parsed,
            Err(e) if e.is_recoverable() => {
                trace!(count = values.len(), offset = e.offset(), "repetition stopped");
                break;
            }
            Err(e) => return Err(e),
        };
        let next = if spaced {
            skip_spaces(parsed.remainder)
        } else {
            parsed.remainder
        };
        if next.len() == remainder.len() {
            break;
        }
        values.push(parsed.value);
        remainder = next;
    }

    Ok(Parsed::new(values, remainder))
}

/// Exactly `times` matches.
#[derive(Debug, Clone)]
pub struct Repeat<P> {
    target: P,
    times: usize,
}

impl<P> Repeat<P> {
    pub fn new(target: P, times: usize) -> Self {
        Self { target, times }
    }
}

impl<P: Parser> Parser for Repeat<P> {
    type Output = Vec<P::Output>;

    fn expected_description(&self) -> String {
        format!(
            "{} exactly {} times",
            self.target.expected_description(),
            self.times
        )
    }

    fn eat<'a>(&self, source: &Source<'a>, input: &'a str) -> ParseResult<'a, Self::Output> {
        collect(&self.target, source, input, self.times, Some(self.times), false)
    }
}

/// `times` or more matches.
#[derive(Debug, Clone)]
pub struct AtLeast<P> {
    target: P,
    times: usize,
}

impl<P> AtLeast<P> {
    pub fn new(target: P, times: usize) -> Self {
        Self { target, times }
    }
}

impl<P: Parser> Parser for AtLeast<P> {
    type Output = Vec<P::Output>;

    fn expected_description(&self) -> String {
        format!(
            "{} at least {} times",
            self.target.expected_description(),
            self.times
        )
    }

    fn eat<'a>(&self, source: &Source<'a>, input: &'a str) -> ParseResult<'a, Self::Output> {
        collect(&self.target, source, input, self.times, None, false)
    }
}

/// Between `min` and `max` matches, inclusive.
#[derive(Debug, Clone)]
pub struct InRange<P> {
    target: P,
    min: usize,
    max: usize,
}

impl<P> InRange<P> {
    /// # Panics
    ///
    /// If `min > max`.
    pub fn new(target: P, min: usize, max: usize) -> Self {
        assert!(min <= max, "invalid repetition range {min}..={max}");
        Self { target, min, max }
    }

    pub(crate) fn parts(&self) -> (&P, usize, usize) {
        (&self.target, self.min, self.max)
    }
}

impl<P: Parser> Parser for InRange<P> {
    type Output = Vec<P::Output>;

    fn expected_description(&self) -> String {
        format!(
            "{}{{{},{}}}",
            self.target.expected_description(),
            self.min,
            self.max
        )
    }

    fn eat<'a>(&self, source: &Source<'a>, input: &'a str) -> ParseResult<'a, Self::Output> {
        collect(&self.target, source, input, self.min, Some(self.max), false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        primitives::{any_of, char_, empty_string, string},
        ParserExt,
    };

    fn eat_all<'a, P: Parser>(parser: &P, text: &'a str) -> ParseResult<'a, P::Output> {
        let source = Source::new(text);
        parser.eat(&source, text)
    }

    #[test]
    fn and_pairs_values() {
        let parsed = eat_all(&char_('a').and(char_('b')), "abc").unwrap();
        assert_eq!(parsed.value, ('a', 'b'));
        assert_eq!(parsed.remainder, "c");
    }

    #[test]
    fn and_propagates_second_failure_untouched() {
        let error = eat_all(&char_('a').and(char_('b')), "ax").unwrap_err();
        assert_eq!(error.expected(), Some("'b'"));
        assert_eq!(error.offset(), 1);
    }

    #[test]
    fn then_and_before_pick_sides() {
        assert_eq!(eat_all(&char_('a').then(char_('b')), "ab").unwrap().value, 'b');
        assert_eq!(eat_all(&char_('a').before(char_('b')), "ab").unwrap().value, 'a');
    }

    #[test]
    fn or_is_left_biased() {
        let parser = string("ab").or(string("a"));
        assert_eq!(eat_all(&parser, "abc").unwrap().value, "ab");
        assert_eq!(eat_all(&parser, "ac").unwrap().value, "a");
    }

    #[test]
    fn or_named_only_when_both_named() {
        let both = char_('a').with_name("A").or(char_('b').with_name("B"));
        let error = eat_all(&both, "x").unwrap_err();
        assert!(error.is_named());
        assert_eq!(error.expected(), Some("A or B"));

        let one = char_('a').with_name("A").or(char_('b'));
        assert!(!eat_all(&one, "x").unwrap_err().is_named());
    }

    #[test]
    fn named_rewrites_unnamed_failures() {
        let parser = char_('a').with_name("letter a");
        let error = eat_all(&parser, "b").unwrap_err();
        assert_eq!(error.expected(), Some("letter a"));
        assert_eq!(error.got(), Some("b"));
        assert_eq!(parser.expected_description(), "letter a");
    }

    #[test]
    fn optional_does_not_consume_on_failure() {
        let parsed = eat_all(&char_('a').optional(), "b").unwrap();
        assert_eq!(parsed.value, None);
        assert_eq!(parsed.remainder, "b");
    }

    #[test]
    fn repeat_is_exact() {
        let parser = char_('a').repeat(2);
        assert_eq!(eat_all(&parser, "aaa").unwrap().remainder, "a");
        assert!(eat_all(&parser, "ab").is_err());
        assert_eq!(parser.expected_description(), "'a' exactly 2 times");
    }

    #[test]
    fn at_least_requires_minimum() {
        let digits = any_of("0123456789");
        assert!(eat_all(&(&digits).at_least(1), "x").is_err());
        let parsed = eat_all(&(&digits).at_least(0), "x").unwrap();
        assert!(parsed.value.is_empty());
        assert_eq!(parsed.remainder, "x");
    }

    #[test]
    fn zero_width_matches_do_not_loop() {
        let parsed = eat_all(&empty_string().zero_or_more(), "abc").unwrap();
        assert!(parsed.value.is_empty());
        assert_eq!(parsed.remainder, "abc");
    }

    #[test]
    fn in_range_stops_at_max() {
        let parser = char_('a').in_range(1..=2);
        let parsed = eat_all(&parser, "aaaa").unwrap();
        assert_eq!(parsed.value.len(), 2);
        assert_eq!(parsed.remainder, "aa");
        assert_eq!(parser.expected_description(), "'a'{1,2}");
    }

    #[test]
    #[should_panic(expected = "invalid repetition range")]
    fn in_range_rejects_inverted_bounds() {
        let _ = InRange::new(char_('a'), 3, 1);
    }
}
