//! End-to-end behavior of the combinators through the public API.

use grakmat::{
    char_, reference, rules::DIGIT, string, BoxedParser, ParseConfig, ParseError, Parser,
    ParserExt, Position, Source, END_OF_INPUT,
};
use once_cell::sync::Lazy;

/// Runs `parser` on the whole of `text` without requiring it to finish.
fn eat<'a, P: Parser>(parser: &P, source: &Source<'a>) -> Result<(P::Output, &'a str), ParseError> {
    parser
        .eat(source, source.text())
        .map(|parsed| (parsed.value, parsed.remainder))
}

#[test]
fn single_char_match() {
    let source = Source::new("abc");
    let (value, remainder) = eat(&char_('a'), &source).unwrap();
    assert_eq!(value, 'a');
    assert_eq!(remainder, "bc");
}

#[test]
fn single_char_mismatch() {
    let source = Source::new("bc");
    let error = eat(&char_('a'), &source).unwrap_err();
    assert!(matches!(error, ParseError::UnexpectedToken { .. }));
    assert_eq!(error.expected(), Some("'a'"));
    assert_eq!(error.got(), Some("b"));
    assert_eq!(error.position(), &Position::new(1, 1, "bc"));
}

#[test]
fn alternatives_list_both_expectations() {
    let parser = string("foo").or(string("bar"));
    let error = parser.parse("baz").unwrap_err();
    assert_eq!(error.expected(), Some("\"foo\" or \"bar\""));
}

#[test]
fn repetition_stops_at_first_mismatch() {
    let source = Source::new("123abc");
    let (digits, remainder) = eat(&DIGIT.clone().at_least(1), &source).unwrap();
    assert_eq!(digits, ['1', '2', '3']);
    assert_eq!(remainder, "abc");
}

#[test]
fn entry_point_requires_end_of_input() {
    let error = DIGIT.clone().one_or_more().parse("123x").unwrap_err();
    assert_eq!(error.expected(), Some(END_OF_INPUT));
    assert_eq!(error.got(), Some("x"));
    assert_eq!(error.offset(), 3);
    assert_eq!(error.position(), &Position::new(1, 4, "123x"));
}

#[test]
fn bounded_repetition_leaves_the_rest() {
    let source = Source::new("12345");
    let (digits, remainder) = eat(&DIGIT.clone().in_range(2..=4), &source).unwrap();
    assert_eq!(digits, ['1', '2', '3', '4']);
    assert_eq!(remainder, "5");
}

#[test]
fn leftover_preview_is_bounded() {
    let config = ParseConfig::default().with_preview_length(3);
    let error = char_('a')
        .parse_with("abcdefg", "<preview>", &config)
        .unwrap_err();
    assert_eq!(error.got(), Some("bcd..."));
}

#[test]
fn unnamed_root_failure_takes_root_description() {
    let parser = char_('a').and(char_('b')).with_name("pair");
    let error = parser.parse("ax").unwrap_err();
    assert_eq!(error.expected(), Some("pair"));
    assert_eq!(error.offset(), 1);
}

#[test]
fn spaced_sequences_skip_whitespace() {
    let parser = char_('a').spaced_then(char_('b')).spaced_one_or_more();
    let source = Source::new("a b\n\ta  b c");
    let (values, remainder) = eat(&parser, &source).unwrap();
    assert_eq!(values, ['b', 'b']);
    assert_eq!(remainder.trim_start(), "c");
}

static LIST: Lazy<BoxedParser<Vec<usize>>> = Lazy::new(|| {
    let item = char_('[')
        .then(reference(|| LIST.clone()))
        .before(char_(']'))
        .map(|inner| inner.len())
        .or(char_('x').map(|_| 0));
    item.zero_or_more().boxed()
});

#[test]
fn references_build_recursive_grammars() {
    assert_eq!(LIST.parse("x[xx][]x").unwrap(), [0, 2, 0, 0]);
    let error = LIST.parse("[x").unwrap_err();
    assert_eq!(error.expected(), Some(END_OF_INPUT));
    assert_eq!(error.offset(), 0);
}

#[test]
fn runaway_recursion_is_reported() {
    static LOOP: Lazy<BoxedParser<char>> =
        Lazy::new(|| reference(|| LOOP.clone()).or(char_('x')).boxed());
    let config = ParseConfig::default().with_max_depth(64);
    let error = LOOP.parse_with("x", "<loop>", &config).unwrap_err();
    assert!(matches!(error.error(), ParseError::RecursionLimit { limit: 64, .. }));
    assert_eq!(error.source_name(), "<loop>");
}
