//! JSON documents, parsed into [`serde_json::Value`].
//!
//! Integers that fit in an `i64` stay integers; other numbers become `f64`.
//! Numbers that do not fit a finite `f64` are read as `null`, since JSON
//! values cannot hold infinities.

use std::path::Path;

use once_cell::sync::Lazy;
use serde_json::{Map, Value};

use super::{collect_string, one_of};
use crate::{
    error::{Error, SyntaxError},
    parser::{BoxedParser, Parser, ParserExt},
    primitives::{any_of, char_, except, string},
    reference::reference,
    rules::{
        numbers::{Number, NUMBER},
        COLON, COMMA, DOUBLE_QUOTE, LEFT_BRACE, LEFT_BRACKET, OPTIONAL_SPACES, RIGHT_BRACE,
        RIGHT_BRACKET,
    },
};

fn escaped_character() -> BoxedParser<char> {
    let simple = any_of("\"\\/bfnrtv").map(|c| match c {
        'b' => '\u{8}',
        'f' => '\u{c}',
        'n' => '\n',
        'r' => '\r',
        't' => '\t',
        'v' => '\u{b}',
        other => other,
    });
    let unicode = char_('u')
        .then(any_of("0123456789abcdefABCDEF").repeat(4))
        .map(|digits| {
            u32::from_str_radix(&collect_string(digits), 16)
                .ok()
                .and_then(char::from_u32)
                .unwrap_or(char::REPLACEMENT_CHARACTER)
        });
    char_('\\').then(simple.or(unicode)).boxed()
}

static STRING_LITERAL: Lazy<BoxedParser<String>> = Lazy::new(|| {
    let character = except("\"\\")
        .or(escaped_character())
        .with_name("character");
    DOUBLE_QUOTE
        .clone()
        .then(character.zero_or_more())
        .before(DOUBLE_QUOTE.clone())
        .map(collect_string)
        .with_name("string literal")
        .boxed()
});

fn number_value(number: Number) -> Value {
    match number {
        Number::Integer(integer) => Value::from(integer),
        Number::Floating(floating) => serde_json::Number::from_f64(floating)
            .map(Value::Number)
            .unwrap_or(Value::Null),
    }
}

/// `first (',' rest)*`, whitespace allowed around the commas.
fn comma_separated<T: 'static>(item: BoxedParser<T>) -> BoxedParser<Vec<T>> {
    item.clone()
        .spaced_and(COMMA.clone().spaced_then(item).spaced_zero_or_more())
        .map(|(first, rest)| std::iter::once(first).chain(rest).collect::<Vec<_>>())
        .boxed()
}

static ARRAY: Lazy<BoxedParser<Value>> = Lazy::new(|| {
    let values = comma_separated(reference(|| VALUE.clone()).boxed());
    let filled = LEFT_BRACKET
        .clone()
        .spaced_then(values)
        .spaced_before(RIGHT_BRACKET.clone())
        .map(Value::Array);
    let empty = LEFT_BRACKET
        .clone()
        .spaced_and(RIGHT_BRACKET.clone())
        .map(|_| Value::Array(Vec::new()));
    filled.or(empty).with_name("array").boxed()
});

static OBJECT: Lazy<BoxedParser<Value>> = Lazy::new(|| {
    let pair = STRING_LITERAL
        .clone()
        .spaced_before(COLON.clone())
        .spaced_and(reference(|| VALUE.clone()))
        .with_name("pair")
        .boxed();
    let filled = LEFT_BRACE
        .clone()
        .spaced_then(comma_separated(pair))
        .spaced_before(RIGHT_BRACE.clone())
        .map(|pairs| Value::Object(pairs.into_iter().collect::<Map<_, _>>()));
    let empty = LEFT_BRACE
        .clone()
        .spaced_and(RIGHT_BRACE.clone())
        .map(|_| Value::Object(Map::new()));
    filled.or(empty).with_name("object").boxed()
});

static VALUE: Lazy<BoxedParser<Value>> = Lazy::new(|| {
    one_of(
        STRING_LITERAL.clone().map(Value::String).boxed(),
        [
            NUMBER.clone().map(number_value).boxed(),
            reference(|| OBJECT.clone()).boxed(),
            reference(|| ARRAY.clone()).boxed(),
            string("true").map(|_| Value::Bool(true)).boxed(),
            string("false").map(|_| Value::Bool(false)).boxed(),
            string("null").map(|_| Value::Null).boxed(),
        ],
    )
    .with_name("value")
    .boxed()
});

static DOCUMENT: Lazy<BoxedParser<Value>> = Lazy::new(|| {
    OPTIONAL_SPACES
        .clone()
        .then(VALUE.clone())
        .before(OPTIONAL_SPACES.clone())
        .boxed()
});

/// A whole JSON document, surrounding whitespace included.
pub fn parser() -> BoxedParser<Value> {
    DOCUMENT.clone()
}

pub fn parse(text: &str) -> Result<Value, SyntaxError> {
    DOCUMENT.parse(text)
}

pub fn parse_file(path: &Path) -> Result<Value, Error> {
    DOCUMENT.parse_file(path)
}
