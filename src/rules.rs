//! Ready-made rules for common tokens.

use once_cell::sync::Lazy;

use crate::{
    combinators::Named,
    error::ParseError,
    parser::{BoxedParser, Parsed, Parser, ParserExt},
    primitives::{any_of, char_, from_fn, AnyOf, CharParser},
    spaced::{optional_spaces, space},
};

macro_rules! punctuation {
    ($($name:ident = $c:literal),* $(,)?) => {
        $(
            #[doc = concat!("`", $c, "`, reported as `'", $c, "'`.")]
            pub static $name: Lazy<Named<CharParser>> =
                Lazy::new(|| char_($c).with_name(concat!("'", $c, "'")));
        )*
    };
}

punctuation! {
    SEMICOLON = ';',
    COLON = ':',
    DOUBLE_QUOTE = '"',
    QUOTE = '\'',
    ASTERISK = '*',
    LEFT_BRACKET = '[',
    RIGHT_BRACKET = ']',
    LEFT_BRACE = '{',
    RIGHT_BRACE = '}',
    CARET = '^',
    COMMA = ',',
    MINUS = '-',
    PLUS = '+',
    SLASH = '/',
    BACKSLASH = '\\',
    GREATER_THAN_SIGN = '>',
    LESS_THAN_SIGN = '<',
    LEFT_PAREN = '(',
    RIGHT_PAREN = ')',
    DOT = '.',
    UNDERSCORE = '_',
    VERTICAL_BAR = '|',
    AMPERSAND = '&',
    QUESTION_MARK = '?',
    EQUALS_SIGN = '=',
    EXCLAMATION_MARK = '!',
    AT_SIGN = '@',
    HASH = '#',
}

/// A decimal digit.
pub static DIGIT: Lazy<Named<AnyOf>> = Lazy::new(|| any_of("0123456789").with_name("DIGIT"));

/// One or more digits, as text.
pub static NUMBER: Lazy<BoxedParser<String>> = Lazy::new(|| digits(1).with_name("NUMBER").boxed());

/// Letters, digits and underscores.
pub static IDENTIFIER: Lazy<BoxedParser<String>> = Lazy::new(|| {
    any_of("abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789_")
        .one_or_more()
        .map(|chars| chars.into_iter().collect::<String>())
        .with_name("IDENTIFIER")
        .boxed()
});

/// One or more whitespace characters, as text.
pub static SPACES: Lazy<BoxedParser<String>> = Lazy::new(|| {
    space()
        .one_or_more()
        .map(|chars| chars.into_iter().collect::<String>())
        .with_name("spaces")
        .boxed()
});

/// Any run of whitespace, possibly empty.
pub static OPTIONAL_SPACES: Lazy<BoxedParser<String>> = Lazy::new(|| {
    optional_spaces()
        .map(|chars| chars.into_iter().collect::<String>())
        .boxed()
});

fn digits(min: usize) -> BoxedParser<String> {
    DIGIT
        .clone()
        .at_least(min)
        .map(|digits| digits.into_iter().collect::<String>())
        .boxed()
}

/// Runs `text`, then converts what it matched; a failed conversion is
/// reported as a mismatch at the start of the literal.
pub(crate) fn converted<T: 'static>(
    text: BoxedParser<String>,
    name: &'static str,
    convert: fn(&str) -> Option<T>,
) -> BoxedParser<T> {
    from_fn(name, move |source, input| {
        let parsed = text.eat(source, input)?;
        match convert(&parsed.value) {
            Some(value) => Ok(Parsed::new(value, parsed.remainder)),
            None => Err(ParseError::unexpected_token(
                source,
                input,
                name,
                Some(parsed.value),
            )),
        }
    })
    .with_name(name)
    .boxed()
}

/// Numeric literals in the usual `-12`, `3.5`, `1e10` notations.
pub mod numbers {
    use serde::Serialize;

    use super::*;

    /// A parsed numeric literal.
    #[derive(Debug, Clone, Copy, PartialEq, Serialize)]
    #[serde(untagged)]
    pub enum Number {
        Integer(i64),
        Floating(f64),
    }

    impl Number {
        pub fn as_f64(self) -> f64 {
            match self {
                Number::Integer(i) => i as f64,
                Number::Floating(f) => f,
            }
        }
    }

    /// `0` or a digit run without leading zeros, optionally negative.
    fn integer_text() -> BoxedParser<String> {
        let zero = char_('0').map(|c| c.to_string());
        let positive = any_of("123456789")
            .and(DIGIT.clone().zero_or_more())
            .map(|(head, tail)| std::iter::once(head).chain(tail).collect::<String>());
        char_('-')
            .optional()
            .and(zero.or(positive))
            .map(|(minus, digits)| match minus {
                Some(_) => format!("-{digits}"),
                None => digits,
            })
            .boxed()
    }

    fn exponent_text() -> BoxedParser<String> {
        any_of("Ee")
            .and(any_of("+-").optional())
            .and(digits(1))
            .map(|((e, sign), digits)| {
                let mut text = e.to_string();
                text.extend(sign);
                text + &digits
            })
            .boxed()
    }

    fn floating_text() -> BoxedParser<String> {
        integer_text()
            .before(char_('.'))
            .and(digits(1))
            .and(exponent_text().optional())
            .map(|((integer, fraction), exponent)| {
                format!("{integer}.{fraction}{}", exponent.unwrap_or_default())
            })
            .boxed()
    }

    pub static INTEGER: Lazy<BoxedParser<i64>> =
        Lazy::new(|| converted(integer_text(), "INTEGER", |text| text.parse().ok()));

    pub static FLOATING: Lazy<BoxedParser<f64>> =
        Lazy::new(|| converted(floating_text(), "FLOATING", |text| text.parse().ok()));

    /// A floating literal, or an integer with an optional exponent. Integers
    /// too large for `i64` become floating.
    pub static NUMBER: Lazy<BoxedParser<Number>> = Lazy::new(|| {
        let integer = integer_text()
            .and(exponent_text().optional())
            .map(|(integer, exponent)| integer + &exponent.unwrap_or_default());
        converted(floating_text().or(integer).boxed(), "NUMBER", to_number)
    });

    fn to_number(text: &str) -> Option<Number> {
        if text.contains(['.', 'e', 'E']) {
            return text.parse().ok().map(Number::Floating);
        }
        match text.parse() {
            Ok(integer) => Some(Number::Integer(integer)),
            Err(_) => text.parse().ok().map(Number::Floating),
        }
    }
}
