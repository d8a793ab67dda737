//! URLs of the form `protocol://domain:port/path#anchor?key=value&...`.
//!
//! Everything but the domain is optional. A missing protocol reads as
//! `http`, a missing port as `80`.

use std::{fmt, path::Path};

use once_cell::sync::Lazy;
use serde::{Serialize, Serializer};

use super::collect_string;
use crate::{
    error::{Error, SyntaxError},
    parser::{BoxedParser, Parser, ParserExt},
    primitives::{any_of, except},
    rules::{converted, AMPERSAND, COLON, DIGIT, EQUALS_SIGN, HASH, QUESTION_MARK, SLASH},
};

pub const DEFAULT_PROTOCOL: &str = "http";
pub const DEFAULT_PORT: u16 = 80;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Url {
    pub protocol: String,
    pub domain: String,
    pub port: u16,
    pub path: String,
    pub anchor: String,
    /// Query parameters in order of first appearance. A repeated key keeps
    /// its last value.
    #[serde(serialize_with = "serialize_params")]
    pub params: Vec<(String, String)>,
}

impl Url {
    /// Value of the query parameter `key`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }
}

fn serialize_params<S: Serializer>(params: &[(String, String)], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_map(params.iter().map(|(k, v)| (k, v)))
}

impl fmt::Display for Url {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}", self.protocol, self.domain)?;
        if self.port != DEFAULT_PORT {
            write!(f, ":{}", self.port)?;
        }
        f.write_str(&self.path)?;
        if !self.anchor.is_empty() {
            write!(f, "#{}", self.anchor)?;
        }
        for (i, (key, value)) in self.params.iter().enumerate() {
            let separator = if i == 0 { '?' } else { '&' };
            write!(f, "{separator}{key}={value}")?;
        }
        Ok(())
    }
}

/// Keeps the first position of each key and the last value given for it.
fn merge_params(pairs: Vec<(String, String)>) -> Vec<(String, String)> {
    let mut params: Vec<(String, String)> = Vec::with_capacity(pairs.len());
    for (key, value) in pairs {
        match params.iter_mut().find(|(existing, _)| *existing == key) {
            Some(slot) => slot.1 = value,
            None => params.push((key, value)),
        }
    }
    params
}

// ============================================================================
// GRAMMAR
// ============================================================================

static PARAMS: Lazy<BoxedParser<Vec<(String, String)>>> = Lazy::new(|| {
    let name = except("&=")
        .zero_or_more()
        .map(collect_string)
        .with_name("parameter name")
        .boxed();
    let value = except("&")
        .zero_or_more()
        .map(collect_string)
        .with_name("parameter value");

    let with_value = name.clone().before(EQUALS_SIGN.clone()).and(value);
    let without_value = name
        .clone()
        .before(EQUALS_SIGN.clone())
        .map(|name| (name, String::new()));
    let without_equals_sign = name.map(|name| (name, String::new()));
    let pair = with_value
        .or(without_value)
        .or(without_equals_sign)
        .boxed();

    let pairs = pair
        .clone()
        .and(AMPERSAND.clone().then(pair.optional()).zero_or_more())
        .map(|(first, rest)| {
            std::iter::once(first)
                .chain(rest.into_iter().flatten())
                .filter(|(name, _)| !name.is_empty())
                .collect::<Vec<_>>()
        });

    QUESTION_MARK
        .clone()
        .then(pairs.optional())
        .map(|pairs| merge_params(pairs.unwrap_or_default()))
        .with_name("parameters")
        .boxed()
});

static URL: Lazy<BoxedParser<Url>> = Lazy::new(|| {
    let protocol = any_of(('a'..='z').chain('A'..='Z').collect::<String>())
        .one_or_more()
        .before(COLON.clone())
        .before(SLASH.clone())
        .before(SLASH.clone())
        .map(collect_string)
        .with_name("protocol");
    let domain = any_of(
        ('0'..='9')
            .chain('a'..='z')
            .chain('A'..='Z')
            .chain(['.', '-'])
            .collect::<String>(),
    )
    .one_or_more()
    .map(collect_string)
    .with_name("domain");
    let digits = DIGIT.clone().one_or_more().map(collect_string).boxed();
    let port = COLON
        .clone()
        .then(converted(digits, "port", |text| text.parse::<u16>().ok()))
        .with_name("port");
    let path = except("#?")
        .zero_or_more()
        .map(collect_string)
        .with_name("path");
    let anchor = HASH
        .clone()
        .then(except("?").zero_or_more())
        .map(collect_string)
        .with_name("anchor");

    protocol
        .optional()
        .and(domain)
        .and(port.optional())
        .and(path)
        .and(anchor.optional())
        .and(PARAMS.clone().optional())
        .map(|(((((protocol, domain), port), path), anchor), params)| Url {
            protocol: protocol.unwrap_or_else(|| DEFAULT_PROTOCOL.to_string()),
            domain,
            port: port.unwrap_or(DEFAULT_PORT),
            path,
            anchor: anchor.unwrap_or_default(),
            params: params.unwrap_or_default(),
        })
        .with_name("URL")
        .boxed()
});

pub fn parser() -> BoxedParser<Url> {
    URL.clone()
}

pub fn parse(text: &str) -> Result<Url, SyntaxError> {
    URL.parse(text)
}

pub fn parse_file(path: &Path) -> Result<Url, Error> {
    URL.parse_file(path)
}
