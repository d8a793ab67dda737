//! Complete grammars built from the combinators: JSON, URLs, and a small
//! grammar-definition language.
//!
//! Besides being usable on their own, they back the `grakmat` runner, which
//! selects one through [`Grammar`].

use std::{fmt, path::Path};

use serde::Serialize;

use crate::{
    ast::Node,
    config::ParseConfig,
    error::{Error, SyntaxError},
    parser::{BoxedParser, Parser, ParserExt},
};

pub mod gdl;
pub mod json;
pub mod url;

/// Ordered choice over a list of alternatives, tried front to back.
pub(crate) fn one_of<T: 'static>(
    first: BoxedParser<T>,
    rest: impl IntoIterator<Item = BoxedParser<T>>,
) -> BoxedParser<T> {
    rest.into_iter()
        .fold(first, |choice, next| choice.or(next).boxed())
}

/// Characters matched by a parser, collected back into text.
pub(crate) fn collect_string(chars: Vec<char>) -> String {
    chars.into_iter().collect()
}

// ============================================================================
// GRAMMAR SELECTION
// ============================================================================

/// The built-in grammars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum Grammar {
    Json,
    Url,
    Gdl,
}

impl Grammar {
    pub fn name(self) -> &'static str {
        match self {
            Grammar::Json => "json",
            Grammar::Url => "url",
            Grammar::Gdl => "gdl",
        }
    }

    /// File extension of documents written in this grammar.
    pub fn extension(self) -> &'static str {
        self.name()
    }

    pub fn parse(self, text: &str, name: &str, config: &ParseConfig) -> Result<Document, SyntaxError> {
        match self {
            Grammar::Json => json::parser().parse_with(text, name, config).map(Document::Json),
            Grammar::Url => url::parser().parse_with(text, name, config).map(Document::Url),
            Grammar::Gdl => gdl::parser().parse_with(text, name, config).map(Document::Gdl),
        }
    }

    pub fn parse_file(self, path: &Path, config: &ParseConfig) -> Result<Document, Error> {
        match self {
            Grammar::Json => json::parser().parse_file_with(path, config).map(Document::Json),
            Grammar::Url => url::parser().parse_file_with(path, config).map(Document::Url),
            Grammar::Gdl => gdl::parser().parse_file_with(path, config).map(Document::Gdl),
        }
    }
}

impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The result of parsing with one of the built-in grammars.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Document {
    Json(serde_json::Value),
    Url(url::Url),
    Gdl(Node),
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Document::Json(value) => write!(f, "{value:#}"),
            Document::Url(url) => write!(f, "{url}"),
            Document::Gdl(node) => write!(f, "{node}"),
        }
    }
}
