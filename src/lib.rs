//! Grakmat: parser combinators that report failures by line and column.
//!
//! Parsers are plain values implementing [`Parser`]; [`ParserExt`] composes
//! them. Every entry point returns either the value or a [`SyntaxError`]
//! pointing at the offending character.
//!
//! ```
//! use grakmat::{char_, rules::DIGIT, Parser, ParserExt};
//!
//! let sum = DIGIT.clone().before(char_('+')).and(DIGIT.clone());
//! assert_eq!(sum.parse("1+2").unwrap(), ('1', '2'));
//!
//! let error = sum.parse("1-2").unwrap_err();
//! assert_eq!(error.to_string(), "<inline>:1: Expected '+', but got '-'\n1: 1-2\n    ^");
//! ```

pub use crate::{
    ast::Node,
    config::ParseConfig,
    error::{Error, ParseError, SyntaxError, Tag},
    parser::{BoxedParser, ParseResult, Parsed, Parser, ParserExt, END_OF_INPUT},
    position::{lines_with_separators, position, Position},
    primitives::{any_char, any_of, char_, empty, empty_string, except, from_fn, string},
    reference::reference,
    source::Source,
};

pub mod ast;
pub mod cli;
pub mod combinators;
pub mod config;
pub mod discovery;
pub mod error;
pub mod grammars;
pub mod parser;
pub mod position;
pub mod primitives;
pub mod reference;
pub mod repl;
pub mod rules;
pub mod source;
pub mod spaced;
