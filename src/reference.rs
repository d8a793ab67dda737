//! Lazy references for recursive grammars.
//!
//! A [`Reference`] resolves its target by calling a supplier on every use.
//! This lets rules refer to rules declared later, or to themselves, e.g.
//! through `once_cell::sync::Lazy` statics:
//!
//! ```
//! use grakmat::{char_, reference, BoxedParser, Parser, ParserExt};
//! use once_cell::sync::Lazy;
//!
//! static NESTED: Lazy<BoxedParser<usize>> = Lazy::new(|| {
//!     char_('(')
//!         .then(reference(|| NESTED.clone()))
//!         .before(char_(')'))
//!         .map(|depth| depth + 1)
//!         .or(char_('x').map(|_| 0))
//!         .boxed()
//! });
//!
//! assert_eq!(NESTED.parse("((x))").unwrap(), 2);
//! ```

use std::{cell::Cell, fmt};

use crate::{
    error::ParseError,
    parser::{ParseResult, Parser},
    source::Source,
};

/// Minimum stack space to keep available before recursing further.
const RED_ZONE: usize = 100 * 1024;

/// Stack space allocated each time the stack has to grow.
const STACK_PER_RECURSION: usize = 1024 * 1024;

/// How deep descriptions of reference cycles are followed before giving up.
const MAX_DESCRIPTION_DEPTH: usize = 32;

thread_local! {
    static DESCRIPTION_DEPTH: Cell<usize> = const { Cell::new(0) };
}

/// Runs `f`, growing the stack first if little of it is left.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}

/// A parser that looks up its target each time it runs.
pub fn reference<P, F>(supplier: F) -> Reference<F>
where
    F: Fn() -> P,
    P: Parser,
{
    Reference { supplier }
}

#[derive(Clone)]
pub struct Reference<F> {
    supplier: F,
}

impl<F> fmt::Debug for Reference<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Reference")
    }
}

impl<F, P> Parser for Reference<F>
where
    F: Fn() -> P,
    P: Parser,
{
    type Output = P::Output;

    /// The target's description. Cycles without a named rule in between are
    /// cut off and rendered as `...`.
    fn expected_description(&self) -> String {
        DESCRIPTION_DEPTH.with(|depth| {
            if depth.get() >= MAX_DESCRIPTION_DEPTH {
                return "...".to_string();
            }
            depth.set(depth.get() + 1);
            let description = (self.supplier)().expected_description();
            depth.set(depth.get() - 1);
            description
        })
    }

    fn eat<'a>(&self, source: &Source<'a>, input: &'a str) -> ParseResult<'a, P::Output> {
        let Some(_guard) = source.descend() else {
            return Err(ParseError::recursion_limit(source, input));
        };
        ensure_sufficient_stack(|| (self.supplier)().eat(source, input))
    }
}
