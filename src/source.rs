use std::{cell::Cell, sync::Arc};

use miette::NamedSource;

use crate::{
    config::ParseConfig,
    position::{position, Position},
};

/// Label used when an input has no better name.
pub const INLINE_SOURCE_NAME: &str = "<inline>";

/// The complete text of one top-level parse, plus what diagnostics need to
/// describe it.
///
/// A `Source` lives for exactly one parse. It carries the nesting counter used
/// by lazy references, so it is deliberately neither `Sync` nor shared between
/// parses.
#[derive(Debug)]
pub struct Source<'a> {
    text: &'a str,
    name: String,
    config: ParseConfig,
    depth: Cell<usize>,
}

impl<'a> Source<'a> {
    pub fn new(text: &'a str) -> Self {
        Self::named(text, INLINE_SOURCE_NAME)
    }

    pub fn named(text: &'a str, name: impl Into<String>) -> Self {
        Self {
            text,
            name: name.into(),
            config: ParseConfig::default(),
            depth: Cell::new(0),
        }
    }

    pub fn with_config(mut self, config: ParseConfig) -> Self {
        self.config = config;
        self
    }

    pub fn text(&self) -> &'a str {
        self.text
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &ParseConfig {
        &self.config
    }

    /// Offset at which `remainder` starts. `remainder` must be a suffix of the
    /// source text.
    pub fn offset_of(&self, remainder: &str) -> usize {
        self.text.len().saturating_sub(remainder.len())
    }

    pub fn position_at(&self, offset: usize) -> Position {
        position(self.text, offset)
    }

    pub fn to_named_source(&self) -> Arc<NamedSource<String>> {
        Arc::new(NamedSource::new(self.name.clone(), self.text.to_string()))
    }

    /// Current number of active lazy references.
    pub fn depth(&self) -> usize {
        self.depth.get()
    }

    /// Enters one level of reference nesting, or returns `None` once the
    /// configured limit is reached. The level is released when the guard drops.
    pub(crate) fn descend(&self) -> Option<DepthGuard<'_>> {
        let depth = self.depth.get();
        if depth >= self.config.max_depth {
            return None;
        }
        self.depth.set(depth + 1);
        Some(DepthGuard { depth: &self.depth })
    }
}

pub(crate) struct DepthGuard<'s> {
    depth: &'s Cell<usize>,
}

impl Drop for DepthGuard<'_> {
    fn drop(&mut self) {
        self.depth.set(self.depth.get().saturating_sub(1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unnamed_sources_are_inline() {
        assert_eq!(Source::new("x").name(), "<inline>");
    }

    #[test]
    fn offsets_are_measured_from_the_remainder() {
        let source = Source::new("hello");
        assert_eq!(source.offset_of(&source.text()[2..]), 2);
        assert_eq!(source.offset_of(""), 5);
    }

    #[test]
    fn descend_respects_limit_and_releases() {
        let source = Source::new("").with_config(ParseConfig::default().with_max_depth(1));
        {
            let _guard = source.descend().unwrap();
            assert_eq!(source.depth(), 1);
            assert!(source.descend().is_none());
        }
        assert_eq!(source.depth(), 0);
        assert!(source.descend().is_some());
    }
}
