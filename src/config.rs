//! Per-parse tuning knobs.

use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Number of characters of offending input quoted in a diagnostic.
pub const DEFAULT_PREVIEW_LENGTH: usize = 20;

/// Nesting limit for lazy references before a parse is abandoned.
pub const DEFAULT_MAX_DEPTH: usize = 4096;

/// Configuration applied to a single top-level parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ParseConfig {
    /// Characters of leftover or mismatched input shown in diagnostics.
    pub preview_length: usize,
    /// How many lazy references may be active at once.
    pub max_depth: usize,
}

impl ParseConfig {
    /// Reads settings from a YAML file. Absent settings keep their defaults.
    pub fn from_yaml_file(path: &Path) -> Result<Self, Error> {
        let text = fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_str(&text).map_err(|source| Error::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_preview_length(mut self, preview_length: usize) -> Self {
        self.preview_length = preview_length;
        self
    }
}

impl Default for ParseConfig {
    fn default() -> Self {
        Self {
            preview_length: DEFAULT_PREVIEW_LENGTH,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}
