use std::{
    io,
    path::{Path, PathBuf},
};

use tracing::debug;
use walkdir::WalkDir;

use crate::{config::ParseConfig, error::Error, grammars::Grammar};

/// Outcome of parsing one discovered file.
#[derive(Debug)]
pub struct CheckOutcome {
    pub path: PathBuf,
    pub result: Result<(), Error>,
}

impl CheckOutcome {
    pub fn passed(&self) -> bool {
        self.result.is_ok()
    }
}

/// Finds documents written in a grammar.
#[derive(Debug)]
pub struct Discoverer;

impl Discoverer {
    /// Recursively collects files under `root` ending in `.extension`.
    ///
    /// The returned list is sorted so that checks run in a stable order.
    pub fn discover_files<P: AsRef<Path>>(root: P, extension: &str) -> Result<Vec<PathBuf>, Error> {
        let root = root.as_ref();
        let mut files = Vec::new();
        for entry in WalkDir::new(root) {
            let entry = entry.map_err(|e| Error::Io {
                path: e.path().unwrap_or(root).to_path_buf(),
                source: io::Error::from(e),
            })?;

            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            if !Self::has_extension(path, extension) {
                continue;
            }

            files.push(path.to_path_buf());
        }
        files.sort();
        debug!(root = %root.display(), count = files.len(), "discovered files");
        Ok(files)
    }

    fn has_extension(path: &Path, extension: &str) -> bool {
        path.extension().is_some_and(|ext| ext == extension)
    }
}

/// Parses each file with `grammar`, keeping going after failures.
pub fn check_files(grammar: Grammar, files: Vec<PathBuf>, config: &ParseConfig) -> Vec<CheckOutcome> {
    files
        .into_iter()
        .map(|path| {
            let result = grammar.parse_file(&path, config).map(|_| ());
            CheckOutcome { path, result }
        })
        .collect()
}

/// Discovers and checks every document for `grammar` under `root`.
pub fn check_dir<P: AsRef<Path>>(
    grammar: Grammar,
    root: P,
    config: &ParseConfig,
) -> Result<Vec<CheckOutcome>, Error> {
    let files = Discoverer::discover_files(root, grammar.extension())?;
    Ok(check_files(grammar, files, config))
}
