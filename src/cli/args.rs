//! Command-line arguments of the `grakmat` runner.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

use crate::grammars::Grammar;

#[derive(Debug, Parser)]
#[command(
    name = "grakmat",
    version,
    about = "Runner for the built-in grammars.",
    args_conflicts_with_subcommands = true,
    subcommand_negates_reqs = true
)]
pub struct GrakmatArgs {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Grammar to parse with.
    #[arg(value_enum, required = true)]
    pub grammar: Option<Grammar>,

    /// File to parse (default: standard input, or a REPL on a terminal).
    pub file: Option<PathBuf>,

    #[command(flatten)]
    pub options: Options,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Parse every file with the grammar's extension under a directory.
    Check {
        /// Grammar to parse with.
        #[arg(value_enum)]
        grammar: Grammar,
        /// Directory to search recursively.
        #[arg(default_value = ".")]
        dir: PathBuf,
    },
}

#[derive(Debug, Clone, Args)]
pub struct Options {
    /// How to render parse results.
    #[arg(long, value_enum, default_value_t = Format::Pretty, global = true)]
    pub format: Format,

    /// Print full diagnostic reports with a source snippet.
    #[arg(short, long, global = true)]
    pub trace: bool,

    /// Maximum nesting of rule references before a parse is abandoned.
    #[arg(long, global = true)]
    pub max_depth: Option<usize>,

    /// YAML file with parse settings (`preview_length`, `max_depth`).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log parse progress to stderr (-v: debug, -vv: trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
}

/// Rendering of a successfully parsed document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    /// The grammar's own text form.
    Pretty,
    /// Rust debug formatting.
    Debug,
    Json,
    Yaml,
}
