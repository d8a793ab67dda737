//! The `grakmat` command-line runner.
//!
//! Parses a file, standard input, or REPL entries with one of the built-in
//! grammars, or checks every document of a grammar under a directory.

use std::{
    io::{self, Read},
    path::Path,
    process,
};

use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::{
    cli::args::{Command, GrakmatArgs, Options},
    config::ParseConfig,
    discovery,
    error::Error,
    grammars::{Document, Grammar},
    repl::{self, ReplState},
};

pub mod args;
pub mod output;

/// Environment variable holding a `tracing` filter, e.g. `grakmat=trace`.
pub const LOG_ENV: &str = "GRAKMAT_LOG";

/// Name under which standard input is reported.
const STDIN_NAME: &str = "<stdin>";

/// The main entry point for the CLI.
pub fn run() {
    let args = GrakmatArgs::parse();
    init_logging(args.options.verbose);

    let code = match execute(args) {
        Ok(code) => code,
        Err(Failure { error, trace }) => {
            output::print_error(error, trace);
            1
        }
    };
    process::exit(code);
}

/// An error to print before exiting unsuccessfully.
struct Failure {
    error: Error,
    trace: bool,
}

fn execute(args: GrakmatArgs) -> Result<i32, Failure> {
    let options = args.options;
    let trace = options.trace;
    let fail = |error: Error| Failure { error, trace };
    let config = load_config(&options).map_err(fail)?;
    debug!(?config, "configuration loaded");

    match (args.command, args.grammar) {
        (Some(Command::Check { grammar, dir }), _) => {
            info!(%grammar, dir = %dir.display(), "checking directory");
            let outcomes = discovery::check_dir(grammar, &dir, &config).map_err(fail)?;
            let all_passed = outcomes.iter().all(discovery::CheckOutcome::passed);
            output::print_check_summary(outcomes, trace);
            Ok(if all_passed { 0 } else { 1 })
        }
        (None, Some(grammar)) => match args.file {
            Some(file) => parse_file(grammar, &file, &config, &options).map_err(fail),
            None if atty::is(atty::Stream::Stdin) => {
                let state = ReplState::new(grammar, config, options.format, trace);
                repl::run_repl(state).map_err(|source| {
                    fail(Error::Io {
                        path: STDIN_NAME.into(),
                        source,
                    })
                })?;
                Ok(0)
            }
            None => parse_stdin(grammar, &config, &options).map_err(fail),
        },
        // clap requires a grammar whenever no subcommand is given.
        (None, None) => Ok(2),
    }
}

fn load_config(options: &Options) -> Result<ParseConfig, Error> {
    let mut config = match &options.config {
        Some(path) => ParseConfig::from_yaml_file(path)?,
        None => ParseConfig::default(),
    };
    if let Some(max_depth) = options.max_depth {
        config = config.with_max_depth(max_depth);
    }
    Ok(config)
}

fn parse_file(grammar: Grammar, path: &Path, config: &ParseConfig, options: &Options) -> Result<i32, Error> {
    let document = grammar.parse_file(path, config)?;
    print_document(&document, options)
}

fn parse_stdin(grammar: Grammar, config: &ParseConfig, options: &Options) -> Result<i32, Error> {
    let mut text = String::new();
    io::stdin()
        .read_to_string(&mut text)
        .map_err(|source| Error::Io {
            path: STDIN_NAME.into(),
            source,
        })?;
    let document = grammar.parse(&text, STDIN_NAME, config)?;
    print_document(&document, options)
}

fn print_document(document: &Document, options: &Options) -> Result<i32, Error> {
    match output::render(document, options.format) {
        Ok(text) => {
            println!("{text}");
            Ok(0)
        }
        Err(e) => {
            eprintln!("{e}");
            Ok(1)
        }
    }
}

/// Logs to stderr, filtered by [`LOG_ENV`] or else by the verbosity flag.
fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}
