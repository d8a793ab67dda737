//! Interactive parsing of one document after another.
//!
//! Input that ends in the middle of a document is continued on the next
//! line; an empty line forces the pending input to be parsed as it is.

use std::io::{self, BufRead, Write};

use crate::{
    cli::{args::Format, output},
    config::ParseConfig,
    error::SyntaxError,
    grammars::{Document, Grammar},
};

const PROMPT: &str = ">>> ";
const CONTINUATION_PROMPT: &str = "... ";

/// What became of the pending input.
#[derive(Debug)]
pub enum Evaluation {
    Parsed(Document),
    /// The input ended before the document did.
    Incomplete,
    Failed(SyntaxError),
}

/// REPL state that persists across evaluations
pub struct ReplState {
    grammar: Grammar,
    config: ParseConfig,
    format: Format,
    trace: bool,
    entry: usize,
}

impl ReplState {
    pub fn new(grammar: Grammar, config: ParseConfig, format: Format, trace: bool) -> Self {
        Self {
            grammar,
            config,
            format,
            trace,
            entry: 1,
        }
    }

    /// Name of the next entry in diagnostics.
    pub fn source_name(&self) -> String {
        format!("<repl:{}>", self.entry)
    }

    /// Parses `input`. Unless `force` is set, input with unclosed brackets
    /// or quotes, or input that runs out early, is reported as
    /// [`Evaluation::Incomplete`] and does not use up an entry.
    pub fn evaluate(&mut self, input: &str, force: bool) -> Evaluation {
        if !force && self.grammar != Grammar::Url && is_unbalanced(input) {
            return Evaluation::Incomplete;
        }
        match self.grammar.parse(input, &self.source_name(), &self.config) {
            Ok(document) => {
                self.entry += 1;
                Evaluation::Parsed(document)
            }
            Err(e) if e.error().is_end_of_input() && !force => Evaluation::Incomplete,
            Err(e) => {
                self.entry += 1;
                Evaluation::Failed(e)
            }
        }
    }
}

/// Main REPL entry point, on the process's standard streams.
pub fn run_repl(state: ReplState) -> io::Result<()> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    run(state, stdin.lock(), stdout.lock())
}

/// Runs the loop until `:quit` or the end of `input`.
pub fn run<R: BufRead, W: Write>(mut state: ReplState, mut input: R, mut out: W) -> io::Result<()> {
    writeln!(out, "grakmat {} ({} grammar)", env!("CARGO_PKG_VERSION"), state.grammar)?;
    writeln!(out, "Type :help for help, :quit to exit")?;

    let mut buffer = String::new();
    loop {
        let prompt = if buffer.is_empty() { PROMPT } else { CONTINUATION_PROMPT };
        write!(out, "{prompt}")?;
        out.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            if !buffer.is_empty() {
                writeln!(out)?;
                report(&mut state, &buffer, true, &mut out)?;
            }
            writeln!(out)?;
            return Ok(());
        }
        let line = line.trim_end_matches(['\n', '\r']);

        if buffer.is_empty() && line.starts_with(':') {
            match handle_command(line, &mut out)? {
                ReplCommand::Continue => continue,
                ReplCommand::Quit => return Ok(()),
            }
        }

        let force = line.trim().is_empty();
        if force && buffer.is_empty() {
            continue;
        }
        if !force {
            if !buffer.is_empty() {
                buffer.push('\n');
            }
            buffer.push_str(line);
        }

        if report(&mut state, &buffer, force, &mut out)? {
            buffer.clear();
        }
    }
}

/// Evaluates and prints; returns whether the pending input was used up.
fn report<W: Write>(state: &mut ReplState, buffer: &str, force: bool, out: &mut W) -> io::Result<bool> {
    match state.evaluate(buffer, force) {
        Evaluation::Parsed(document) => {
            match output::render(&document, state.format) {
                Ok(text) => writeln!(out, "{text}")?,
                Err(e) => writeln!(out, "{e}")?,
            }
            Ok(true)
        }
        Evaluation::Incomplete => Ok(false),
        Evaluation::Failed(e) => {
            writeln!(out, "{}", output::format_error(e, state.trace))?;
            Ok(true)
        }
    }
}

/// Whether `input` leaves a bracket or a quoted literal open.
fn is_unbalanced(input: &str) -> bool {
    let mut depth = 0i64;
    let mut quote = None;
    let mut escape_next = false;

    for ch in input.chars() {
        if escape_next {
            escape_next = false;
            continue;
        }
        match (quote, ch) {
            (Some(_), '\\') => escape_next = true,
            (Some(open), c) if c == open => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(ch),
            (None, '(' | '[' | '{') => depth += 1,
            (None, ')' | ']' | '}') => depth -= 1,
            _ => {}
        }
    }

    depth > 0 || quote.is_some()
}

/// REPL command results
enum ReplCommand {
    Continue,
    Quit,
}

/// Handle special REPL commands that start with ':'
fn handle_command<W: Write>(command: &str, out: &mut W) -> io::Result<ReplCommand> {
    match command.trim().to_ascii_lowercase().as_str() {
        ":help" | ":h" => {
            writeln!(out, "Commands:")?;
            writeln!(out, "  :help, :h     Show this help")?;
            writeln!(out, "  :quit, :q     Exit the REPL")?;
            writeln!(out)?;
            writeln!(out, "Enter a document to parse it. Unfinished documents continue")?;
            writeln!(out, "on the next line; an empty line parses what was entered so far.")?;
            Ok(ReplCommand::Continue)
        }
        ":quit" | ":q" => Ok(ReplCommand::Quit),
        _ => {
            writeln!(out, "Unknown command: {command}. Type :help for available commands.")?;
            Ok(ReplCommand::Continue)
        }
    }
}
