//! Handles all user-facing output for the CLI.
//!
//! Parse results are rendered in the selected [`Format`]; failures are
//! printed either as the plain `name:line: message` block or as a full
//! miette report.

use std::{fmt, io::Write};

use miette::{Diagnostic, Report};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};
use thiserror::Error;

use crate::{cli::args::Format, discovery::CheckOutcome, grammars::Document};

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Failed to render JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Failed to render YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

// ============================================================================
// RESULTS
// ============================================================================

pub fn render(document: &Document, format: Format) -> Result<String, RenderError> {
    Ok(match format {
        Format::Pretty => document.to_string(),
        Format::Debug => format!("{document:#?}"),
        Format::Json => serde_json::to_string_pretty(document)?,
        Format::Yaml => serde_yaml::to_string(document)?
            .trim_end()
            .to_string(),
    })
}

// ============================================================================
// ERRORS
// ============================================================================

/// Formats a failure: a miette report when tracing, the plain message
/// otherwise.
pub fn format_error<E>(error: E, trace: bool) -> String
where
    E: Diagnostic + fmt::Display + Send + Sync + 'static,
{
    if trace {
        format!("{:?}", Report::new(error))
    } else {
        error.to_string()
    }
}

pub fn print_error<E>(error: E, trace: bool)
where
    E: Diagnostic + fmt::Display + Send + Sync + 'static,
{
    eprintln!("{}", format_error(error, trace));
}

// ============================================================================
// CHECK SUMMARY
// ============================================================================

/// Prints one line per checked file, failures with their diagnostics, then
/// the totals.
pub fn print_check_summary(outcomes: Vec<CheckOutcome>, trace: bool) {
    let mut stdout = StandardStream::stdout(ColorChoice::Auto);
    let total = outcomes.len();
    let mut failed = 0;

    for outcome in outcomes {
        match outcome.result {
            Ok(()) => {
                let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Green)));
                let _ = write!(stdout, "ok");
                let _ = stdout.reset();
                let _ = writeln!(stdout, "   {}", outcome.path.display());
            }
            Err(e) => {
                failed += 1;
                let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true));
                let _ = write!(stdout, "FAIL");
                let _ = stdout.reset();
                let _ = writeln!(stdout, " {}", outcome.path.display());
                print_error(e, trace);
            }
        }
    }

    let color = if failed == 0 { Color::Green } else { Color::Red };
    let _ = stdout.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true));
    let _ = writeln!(
        stdout,
        "\n{} passed, {} failed, {} total",
        total - failed,
        failed,
        total
    );
    let _ = stdout.reset();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::ParseConfig, grammars::Grammar};

    #[test]
    fn renders_every_format() {
        let document = Grammar::Json
            .parse(r#"{"a": [1, true]}"#, "<test>", &ParseConfig::default())
            .unwrap();
        assert_eq!(
            render(&document, Format::Json).unwrap(),
            "{\n  \"a\": [\n    1,\n    true\n  ]\n}"
        );
        assert_eq!(render(&document, Format::Yaml).unwrap(), "a:\n- 1\n- true");
        assert!(render(&document, Format::Debug).unwrap().starts_with("Json("));
        assert_eq!(
            render(&document, Format::Pretty).unwrap(),
            render(&document, Format::Json).unwrap()
        );
    }

    #[test]
    fn plain_and_traced_errors() {
        let error = Grammar::Url
            .parse("/x", "<test>", &ParseConfig::default())
            .unwrap_err();
        assert_eq!(
            format_error(error.clone(), false),
            "<test>:1: Expected domain, but got '/'\n1: /x\n   ^"
        );
        let report = format_error(error, true);
        assert!(report.contains("grakmat::unexpected_token"));
    }
}
