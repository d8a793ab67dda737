//! Line and column bookkeeping over raw source text.
//!
//! Offsets handed to this module are byte offsets into the text, as produced
//! by comparing remainder lengths during a parse. Columns count `char`s, so a
//! caret lines up with what a reader sees for any non-ASCII line.

use std::fmt;

use serde::Serialize;

/// Default ellipsis appended by [`bound_length`].
pub const ELLIPSIS: &str = "...";

/// A resolved location inside a source text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Position {
    /// 1-based line number.
    pub line_number: usize,
    /// 1-based column number, in characters.
    pub column_number: usize,
    /// The line's text without its terminator.
    pub line_text: String,
}

impl Position {
    pub fn new(line_number: usize, column_number: usize, line_text: impl Into<String>) -> Self {
        Self {
            line_number,
            column_number,
            line_text: line_text.into(),
        }
    }

    pub fn line_index(&self) -> usize {
        self.line_number - 1
    }

    pub fn column_index(&self) -> usize {
        self.column_number - 1
    }

    /// Moves the column one past the last character of the line.
    ///
    /// End-of-input failures always point here, regardless of where
    /// consumption stopped.
    pub fn end_of_line(mut self) -> Self {
        self.column_number = self.line_text.chars().count() + 1;
        self
    }
}

impl fmt::Display for Position {
    /// Renders `"<line>: <text>"` followed by a caret line under the column.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = format!("{}: ", self.line_number);
        writeln!(f, "{prefix}{}", self.line_text)?;
        write!(f, "{}^", " ".repeat(prefix.len() + self.column_index()))
    }
}

// ============================================================================
// LINE SPLITTING
// ============================================================================

/// Splits `text` into lines that keep their own terminator.
///
/// `\n`, `\r\n` and a lone `\r` each end a line. Concatenating the result
/// reproduces `text` exactly. An empty text has no lines.
pub fn lines_with_separators(text: &str) -> Vec<&str> {
    let bytes = text.as_bytes();
    let mut lines = Vec::new();
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\n' => {
                lines.push(&text[start..=i]);
                start = i + 1;
            }
            b'\r' if bytes.get(i + 1) == Some(&b'\n') => {
                i += 1;
                lines.push(&text[start..=i]);
                start = i + 1;
            }
            b'\r' => {
                lines.push(&text[start..=i]);
                start = i + 1;
            }
            _ => {}
        }
        i += 1;
    }
    if start < bytes.len() {
        lines.push(&text[start..]);
    }
    lines
}

/// Strips a single trailing `\n`, `\r\n` or `\r`.
pub fn strip_terminator(line: &str) -> &str {
    line.strip_suffix("\r\n")
        .or_else(|| line.strip_suffix('\n'))
        .or_else(|| line.strip_suffix('\r'))
        .unwrap_or(line)
}

/// Resolves a byte offset into a line/column position.
///
/// Offsets at or past the end of `text` resolve to one column past the end of
/// the last line.
pub fn position(text: &str, offset: usize) -> Position {
    let lines = lines_with_separators(text);
    let mut running = 0;
    for (index, line) in lines.iter().enumerate() {
        let end = running + line.len();
        if offset < end {
            let stripped = strip_terminator(line);
            let within = offset - running;
            // An offset inside a terminator sits just past the visible text.
            let column = match stripped.get(..within) {
                Some(head) => head.chars().count() + 1,
                None => stripped.chars().count() + 1,
            };
            return Position::new(index + 1, column, stripped);
        }
        running = end;
    }

    let last = lines.last().map(|line| strip_terminator(line)).unwrap_or("");
    Position::new(lines.len().max(1), 1, last).end_of_line()
}

// ============================================================================
// PREVIEW TRUNCATION
// ============================================================================

/// Keeps the first `max` characters of `text`, appending `"..."` when cut.
pub fn bound_length(text: &str, max: usize) -> String {
    bound_length_with(text, max, ELLIPSIS)
}

/// Like [`bound_length`] with a custom ellipsis.
pub fn bound_length_with(text: &str, max: usize, ellipsis: &str) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => format!("{}{ellipsis}", &text[..cut]),
        None => text.to_string(),
    }
}

/// Byte length of the first `count` characters of `text`, or of all of it.
pub(crate) fn char_prefix_len(text: &str, count: usize) -> usize {
    text.char_indices()
        .nth(count)
        .map(|(index, _)| index)
        .unwrap_or(text.len())
}
