#![allow(clippy::module_inception)]

use serde::{Deserialize, Serialize};

use crate::errors::errors::{Error, ErrorImpl, ErrorTip};

pub mod config;
pub mod cst;
pub mod errors;
pub mod incremental;
pub mod lexer;
pub mod macros;
pub mod parser;

extern crate regex;

pub use config::{Dialect, ParseOptions};
pub use cst::{
    node::{Field, Node, NodeKind},
    schema::{check_node, node_type, node_types, node_types_json},
    tree::SyntaxTree,
};
pub use incremental::incremental::{parse_incremental, Edit};
pub use parser::parser::{parse, parse_with_options};

/// Largest source, in bytes, whose offsets fit a [`Span`].
pub const MAX_SOURCE_LEN: usize = u32::MAX as usize;

/// Rejects sources whose byte offsets would not fit in a [`Span`].
pub fn check_source_len(len: usize) -> Result<(), Error> {
    if len > MAX_SOURCE_LEN {
        return Err(Error::new(
            ErrorImpl::SourceTooLarge {
                len,
                limit: MAX_SOURCE_LEN,
            },
            Span::default(),
        ));
    }

    Ok(())
}

/// Byte range `[start, end)` into a source buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    pub start: u32,
    pub end: u32,
}

impl Span {
    /// Offsets must not exceed [`MAX_SOURCE_LEN`]; the parse entry points
    /// check this with [`check_source_len`] before any span is built.
    pub fn new(start: usize, end: usize) -> Self {
        Span {
            start: start as u32,
            end: end as u32,
        }
    }

    pub fn empty_at(position: u32) -> Self {
        Span {
            start: position,
            end: position,
        }
    }

    pub fn len(&self) -> u32 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn cover(&self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Moves the span by `delta` bytes.
    pub fn shifted(&self, delta: i64) -> Span {
        Span {
            start: (self.start as i64 + delta) as u32,
            end: (self.end as i64 + delta) as u32,
        }
    }

    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        source
            .get(self.start as usize..self.end as usize)
            .unwrap_or("")
    }
}

/// Finds the line containing byte `offset`.
///
/// Returns the 1-based line number, the line's text and the column of
/// `offset` within it, or `None` when the offset lies past the end.
pub fn line_at_offset(source: &str, offset: u32) -> Option<(usize, &str, usize)> {
    let pos = offset as usize;
    let mut start = 0;

    for (index, line) in source.split_inclusive('\n').enumerate() {
        let end = start + line.len();

        if (start..end).contains(&pos) {
            return Some((index + 1, line, pos - start));
        }

        start = end;
    }

    // Offsets at the very end point just past the last line.
    if pos == source.len() {
        let line_start = source.rfind('\n').map(|index| index + 1).unwrap_or(0);
        let line_number = source[..line_start].matches('\n').count() + 1;
        return Some((line_number, &source[line_start..], pos - line_start));
    }

    None
}

/// Formats a diagnostic with the offending line and a caret under its start.
///
/// ```text
/// Error: UnexpectedToken (Unexpected token: `}`)
/// -> main.fl
///    |
/// 20 | let a = }
///    | --------^
/// ```
pub fn render_diagnostic(error: &Error, source: &str, file: &str) -> String {
    let mut out = String::new();

    if let ErrorTip::None = error.get_tip() {
        out.push_str(&format!("Error: {}\n", error.get_error_name()));
    } else {
        out.push_str(&format!(
            "Error: {} ({})\n",
            error.get_error_name(),
            error.get_tip()
        ));
    }
    out.push_str(&format!("-> {}\n", file));

    let Some((line, line_text, line_pos)) = line_at_offset(source, error.get_span().start) else {
        return out;
    };

    let line_string = line.to_string();
    let padding = line_string.len() + 2;
    out.push_str(&format!("{:>padding$}\n", "|"));

    let (line_text_removed, removed_whitespace) = remove_starting_whitespace(line_text);
    out.push_str(&format!("{} | {}\n", line_string, line_text_removed.trim_end()));

    let arrows = line_pos.saturating_sub(removed_whitespace) + 1;
    out.push_str(&format!("{:>padding$} {:->arrows$}\n", "|", "^"));

    out
}

fn remove_starting_whitespace(string: &str) -> (&str, usize) {
    let start = string.len() - string.trim_start_matches(' ').len();
    (&string[start..], start)
}
