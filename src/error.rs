// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Error types for parsing and include resolution.
//!
//! # Error Categories
//!
//! - **Syntax errors**: invalid template source, reported with source
//!   name and 1-based line/column.
//! - **Template-not-found**: the include resolver returned `None` for a
//!   requested name.
//! - **Include cycles**: an `{% include %}` chain that would recurse
//!   unboundedly.

use thiserror::Error;

/// A snippet of source code around an error location, for rich error
/// messages (line numbers with a caret pointing at the exact column).
#[derive(Debug, Clone)]
pub struct SourceContext {
    /// All lines of the source.
    pub lines: Vec<String>,
    /// 1-indexed line of the error.
    pub error_line: usize,
    /// 1-indexed column of the error.
    pub error_column: usize,
}

impl SourceContext {
    /// Builds a context from full source text and a 1-based line/column.
    pub fn from_source(source: &str, line: usize, column: usize) -> Self {
        SourceContext {
            lines: source.lines().map(str::to_string).collect(),
            error_line: line,
            error_column: column,
        }
    }

    /// Formats a snippet: one line before, the error line with a caret,
    /// one line after.
    pub fn format_snippet(&self) -> String {
        let start = self.error_line.saturating_sub(1).max(1);
        let end = (self.error_line + 1).min(self.lines.len());
        let mut out = String::new();
        for n in start..=end {
            if n == 0 || n > self.lines.len() {
                continue;
            }
            out.push_str(&format!("{:4} | {}\n", n, self.lines[n - 1]));
            if n == self.error_line {
                out.push_str(&format!(
                    "     | {}^\n",
                    " ".repeat(self.error_column.saturating_sub(1))
                ));
            }
        }
        out
    }
}

/// Errors raised while parsing templates or resolving includes.
#[derive(Error, Debug, Clone)]
pub enum ParserError {
    /// A syntactic failure, with best-effort source location.
    #[error("{}{}: {message}", source_name.as_deref().map(|n| format!("{n} ")).unwrap_or_default(), location_suffix(*line, *column))]
    Syntax {
        /// What went wrong, in the parser combinator's own words (the
        /// labels "or", "expecting", "unexpected", "end of input" may
        /// appear verbatim in this message).
        message: String,
        /// The source name, if one was given to `parse`/`parse_file`.
        source_name: Option<String>,
        /// 1-based line, if known.
        line: Option<usize>,
        /// 1-based column, if known.
        column: Option<usize>,
    },

    /// The include resolver returned `None` for `name`.
    #[error("Template source not found: {0}")]
    TemplateNotFound(String),

    /// An `{% include %}` chain revisited a source name already on the
    /// current include stack.
    #[error("include cycle detected: {}", chain.join(" -> "))]
    IncludeCycle {
        /// The cyclic chain of source names, in inclusion order, with the
        /// repeated name appended last.
        chain: Vec<String>,
    },

    /// Include recursion exceeded `EngineConfig::max_include_depth`.
    #[error("include depth exceeded {max} while resolving {name:?}")]
    IncludeDepthExceeded {
        /// The configured ceiling.
        max: usize,
        /// The include name being resolved when the ceiling was hit.
        name: String,
    },
}

fn location_suffix(line: Option<usize>, column: Option<usize>) -> String {
    match (line, column) {
        (Some(l), Some(c)) => format!("line {l}, column {c}"),
        _ => "at unknown location".to_string(),
    }
}

impl ParserError {
    /// Attaches (or overwrites) the source name on a `Syntax` error;
    /// other variants are returned unchanged. Used by `parse_file` to tag
    /// errors bubbling up from recursive include parses.
    pub fn with_source_name(self, name: impl Into<String>) -> Self {
        match self {
            ParserError::Syntax {
                message,
                line,
                column,
                ..
            } => ParserError::Syntax {
                message,
                source_name: Some(name.into()),
                line,
                column,
            },
            other => other,
        }
    }
}

/// Convenience alias for results over [`ParserError`].
pub type Result<T> = std::result::Result<T, ParserError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_not_found_message() {
        let e = ParserError::TemplateNotFound("partials/foo".to_string());
        assert_eq!(e.to_string(), "Template source not found: partials/foo");
    }

    #[test]
    fn source_context_marks_the_right_column() {
        let ctx = SourceContext::from_source("a\nbcd\ne", 2, 2);
        let snippet = ctx.format_snippet();
        assert!(snippet.contains("bcd"));
        assert!(snippet.contains("^"));
    }
}
