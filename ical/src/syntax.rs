// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Untyped syntax layer of the RFC 5545 text format.
//!
//! ```text
//! Source Text → Lexer → Token Stream → Scanner → Content Lines → Tree Builder → Raw Components
//! ```

pub mod lexer;
pub mod scanner;
pub mod tree_builder;

use std::fmt;
use std::ops::Range;

pub use crate::syntax::scanner::{ContentLine, RawParameter, RawParameterValue, SyntaxError};
pub use crate::syntax::tree_builder::RawComponent;

use crate::parser::ParseError;

/// Byte range in the source text.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    /// Start offset, inclusive.
    pub start: usize,
    /// End offset, exclusive.
    pub end: usize,
}

impl Span {
    /// Create a new span.
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Smallest span covering both spans.
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        Self::new(self.start.min(other.start), self.end.max(other.end))
    }

    /// Convert into a range usable for slicing the source.
    #[must_use]
    pub const fn range(self) -> Range<usize> {
        self.start..self.end
    }
}

impl From<Range<usize>> for Span {
    fn from(value: Range<usize>) -> Self {
        Self::new(value.start, value.end)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Run the syntax layer: unfold, tokenize and nest content lines.
///
/// # Errors
///
/// Returns the first malformed content line or unbalanced `BEGIN`/`END` pair.
pub fn syntax_analysis(src: &str) -> Result<Vec<RawComponent>, ParseError> {
    let lines = scanner::scan_content_lines(src, lexer::tokenize(src))?;
    tracing::debug!(lines = lines.len(), "scanned content lines");
    tree_builder::build_tree(lines)
}
