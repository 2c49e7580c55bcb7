// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! iCalendar (RFC 5545) formatter module.
//!
//! This module writes components back to the RFC 5545 text format, to any
//! `std::io::Write` implementer. Properties and children are written in the
//! order the component holds them, so parsing the output yields an equal
//! tree.
//!
//! # Example
//!
//! ```
//! use agendum_ical::{parse, serialize};
//!
//! let src = "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nEND:VCALENDAR\r\n";
//! let calendars = parse(src).unwrap();
//! assert_eq!(serialize(&calendars).unwrap(), src);
//! ```

use std::io::{self, Write};

use crate::component::Component;

/// Format components to a `String` with the default options.
///
/// # Errors
///
/// Returns an error if writing to the internal buffer fails or if the output
/// contains invalid UTF-8 data.
pub fn serialize(components: &[Component]) -> io::Result<String> {
    FormatOptions::default().write_to_string(components)
}

/// Formatting options for the iCalendar formatter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatOptions {
    /// Maximum line length in octets before folding.
    /// - `None`: no line folding
    /// - `Some(n)`: fold lines longer than n octets
    ///
    /// Default: `Some(75)` for RFC 5545 compliance.
    pub folding: Option<usize>,

    /// Line folding style.
    ///
    /// Default: `FoldingStyle::Space` (CRLF + SPACE).
    pub folding_style: FoldingStyle,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            folding: Some(75),
            folding_style: FoldingStyle::default(),
        }
    }
}

impl FormatOptions {
    /// Set the line folding option.
    #[must_use]
    pub const fn folding(mut self, folding: Option<usize>) -> Self {
        self.folding = folding;
        self
    }

    /// Set the line folding style.
    #[must_use]
    pub const fn folding_style(mut self, style: FoldingStyle) -> Self {
        self.folding_style = style;
        self
    }

    /// Write components to any `Write` implementer.
    ///
    /// # Errors
    /// Returns an error if writing fails.
    pub fn write(&self, components: &[Component], w: &mut impl Write) -> io::Result<()> {
        let mut formatter = Formatter::new(w, *self);
        for component in components {
            formatter.write_component(component)?;
        }
        formatter.flush()
    }

    /// Write components to a `String`.
    ///
    /// # Errors
    /// Returns an error if writing fails or if the output contains invalid UTF-8 data.
    pub fn write_to_string(&self, components: &[Component]) -> io::Result<String> {
        let mut buffer = Vec::new();
        self.write(components, &mut buffer)?;
        tracing::debug!(bytes = buffer.len(), "serialized iCalendar stream");
        String::from_utf8(buffer).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }
}

/// Line folding style for RFC 5545 formatting.
///
/// RFC 5545 specifies that folded lines should start with CRLF followed by
/// a whitespace character (SPACE or TAB).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FoldingStyle {
    /// CRLF + SPACE (RFC 5545 default)
    #[default]
    Space,
    /// CRLF + TAB
    Tab,
}

impl FoldingStyle {
    /// Get the folding sequence for this style.
    #[must_use]
    pub(crate) const fn as_bytes(self) -> &'static [u8] {
        match self {
            Self::Space => b"\r\n ",
            Self::Tab => b"\r\n\t",
        }
    }

    /// Get the length of the continuation character after CRLF.
    #[must_use]
    pub(crate) const fn continuation_len() -> usize {
        1 // Both SPACE and TAB are 1 byte
    }
}

/// iCalendar formatter that writes to any `Write` implementer.
///
/// # Example
///
/// ```
/// use agendum_ical::formatter::{FormatOptions, Formatter};
///
/// let mut buffer = Vec::new();
/// let mut formatter = Formatter::new(&mut buffer, FormatOptions::default());
/// formatter.write_line("BEGIN:VCALENDAR").unwrap();
/// formatter.write_line("END:VCALENDAR").unwrap();
/// assert_eq!(buffer, b"BEGIN:VCALENDAR\r\nEND:VCALENDAR\r\n");
/// ```
#[derive(Debug)]
pub struct Formatter<W: Write> {
    /// The underlying writer.
    writer: W,
    /// Formatting options.
    options: FormatOptions,
}

impl<W: Write> Formatter<W> {
    /// Create a new formatter with options.
    #[must_use]
    pub const fn new(writer: W, options: FormatOptions) -> Self {
        Self { writer, options }
    }

    /// Consumes this formatter, returning the underlying writer.
    #[must_use]
    pub fn into_writer(self) -> W {
        self.writer
    }

    /// Write a component block with its properties and children.
    ///
    /// # Errors
    /// Returns an error if writing fails.
    pub fn write_component(&mut self, component: &Component) -> io::Result<()> {
        let kind = component.kind();
        self.write_line(&format!("BEGIN:{kind}"))?;
        for property in component.properties() {
            self.write_line(&property.to_string())?;
        }
        for child in component.children() {
            self.write_component(child)?;
        }
        self.write_line(&format!("END:{kind}"))
    }

    /// Write one logical line followed by CRLF, folded per the options.
    ///
    /// Folds never split a UTF-8 sequence. The continuation character counts
    /// against the width of its physical line.
    ///
    /// # Errors
    /// Returns an error if writing fails.
    pub fn write_line(&mut self, line: &str) -> io::Result<()> {
        let Some(width) = self.options.folding else {
            self.writer.write_all(line.as_bytes())?;
            return self.writer.write_all(b"\r\n");
        };

        let mut rest = line;
        let mut limit = width;
        while rest.len() > limit {
            let (head, tail) = split_at_boundary(rest, limit);
            self.writer.write_all(head.as_bytes())?;
            self.writer
                .write_all(self.options.folding_style.as_bytes())?;
            rest = tail;
            limit = width.saturating_sub(FoldingStyle::continuation_len());
        }
        self.writer.write_all(rest.as_bytes())?;
        self.writer.write_all(b"\r\n")
    }

    /// Flush the underlying writer.
    ///
    /// # Errors
    /// Returns an error if flushing fails.
    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

/// Split at the last character boundary at or before `max` bytes, taking at
/// least one character so folding always progresses.
fn split_at_boundary(s: &str, max: usize) -> (&str, &str) {
    let mut cut = max.min(s.len());
    while cut > 0 && !s.is_char_boundary(cut) {
        cut -= 1;
    }
    if cut == 0 {
        cut = s.chars().next().map_or(s.len(), char::len_utf8);
    }
    s.split_at_checked(cut).unwrap_or((s, ""))
}
