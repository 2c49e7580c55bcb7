// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Lexer for content lines as defined in RFC 5545 Section 3.1.
//!
//! Folded lines are unfolded here: a CRLF followed by a single space or tab is
//! skipped, so tokens on both sides of a fold are adjacent in the stream.

use std::fmt::{self, Display};

use logos::Logos;

use crate::syntax::Span;

/// Tokenize source text, mapping unrecognized input to [`Token::Error`].
pub fn tokenize(src: &str) -> impl Iterator<Item = SpannedToken<'_>> {
    Token::lexer(src).spanned().map(|(tok, span)| match tok {
        Ok(tok) => SpannedToken(tok, span.into()),
        Err(()) => SpannedToken(Token::Error, span.into()),
    })
}

/// Token emitted by the content-line lexer
#[derive(PartialEq, Eq, Clone, Copy, Logos)]
#[logos(skip r#"\r\n[ \t]"#)] // unfold
pub enum Token<'a> {
    /// Double quote (`"`)
    #[token(r#"""#)]
    DQuote,

    /// Comma (`,`)
    #[token(",")]
    Comma,

    /// Colon (`:`)
    #[token(":")]
    Colon,

    /// Semicolon (`;`)
    #[token(";")]
    Semicolon,

    /// Equal sign (`=`)
    #[token("=")]
    Equal,

    /// Runs of printable ASCII punctuation, space and tab
    #[regex(r#"[\t !#$%&'()*+./<>?@\[\\\]\^`\{|\}~]+"#)]
    Symbol(&'a str),

    /// CRLF line terminator
    #[token("\r\n")]
    Newline,

    /// Runs of ASCII letters, digits, `_` and `-`
    #[regex("[0-9A-Za-z_-]+")]
    Word(&'a str),

    /// Runs of non-ASCII UTF-8 text
    #[regex(r#"[^\x00-\x7F]+"#)]
    UnicodeText(&'a str),

    /// Control characters and bare CR or LF
    Error,
}

impl Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DQuote => write!(f, "'\"'"),
            Self::Comma => write!(f, "','"),
            Self::Colon => write!(f, "':'"),
            Self::Semicolon => write!(f, "';'"),
            Self::Equal => write!(f, "'='"),
            Self::Symbol(s) | Self::Word(s) | Self::UnicodeText(s) => write!(f, "{s:?}"),
            Self::Newline => write!(f, "end of line"),
            Self::Error => write!(f, "invalid character"),
        }
    }
}

impl fmt::Debug for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Symbol(s) => write!(f, "Symbol({s})"),
            Self::Word(s) => write!(f, "Word({s})"),
            Self::UnicodeText(s) => write!(f, "UnicodeText({s})"),
            Self::DQuote => write!(f, "DQuote"),
            Self::Comma => write!(f, "Comma"),
            Self::Colon => write!(f, "Colon"),
            Self::Semicolon => write!(f, "Semicolon"),
            Self::Equal => write!(f, "Equal"),
            Self::Newline => write!(f, "Newline"),
            Self::Error => write!(f, "Error"),
        }
    }
}

/// A token with its location in the source text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpannedToken<'src>(pub Token<'src>, pub Span);
