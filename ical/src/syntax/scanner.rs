// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Scanner turning a token stream into content lines.
//!
//! Per RFC 5545 Section 3.1:
//!
//! ```text
//! contentline   = name *(";" param ) ":" value CRLF
//! param         = param-name "=" param-value *("," param-value)
//! param-value   = paramtext / quoted-string
//! quoted-string = DQUOTE *QSAFE-CHAR DQUOTE
//! ```

use std::iter::Peekable;

use crate::syntax::Span;
use crate::syntax::lexer::{SpannedToken, Token};

/// A logical (unfolded) content line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentLine {
    /// Property name, original casing preserved
    pub name: String,

    /// Parameters in source order
    pub parameters: Vec<RawParameter>,

    /// Raw value text, still escaped
    pub value: String,

    /// Span of the whole line
    pub span: Span,
}

/// A parameter as written in the source, e.g. `TZID=America/New_York`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawParameter {
    /// Parameter name
    pub name: String,

    /// Comma separated values
    pub values: Vec<RawParameterValue>,

    /// Span from the name to the last value
    pub span: Span,
}

/// One parameter value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawParameterValue {
    /// The value without surrounding quotes
    pub value: String,

    /// Whether the value was quoted in the source
    pub quoted: bool,
}

/// Malformed content line.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SyntaxError {
    /// The line does not start with a property name.
    #[error("expected property name, found {found}")]
    MissingName {
        /// What was found instead
        found: String,
        /// Where the name was expected
        span: Span,
    },

    /// No `:` between the name/parameters and the value.
    #[error("expected ':' after property name, found {found}")]
    MissingColon {
        /// What was found instead
        found: String,
        /// Where the colon was expected
        span: Span,
    },

    /// Parameter without `=`, without a name, or with an unterminated quote.
    #[error("invalid parameter: {reason}")]
    InvalidParameter {
        /// What went wrong
        reason: &'static str,
        /// Span of the offending parameter
        span: Span,
    },

    /// Control character or bare CR/LF.
    #[error("invalid character in content line")]
    InvalidCharacter {
        /// Span of the character
        span: Span,
    },
}

impl SyntaxError {
    /// Source location of the error.
    #[must_use]
    pub const fn span(&self) -> Span {
        match self {
            Self::MissingName { span, .. }
            | Self::MissingColon { span, .. }
            | Self::InvalidParameter { span, .. }
            | Self::InvalidCharacter { span } => *span,
        }
    }
}

/// Scan a token stream into content lines. Empty lines are skipped.
///
/// # Errors
///
/// Returns the first malformed line.
pub fn scan_content_lines<'src>(
    src: &'src str,
    tokens: impl IntoIterator<Item = SpannedToken<'src>>,
) -> Result<Vec<ContentLine>, SyntaxError> {
    let mut scanner = Scanner {
        src,
        tokens: tokens.into_iter().peekable(),
    };

    let mut lines = Vec::new();
    while let Some(&SpannedToken(token, _)) = scanner.tokens.peek() {
        if token == Token::Newline {
            scanner.tokens.next();
            continue;
        }
        lines.push(scanner.content_line()?);
    }
    Ok(lines)
}

struct Scanner<'src, I: Iterator<Item = SpannedToken<'src>>> {
    src: &'src str,
    tokens: Peekable<I>,
}

impl<'src, I: Iterator<Item = SpannedToken<'src>>> Scanner<'src, I> {
    fn content_line(&mut self) -> Result<ContentLine, SyntaxError> {
        let (name, name_span) = self.name();
        if name.is_empty() {
            let (found, span) = self.describe_next(name_span);
            return Err(SyntaxError::MissingName { found, span });
        }

        let mut parameters = Vec::new();
        while let Some(&SpannedToken(Token::Semicolon, _)) = self.tokens.peek() {
            self.tokens.next();
            parameters.push(self.parameter()?);
        }

        match self.tokens.next() {
            Some(SpannedToken(Token::Colon, _)) => {}
            Some(SpannedToken(token, span)) => {
                return Err(SyntaxError::MissingColon {
                    found: token.to_string(),
                    span,
                });
            }
            None => {
                return Err(SyntaxError::MissingColon {
                    found: "end of input".to_owned(),
                    span: Span::new(self.src.len(), self.src.len()),
                });
            }
        }

        let mut value = String::new();
        let mut end = name_span.end;
        while let Some(SpannedToken(token, span)) = self.tokens.next() {
            match token {
                Token::Newline => break,
                Token::Error => return Err(SyntaxError::InvalidCharacter { span }),
                _ => {
                    end = span.end;
                    value.push_str(self.slice(span));
                }
            }
        }

        Ok(ContentLine {
            name,
            parameters,
            value,
            span: Span::new(name_span.start, end),
        })
    }

    /// Consecutive words form one name, a fold may split a name into two words.
    fn name(&mut self) -> (String, Span) {
        let mut name = String::new();
        let mut span: Option<Span> = None;
        while let Some(&SpannedToken(Token::Word(word), word_span)) = self.tokens.peek() {
            name.push_str(word);
            span = Some(span.map_or(word_span, |s| s.merge(word_span)));
            self.tokens.next();
        }
        let span = span.unwrap_or_else(|| {
            self.tokens
                .peek()
                .map_or(Span::new(self.src.len(), self.src.len()), |t| t.1)
        });
        (name, span)
    }

    fn parameter(&mut self) -> Result<RawParameter, SyntaxError> {
        let (name, name_span) = self.name();
        if name.is_empty() {
            return Err(SyntaxError::InvalidParameter {
                reason: "empty parameter name",
                span: name_span,
            });
        }

        match self.tokens.next() {
            Some(SpannedToken(Token::Equal, _)) => {}
            _ => {
                return Err(SyntaxError::InvalidParameter {
                    reason: "missing '=' after parameter name",
                    span: name_span,
                });
            }
        }

        let mut values = Vec::new();
        let mut span = name_span;
        loop {
            let (value, value_span) = self.parameter_value(name_span)?;
            span = span.merge(value_span);
            values.push(value);

            match self.tokens.peek() {
                Some(&SpannedToken(Token::Comma, _)) => {
                    self.tokens.next();
                }
                _ => break,
            }
        }

        Ok(RawParameter { name, values, span })
    }

    fn parameter_value(&mut self, at: Span) -> Result<(RawParameterValue, Span), SyntaxError> {
        let mut span = at;
        let quoted = matches!(self.tokens.peek(), Some(&SpannedToken(Token::DQuote, _)));
        if quoted {
            self.tokens.next();
        }

        let mut value = String::new();
        loop {
            match self.tokens.peek() {
                Some(&SpannedToken(Token::DQuote, s)) if quoted => {
                    self.tokens.next();
                    span = span.merge(s);
                    break;
                }
                Some(&SpannedToken(Token::DQuote, s)) => {
                    return Err(SyntaxError::InvalidParameter {
                        reason: "unexpected quote in parameter value",
                        span: s,
                    });
                }
                Some(&SpannedToken(Token::Newline, s)) | Some(&SpannedToken(Token::Error, s))
                    if quoted =>
                {
                    return Err(SyntaxError::InvalidParameter {
                        reason: "unterminated quoted string",
                        span: span.merge(s),
                    });
                }
                None if quoted => {
                    return Err(SyntaxError::InvalidParameter {
                        reason: "unterminated quoted string",
                        span,
                    });
                }
                Some(&SpannedToken(Token::Error, s)) => {
                    return Err(SyntaxError::InvalidCharacter { span: s });
                }
                Some(&SpannedToken(
                    Token::Semicolon | Token::Colon | Token::Comma | Token::Newline,
                    _,
                )) if !quoted => break,
                Some(&SpannedToken(_, s)) => {
                    value.push_str(self.slice(s));
                    span = span.merge(s);
                    self.tokens.next();
                }
                None => break,
            }
        }

        Ok((RawParameterValue { value, quoted }, span))
    }

    fn describe_next(&mut self, fallback: Span) -> (String, Span) {
        match self.tokens.peek() {
            Some(&SpannedToken(token, span)) => (token.to_string(), span),
            None => ("end of input".to_owned(), fallback),
        }
    }

    fn slice(&self, span: Span) -> &'src str {
        self.src.get(span.range()).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::lexer::tokenize;

    fn scan(src: &str) -> Result<Vec<ContentLine>, SyntaxError> {
        scan_content_lines(src, tokenize(src))
    }

    #[test]
    fn scans_name_parameters_and_value() {
        let lines = scan("DTSTART;TZID=America/New_York:20250101T090000\r\n").unwrap();
        assert_eq!(lines.len(), 1);
        let line = &lines[0];
        assert_eq!(line.name, "DTSTART");
        assert_eq!(line.value, "20250101T090000");
        assert_eq!(line.parameters.len(), 1);
        assert_eq!(line.parameters[0].name, "TZID");
        assert_eq!(line.parameters[0].values[0].value, "America/New_York");
        assert!(!line.parameters[0].values[0].quoted);
    }

    #[test]
    fn scans_quoted_and_multi_valued_parameters() {
        let src = "ATTENDEE;DELEGATED-TO=\"mailto:a@x.org\",\"mailto:b@x.org\";CN=\"Doe; John\":mailto:j@x.org\r\n";
        let lines = scan(src).unwrap();
        let line = &lines[0];
        assert_eq!(line.value, "mailto:j@x.org");
        let delegated = &line.parameters[0];
        assert_eq!(delegated.values.len(), 2);
        assert_eq!(delegated.values[1].value, "mailto:b@x.org");
        assert!(delegated.values[1].quoted);
        assert_eq!(line.parameters[1].values[0].value, "Doe; John");
    }

    #[test]
    fn unfolds_value_and_keeps_separators() {
        let src = "DESCRIPTION:a\\, b;c:d\r\n  e\r\n";
        let lines = scan(src).unwrap();
        assert_eq!(lines[0].value, "a\\, b;c:d e");
    }

    #[test]
    fn unfolds_inside_multibyte_runs() {
        let src = "SUMMARY:日本\r\n 語\r\n";
        let lines = scan(src).unwrap();
        assert_eq!(lines[0].value, "日本語");
    }

    #[test]
    fn accepts_missing_final_newline_and_blank_lines() {
        let lines = scan("A:1\r\n\r\nB:2").unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1].value, "2");
    }

    #[test]
    fn rejects_malformed_lines() {
        let fail_cases = [
            ":value\r\n",            // missing name
            "NAME value\r\n",        // missing colon
            "NAME\r\n",              // missing colon
            "NAME;=x:v\r\n",         // empty parameter name
            "NAME;P:v\r\n",          // missing equals
            "NAME;P=\"open:v\r\n",   // unterminated quote
            "NAME:a\u{1}b\r\n",      // control character
        ];
        for src in fail_cases {
            assert!(scan(src).is_err(), "scan {src:?} should fail");
        }
    }

    #[test]
    fn reports_error_span() {
        let err = scan("A:1\r\nNAME value\r\n").unwrap_err();
        assert!(matches!(err, SyntaxError::MissingColon { .. }));
        assert_eq!(err.span().start, 9);
    }
}
