// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! TEXT values as defined in RFC 5545 Section 3.3.11.

use chumsky::Parser;
use chumsky::extra::ParserExtra;
use chumsky::input::ValueInput;
use chumsky::prelude::*;

use crate::value::{ValueParseError, ValueType, parse_with};

/// Unescape a single TEXT value.
///
/// Unescaped `,` and `;` are kept literally, producers often forget to
/// escape them in single-valued properties.
pub(crate) fn parse_text(text: &str) -> Result<String, ValueParseError> {
    parse_with(text, ValueType::Text, value_text(false))
}

/// Split a TEXT list on unescaped commas and unescape each item.
pub(crate) fn parse_text_list(text: &str) -> Result<Vec<String>, ValueParseError> {
    parse_with(
        text,
        ValueType::Text,
        value_text(true).separated_by(just(',')).at_least(1).collect(),
    )
}

/// Escape a TEXT value for output, the inverse of [`parse_text`].
#[must_use]
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => out.push_str("\\\\"),
            ';' => out.push_str("\\;"),
            ',' => out.push_str("\\,"),
            '\n' => out.push_str("\\n"),
            '\r' if chars.peek() == Some(&'\n') => {}
            '\r' => out.push_str("\\n"),
            c => out.push(c),
        }
    }
    out
}

/// Format Definition:  This value type is defined by the following notation:
///
/// ```txt
/// text       = *(TSAFE-CHAR / ":" / DQUOTE / ESCAPED-CHAR)
/// ; Folded according to description above
///
/// ESCAPED-CHAR = ("\\" / "\;" / "\," / "\N" / "\n")
/// ; \\ encodes \, \N or \n encodes newline
/// ; \; encodes ;, \, encodes ,
/// ```
fn value_text<'src, I, E>(in_list: bool) -> impl Parser<'src, I, String, E> + Clone
where
    I: ValueInput<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
{
    let plain = any().filter(move |c: &char| *c != '\\' && !(in_list && *c == ','));

    let escape = just('\\').ignore_then(select! {
        ';' => ';',
        ',' => ',',
        'N' | 'n' => '\n',
        '\\' => '\\',
    });

    choice((plain, escape)).repeated().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_text() {
        #[rustfmt::skip]
        let success_cases = [
            // examples from RFC 5545 Section 3.3.11
            (r"Project XYZ Final Review\nConference Room - 3B\nCome Prepared.",
             "Project XYZ Final Review\nConference Room - 3B\nCome Prepared."),
            // extra tests
            (r"a\,b\;c\\d\Ne", "a,b;c\\d\ne"),
            ("a,b;c:d",        "a,b;c:d"),
            ("",               ""),
            ("日本語",          "日本語"),
        ];
        for (src, expected) in success_cases {
            assert_eq!(parse_text(src).unwrap(), expected, "{src}");
        }

        for src in [r"bad\escape", r"trailing\"] {
            let err = parse_text(src).unwrap_err();
            assert_eq!(err.token, src);
            assert_eq!(err.expected, ValueType::Text);
        }
    }

    #[test]
    fn splits_lists_on_unescaped_commas() {
        assert_eq!(
            parse_text_list(r"APPOINTMENT,EDUCATION,a\,b").unwrap(),
            ["APPOINTMENT", "EDUCATION", "a,b"]
        );
        assert_eq!(parse_text_list("single").unwrap(), ["single"]);
        assert_eq!(parse_text_list("a,,b").unwrap(), ["a", "", "b"]);
    }

    #[test]
    fn escapes_text() {
        #[rustfmt::skip]
        let cases = [
            ("a,b;c\\d\ne", r"a\,b\;c\\d\ne"),
            ("line\r\nbreak", r"line\nbreak"),
            ("plain: text", "plain: text"),
        ];
        for (src, expected) in cases {
            assert_eq!(escape_text(src), expected);
        }
        let original = "x,y;z\\w\nv";
        assert_eq!(parse_text(&escape_text(original)).unwrap(), original);
    }
}
