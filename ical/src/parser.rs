// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use crate::component::{Component, ComponentKind};
use crate::property::Property;
use crate::syntax::{RawComponent, Span, SyntaxError, syntax_analysis};
use crate::validate::ConsistencyError;
use crate::value::ValueParseError;

/// Parse an iCalendar stream into its `VCALENDAR` objects.
///
/// Every property goes through the same checks as
/// [`Component::add_property`], so the result holds no hard invariant
/// violation. Parsing stops at the first error and returns nothing else.
///
/// ## Errors
///
/// The first [`ParseError`] found, carrying the span of the offending line.
///
/// ## Examples
///
/// Parsing valid iCalendar source will return the root components
///
/// ```
/// # use agendum_ical::parse;
/// let src = "\
/// BEGIN:VCALENDAR\r\n\
/// PRODID:-//Example//EN\r\n\
/// VERSION:2.0\r\n\
/// BEGIN:VEVENT\r\n\
/// SUMMARY:Test Event\r\n\
/// END:VEVENT\r\n\
/// END:VCALENDAR\r\n\
/// ";
/// let calendars = parse(src).unwrap();
/// assert_eq!(calendars[0].children().len(), 1);
/// ```
///
/// Invalid source yields an error pointing at the offending line, ready to
/// be rendered as a report
///
/// ```
/// # use agendum_ical::{ParseError, parse};
/// use ariadne::{Color, Label, Report, ReportKind, Source};
/// let src = "\
/// BEGIN:VCALENDAR\r\n\
/// BEGIN:VEVENT\r\n\
/// END:VCALENDAR\r\n\
/// END:VEVENT\r\n\
/// ";
/// let err = parse(src).unwrap_err();
/// assert!(matches!(err, ParseError::UnbalancedComponent { .. }));
/// Report::build(ReportKind::Error, err.span().range())
///     .with_config(ariadne::Config::new().with_index_type(ariadne::IndexType::Byte))
///     .with_message(err.to_string())
///     .with_label(Label::new(err.span().range()).with_color(Color::Red))
///     .finish()
///     .eprint(Source::from(src))
///     .unwrap();
/// ```
pub fn parse(src: &str) -> Result<Vec<Component>, ParseError> {
    parse_with_options(src, &ParseOptions::default())
}

/// [`parse`] with explicit options.
///
/// # Errors
///
/// See [`parse`].
pub fn parse_with_options(src: &str, options: &ParseOptions) -> Result<Vec<Component>, ParseError> {
    let roots = syntax_analysis(src)?;
    let calendars = roots
        .into_iter()
        .map(|root| {
            let kind = component_kind(&root)?;
            if kind != ComponentKind::VCalendar {
                return Err(ParseError::NoCalendar {
                    found: root.name,
                    span: root.span,
                });
            }
            build_component(root, options)
        })
        .collect::<Result<Vec<_>, _>>()?;
    tracing::debug!(calendars = calendars.len(), "parsed iCalendar stream");
    Ok(calendars)
}

/// Options for [`parse_with_options`].
#[derive(Debug, Clone, Copy)]
pub struct ParseOptions {
    /// Fail on properties that are neither standard nor `X-` prefixed,
    /// instead of keeping them as extension properties.
    ///
    /// Default: `true`.
    pub reject_unknown_properties: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            reject_unknown_properties: true,
        }
    }
}

impl ParseOptions {
    /// Set [`reject_unknown_properties`](Self::reject_unknown_properties).
    #[must_use]
    pub const fn reject_unknown_properties(mut self, reject: bool) -> Self {
        self.reject_unknown_properties = reject;
        self
    }
}

fn component_kind(raw: &RawComponent) -> Result<ComponentKind, ParseError> {
    raw.name
        .parse()
        .map_err(|_| ParseError::UnknownComponent {
            name: raw.name.clone(),
            span: raw.span,
        })
}

fn build_component(raw: RawComponent, options: &ParseOptions) -> Result<Component, ParseError> {
    let mut component = Component::new(component_kind(&raw)?);
    for line in &raw.properties {
        let property = Property::parse(line, options)?;
        component
            .add_property(property)
            .map_err(|source| ParseError::Consistency {
                source,
                span: line.span,
            })?;
    }
    for child in raw.children {
        let span = child.span;
        let child = build_component(child, options)?;
        component
            .add_child(child)
            .map_err(|source| ParseError::Consistency { source, span })?;
    }
    Ok(component)
}

/// Errors that can occur during parsing
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// A malformed content line.
    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    /// `BEGIN` and `END` do not pair up.
    #[error("{}", unbalanced_message(.expected.as_deref(), .found.as_deref()))]
    UnbalancedComponent {
        /// The block waiting to be closed, if any
        expected: Option<String>,
        /// The `END` found, if any
        found: Option<String>,
        /// The offending line, or the unclosed block
        span: Span,
    },

    /// A property line outside of any block.
    #[error("property {name} outside of any component")]
    UnexpectedProperty {
        /// Property name
        name: String,
        /// The offending line
        span: Span,
    },

    /// A `BEGIN` with a name outside the supported component kinds.
    #[error("unknown component {name}")]
    UnknownComponent {
        /// Component name
        name: String,
        /// The block
        span: Span,
    },

    /// A property name neither standard nor `X-` prefixed.
    #[error("unknown property {name}")]
    UnknownProperty {
        /// Property name
        name: String,
        /// The offending line
        span: Span,
    },

    /// A value that does not match its value type.
    #[error("{source}")]
    Value {
        /// What is wrong with the value
        source: ValueParseError,
        /// The offending line
        span: Span,
    },

    /// A property or child breaking a hard invariant.
    #[error("{source}")]
    Consistency {
        /// The invariant broken
        source: ConsistencyError,
        /// The offending line or block
        span: Span,
    },

    /// A top-level block other than `VCALENDAR`.
    #[error("expected VCALENDAR, found {found}")]
    NoCalendar {
        /// Name of the block found
        found: String,
        /// The block
        span: Span,
    },
}

impl ParseError {
    /// Byte span of the offending source.
    #[must_use]
    pub const fn span(&self) -> Span {
        match self {
            Self::Syntax(e) => e.span(),
            Self::UnbalancedComponent { span, .. }
            | Self::UnexpectedProperty { span, .. }
            | Self::UnknownComponent { span, .. }
            | Self::UnknownProperty { span, .. }
            | Self::Value { span, .. }
            | Self::Consistency { span, .. }
            | Self::NoCalendar { span, .. } => *span,
        }
    }
}

fn unbalanced_message(expected: Option<&str>, found: Option<&str>) -> String {
    match (expected, found) {
        (Some(expected), Some(found)) => format!("expected END:{expected}, found END:{found}"),
        (Some(expected), None) => format!("BEGIN:{expected} is never closed"),
        (None, Some(found)) => format!("END:{found} without BEGIN"),
        (None, None) => "unbalanced component".to_string(),
    }
}

#[cfg(test)]
mod tests {
    #![expect(clippy::indexing_slicing)]

    use super::*;
    use crate::keyword::{KW_DTSTART, KW_SUMMARY};

    const CALENDAR: &str = "\
BEGIN:VCALENDAR\r\n\
PRODID:-//Example//EN\r\n\
VERSION:2.0\r\n\
X-WR-CALNAME:Team\r\n\
BEGIN:VEVENT\r\n\
UID:1@example.com\r\n\
DTSTAMP:20151101T000000Z\r\n\
DTSTART;VALUE=DATE:20151109\r\n\
RRULE:FREQ=DAILY;COUNT=6\r\n\
SUMMARY:Stand-up\\, daily\r\n\
BEGIN:VALARM\r\n\
ACTION:DISPLAY\r\n\
DESCRIPTION:Reminder\r\n\
TRIGGER:-PT15M\r\n\
END:VALARM\r\n\
END:VEVENT\r\n\
END:VCALENDAR\r\n\
";

    #[test]
    fn parses_calendar() {
        let calendars = parse(CALENDAR).unwrap();
        assert_eq!(calendars.len(), 1);
        let calendar = &calendars[0];
        assert_eq!(calendar.kind(), ComponentKind::VCalendar);
        assert_eq!(calendar.properties().len(), 3);
        assert!(calendar.errors().is_empty(), "{:?}", calendar.errors());

        let event = &calendar.children()[0];
        assert_eq!(event.kind(), ComponentKind::VEvent);
        assert_eq!(
            event.get_one(KW_SUMMARY).and_then(|p| p.value().as_text()),
            Some("Stand-up, daily")
        );
        assert!(event.temporal(KW_DTSTART).is_some());
        assert_eq!(event.children()[0].kind(), ComponentKind::VAlarm);
    }

    #[rustfmt::skip]
    #[test]
    fn rejects_invalid_streams() {
        let fail_cases: &[(&str, fn(&ParseError) -> bool)] = &[
            ("BEGIN:VCALENDAR\r\nBEGIN:VEVENT\r\nEND:VCALENDAR\r\n",
                |e| matches!(e, ParseError::UnbalancedComponent { .. })),
            ("BEGIN:VCALENDAR\r\nBEGIN:VMEETING\r\nEND:VMEETING\r\nEND:VCALENDAR\r\n",
                |e| matches!(e, ParseError::UnknownComponent { .. })),
            ("BEGIN:VCALENDAR\r\nFOO:bar\r\nEND:VCALENDAR\r\n",
                |e| matches!(e, ParseError::UnknownProperty { .. })),
            ("BEGIN:VEVENT\r\nEND:VEVENT\r\n",
                |e| matches!(e, ParseError::NoCalendar { .. })),
            ("BEGIN:VCALENDAR\r\nBEGIN:VEVENT\r\nDTSTART:2015\r\nEND:VEVENT\r\nEND:VCALENDAR\r\n",
                |e| matches!(e, ParseError::Value { .. })),
            ("BEGIN:VCALENDAR\r\nBEGIN:VEVENT\r\nDTSTART:20151109T100000\r\nDTEND;VALUE=DATE:20151110\r\nEND:VEVENT\r\nEND:VCALENDAR\r\n",
                |e| matches!(e, ParseError::Consistency { .. })),
            ("BEGIN:VCALENDAR\r\nBEGIN:VALARM\r\nEND:VALARM\r\nEND:VCALENDAR\r\n",
                |e| matches!(e, ParseError::Consistency { source: ConsistencyError::ChildNotAllowed { .. }, .. })),
        ];
        for (src, check) in fail_cases {
            let err = parse(src).unwrap_err();
            assert!(check(&err), "unexpected error for {src:?}: {err:?}");
        }
    }

    #[test]
    fn keeps_unknown_properties_when_asked() {
        let src = "BEGIN:VCALENDAR\r\nFOO;A=b:bar\r\nEND:VCALENDAR\r\n";
        let options = ParseOptions::default().reject_unknown_properties(false);
        let calendars = parse_with_options(src, &options).unwrap();
        assert_eq!(calendars[0].properties()[0].to_string(), "FOO;A=b:bar");
    }

    #[test]
    fn error_spans_point_at_line() {
        let src = "BEGIN:VCALENDAR\r\nFOO:bar\r\nEND:VCALENDAR\r\n";
        let err = parse(src).unwrap_err();
        assert_eq!(&src[err.span().range()], "FOO:bar");
    }
}
