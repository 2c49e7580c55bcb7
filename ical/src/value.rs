// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Property value types as defined in RFC 5545 Section 3.3.
//!
//! Each value type has a chumsky grammar over `char` input. The grammars are
//! run on the unfolded value text of a content line through [`parse_with`],
//! which turns the first parser error into a [`ValueParseError`].

mod datetime;
mod duration;
mod numeric;
mod period;
mod rrule;
mod text;

use std::borrow::Cow;
use std::fmt;

use chumsky::error::{Rich, RichPattern};
use chumsky::extra;
use chumsky::prelude::*;

pub use datetime::{DateTimeKind, Temporal, ValueUtcOffset};
pub use duration::ValueDuration;
pub use numeric::Geo;
pub use period::{PeriodEnd, ValuePeriod};
pub use rrule::{Frequency, RecurrenceRule, RuleError, WeekdayNum};
pub use text::escape_text;

pub(crate) use datetime::{parse_temporal, parse_temporal_list};
pub(crate) use numeric::parse_integer;
pub(crate) use period::parse_periods;
pub(crate) use text::{parse_text, parse_text_list};

/// Value data types of RFC 5545 Section 3.3, as named by the `VALUE`
/// parameter.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumString, strum::AsRefStr,
)]
#[strum(serialize_all = "SCREAMING-KEBAB-CASE", ascii_case_insensitive)]
#[expect(missing_docs)]
pub enum ValueType {
    Binary,
    Boolean,
    CalAddress,
    Date,
    DateTime,
    Duration,
    Float,
    Integer,
    Period,
    Recur,
    Text,
    Time,
    Uri,
    UtcOffset,
}

/// A value that does not match the grammar of its expected type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {expected} value {token:?}: {reason}")]
pub struct ValueParseError {
    /// The offending value text
    pub token: String,

    /// The value type that was expected
    pub expected: ValueType,

    /// Parser diagnostic
    pub reason: String,
}

/// Labels for semantic checks inside value grammars.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ValueExpected {
    /// A date value was expected
    Date,
    /// A valid time of day was expected
    Time,
    /// A 64-bit floating-point value was expected
    F64,
    /// A 32-bit signed integer value was expected
    I32,
    /// A 32-bit unsigned integer value was expected
    U32,
    /// An integer fitting the rule part was expected
    Integer,
    /// A rule part occurred twice
    RRuleDuplicatePart,
    /// The FREQ rule part is missing
    RRuleRequiredFreq,
}

impl From<ValueExpected> for RichPattern<'_, char> {
    fn from(expected: ValueExpected) -> Self {
        match expected {
            ValueExpected::Date => Self::Label(Cow::Borrowed("valid date")),
            ValueExpected::Time => Self::Label(Cow::Borrowed("valid time")),
            ValueExpected::F64 => Self::Label(Cow::Borrowed("f64 in range")),
            ValueExpected::I32 => Self::Label(Cow::Borrowed("i32 in range")),
            ValueExpected::U32 => Self::Label(Cow::Borrowed("u32 in range")),
            ValueExpected::Integer => Self::Label(Cow::Borrowed("integer in range")),
            ValueExpected::RRuleDuplicatePart => {
                Self::Label(Cow::Borrowed("rule parts MUST NOT occur more than once"))
            }
            ValueExpected::RRuleRequiredFreq => {
                Self::Label(Cow::Borrowed("the FREQ rule part is REQUIRED"))
            }
        }
    }
}

/// Run a value grammar over the whole of `text`.
pub(crate) fn parse_with<'src, T>(
    text: &'src str,
    expected: ValueType,
    parser: impl Parser<'src, &'src str, T, extra::Err<Rich<'src, char>>>,
) -> Result<T, ValueParseError> {
    parser.parse(text).into_result().map_err(|errs| ValueParseError {
        token: text.to_owned(),
        expected,
        reason: errs
            .first()
            .map_or_else(|| "malformed value".to_owned(), ToString::to_string),
    })
}

/// A typed property value.
///
/// The variant is chosen by the property definition and the `VALUE`
/// parameter; [`Display`](fmt::Display) writes the escaped wire form.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A single TEXT value
    Text(String),

    /// A comma separated TEXT list, e.g. CATEGORIES
    TextList(Vec<String>),

    /// INTEGER
    Integer(i32),

    /// Latitude and longitude of GEO
    Geo(Geo),

    /// A single DATE or DATE-TIME
    Temporal(Temporal),

    /// A list of DATE or DATE-TIME values, e.g. EXDATE
    TemporalList(Vec<Temporal>),

    /// A list of PERIOD values, e.g. FREEBUSY
    Periods(Vec<ValuePeriod>),

    /// DURATION
    Duration(ValueDuration),

    /// UTC-OFFSET
    UtcOffset(ValueUtcOffset),

    /// RECUR
    Recur(RecurrenceRule),

    /// URI or CAL-ADDRESS, written verbatim
    Uri(String),

    /// Unparsed value of an extension property or a non-modelled type,
    /// written verbatim
    Raw(String),
}

impl Value {
    /// The value type this value serializes as.
    #[must_use]
    pub fn value_type(&self) -> ValueType {
        match self {
            Self::Text(_) | Self::TextList(_) | Self::Raw(_) => ValueType::Text,
            Self::Integer(_) => ValueType::Integer,
            Self::Geo(_) => ValueType::Float,
            Self::Temporal(t) => temporal_type(t),
            Self::TemporalList(list) => list.first().map_or(ValueType::DateTime, temporal_type),
            Self::Periods(_) => ValueType::Period,
            Self::Duration(_) => ValueType::Duration,
            Self::UtcOffset(_) => ValueType::UtcOffset,
            Self::Recur(_) => ValueType::Recur,
            Self::Uri(_) => ValueType::Uri,
        }
    }

    /// Every temporal value carried, including period starts.
    #[must_use]
    pub fn temporals(&self) -> Vec<&Temporal> {
        match self {
            Self::Temporal(t) => vec![t],
            Self::TemporalList(list) => list.iter().collect(),
            Self::Periods(periods) => periods.iter().map(|p| &p.start).collect(),
            _ => Vec::new(),
        }
    }

    /// The value as a single temporal.
    #[must_use]
    pub const fn as_temporal(&self) -> Option<&Temporal> {
        match self {
            Self::Temporal(t) => Some(t),
            _ => None,
        }
    }

    /// The value as plain text, for TEXT, URI and raw values.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) | Self::Uri(s) | Self::Raw(s) => Some(s),
            _ => None,
        }
    }
}

fn temporal_type(t: &Temporal) -> ValueType {
    match t.kind() {
        DateTimeKind::Date => ValueType::Date,
        _ => ValueType::DateTime,
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(&escape_text(s)),
            Self::TextList(list) => write_joined(f, list.iter().map(|s| escape_text(s))),
            Self::Integer(v) => write!(f, "{v}"),
            Self::Geo(geo) => write!(f, "{geo}"),
            Self::Temporal(t) => write!(f, "{t}"),
            Self::TemporalList(list) => write_joined(f, list),
            Self::Periods(periods) => write_joined(f, periods),
            Self::Duration(d) => write!(f, "{d}"),
            Self::UtcOffset(o) => write!(f, "{o}"),
            Self::Recur(r) => write!(f, "{r}"),
            Self::Uri(s) | Self::Raw(s) => f.write_str(s),
        }
    }
}

fn write_joined<T: fmt::Display>(
    f: &mut fmt::Formatter<'_>,
    items: impl IntoIterator<Item = T>,
) -> fmt::Result {
    for (i, item) in items.into_iter().enumerate() {
        if i > 0 {
            f.write_str(",")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

impl From<Temporal> for Value {
    fn from(value: Temporal) -> Self {
        Self::Temporal(value)
    }
}

impl From<RecurrenceRule> for Value {
    fn from(value: RecurrenceRule) -> Self {
        Self::Recur(value)
    }
}

impl From<ValueDuration> for Value {
    fn from(value: ValueDuration) -> Self {
        Self::Duration(value)
    }
}
