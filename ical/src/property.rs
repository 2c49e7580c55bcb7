// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Properties as defined in RFC 5545 Sections 3.7 and 3.8.
//!
//! A [`Property`] is a name, its parameters in source order and a typed
//! [`Value`]. The value type is chosen from the property definition and the
//! declared `VALUE` parameter, and a zoned date-time carries its zone both in
//! the value and in a `TZID` parameter, which are kept in agreement.

mod kind;

use std::fmt;

pub use kind::PropertyKind;

use crate::keyword::{KW_TZID, KW_VALUE};
use crate::parameter::{self, Parameter};
use crate::parser::{ParseError, ParseOptions};
use crate::syntax::{ContentLine, Span, SyntaxError, lexer, scanner};
use crate::validate::ConsistencyError;
use crate::value::{
    DateTimeKind, Geo, RecurrenceRule, Temporal, Value, ValueDuration, ValueParseError, ValueType,
    ValueUtcOffset, parse_integer, parse_periods, parse_temporal, parse_temporal_list, parse_text,
    parse_text_list,
};

/// Name of a property, either defined by RFC 5545 or an extension.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PropertyName {
    /// A property defined by RFC 5545
    Known(PropertyKind),

    /// An `X-` property, or a non-standard property kept verbatim
    Extension(String),
}

impl PropertyName {
    /// Whether this is the given name, ignoring case.
    #[must_use]
    pub fn is(&self, name: &str) -> bool {
        match self {
            Self::Known(kind) => kind.name().eq_ignore_ascii_case(name),
            Self::Extension(s) => s.eq_ignore_ascii_case(name),
        }
    }

    /// The kind of a known property.
    #[must_use]
    pub const fn kind(&self) -> Option<PropertyKind> {
        match self {
            Self::Known(kind) => Some(*kind),
            Self::Extension(_) => None,
        }
    }
}

impl fmt::Display for PropertyName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Known(kind) => kind.fmt(f),
            Self::Extension(s) => f.write_str(s),
        }
    }
}

impl From<PropertyKind> for PropertyName {
    fn from(kind: PropertyKind) -> Self {
        Self::Known(kind)
    }
}

/// A typed property with its parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    name: PropertyName,
    parameters: Vec<Parameter>,
    value: Value,
}

impl Property {
    /// Create a property and add the parameters the value implies: `VALUE`
    /// when the value is not of the default type and `TZID` for zoned
    /// date-times.
    #[must_use]
    pub fn new(kind: PropertyKind, value: impl Into<Value>) -> Self {
        let value = value.into();
        let mut parameters = Vec::new();

        let structural = value.value_type();
        let declared = match (&value, kind) {
            (Value::Uri(_) | Value::Raw(_), _) => None,
            _ if structural == kind.default_value_type() => None,
            _ if kind.value_types().contains(&structural) => Some(structural),
            _ => None,
        };
        if let Some(declared) = declared {
            parameters.push(Parameter::value_type(declared));
        }
        if let Some(tzid) = value.temporals().into_iter().find_map(Temporal::tzid) {
            parameters.push(Parameter::tzid(tzid));
        }

        Self {
            name: PropertyName::Known(kind),
            parameters,
            value,
        }
    }

    /// An extension property with a verbatim value.
    #[must_use]
    pub fn extension(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: PropertyName::Extension(name.into()),
            parameters: Vec::new(),
            value: Value::Raw(value.into()),
        }
    }

    /// Add a parameter, replacing an existing one of the same name for
    /// `VALUE` and `TZID`.
    ///
    /// # Errors
    ///
    /// [`ConsistencyError::DeclaredValueMismatch`] if a `VALUE` or `TZID`
    /// parameter disagrees with the value.
    pub fn with_parameter(mut self, parameter: Parameter) -> Result<Self, ConsistencyError> {
        let singular = parameter.is(KW_VALUE) || parameter.is(KW_TZID);
        match self.parameters.iter_mut().find(|p| p.is(parameter.name())) {
            Some(existing) if singular => *existing = parameter,
            _ => self.parameters.push(parameter),
        }
        self.check_declared()?;
        Ok(self)
    }

    /// The property name.
    #[must_use]
    pub const fn name(&self) -> &PropertyName {
        &self.name
    }

    /// The kind of a known property.
    #[must_use]
    pub const fn kind(&self) -> Option<PropertyKind> {
        self.name.kind()
    }

    /// Whether this property has the given name, ignoring case.
    #[must_use]
    pub fn is(&self, name: &str) -> bool {
        self.name.is(name)
    }

    /// Parameters in order.
    #[must_use]
    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    /// The first parameter with the given name.
    #[must_use]
    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        parameter::find(&self.parameters, name)
    }

    /// The typed value.
    #[must_use]
    pub const fn value(&self) -> &Value {
        &self.value
    }

    /// Consume the property, returning its value.
    #[must_use]
    pub fn into_value(self) -> Value {
        self.value
    }

    /// Check that the value fits the property and agrees with the declared
    /// `VALUE` and `TZID` parameters.
    ///
    /// # Errors
    ///
    /// [`ConsistencyError::DeclaredValueMismatch`] describing the disagreement.
    pub fn check_declared(&self) -> Result<(), ConsistencyError> {
        let mismatch = |reason: String| ConsistencyError::DeclaredValueMismatch {
            property: self.name.to_string(),
            reason,
        };

        if let Some(kind) = self.kind()
            && !fits(kind.value_types(), &self.value)
        {
            return Err(mismatch(format!(
                "{} value is not allowed",
                self.value.value_type()
            )));
        }

        if let Some(declared) = self.parameter(KW_VALUE).and_then(Parameter::value) {
            let declared = declared
                .parse::<ValueType>()
                .map_err(|_| mismatch(format!("unknown VALUE={declared}")))?;
            if !fits(&[declared], &self.value) {
                return Err(mismatch(format!(
                    "VALUE={declared} declared but value is {}",
                    self.value.value_type()
                )));
            }
        }

        let temporals = self.value.temporals();
        if temporals.is_empty() {
            return Ok(());
        }
        let declared_tzid = self.parameter(KW_TZID).and_then(Parameter::value);
        for t in temporals {
            match (t, declared_tzid) {
                (Temporal::Zoned { tzid, .. }, Some(declared)) if tzid != declared => {
                    return Err(mismatch(format!(
                        "TZID={declared} declared but value is in {tzid}"
                    )));
                }
                (Temporal::Zoned { tzid, .. }, None) => {
                    return Err(mismatch(format!("value in {tzid} without TZID parameter")));
                }
                (Temporal::Date(_) | Temporal::Floating(_) | Temporal::Utc(_), Some(declared)) => {
                    return Err(mismatch(format!(
                        "TZID={declared} declared on a {} value",
                        t.kind()
                    )));
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// The single temporal value, for DTSTART-like properties.
    #[must_use]
    pub fn temporal(&self) -> Option<&Temporal> {
        self.value.as_temporal()
    }

    /// Kind of the temporal values carried, if they all share one.
    pub(crate) fn temporal_kind(&self) -> Option<Result<DateTimeKind, ()>> {
        let mut kinds = self.value.temporals().into_iter().map(Temporal::kind);
        let first = kinds.next()?;
        Some(if kinds.all(|k| k == first) {
            Ok(first)
        } else {
            Err(())
        })
    }

    pub(crate) fn parse(line: &ContentLine, options: &ParseOptions) -> Result<Self, ParseError> {
        let parameters: Vec<Parameter> =
            line.parameters.iter().cloned().map(Parameter::from).collect();

        let Ok(kind) = line.name.parse::<PropertyKind>() else {
            let is_x_name = line.name.len() > 2
                && line.name.get(..2).is_some_and(|p| p.eq_ignore_ascii_case("X-"));
            if !is_x_name && options.reject_unknown_properties {
                return Err(ParseError::UnknownProperty {
                    name: line.name.clone(),
                    span: line.span,
                });
            }
            return Ok(Self {
                name: PropertyName::Extension(line.name.clone()),
                parameters,
                value: Value::Raw(line.value.clone()),
            });
        };

        let value = parse_value(kind, &parameters, &line.value).map_err(|source| {
            ParseError::Value {
                source,
                span: line.span,
            }
        })?;

        let property = Self {
            name: PropertyName::Known(kind),
            parameters,
            value,
        };
        property
            .check_declared()
            .map_err(|source| ParseError::Consistency {
                source,
                span: line.span,
            })?;
        Ok(property)
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        for param in &self.parameters {
            write!(f, ";{param}")?;
        }
        write!(f, ":{}", self.value)
    }
}

/// Whether a value may be written as one of the value types.
fn fits(allowed: &[ValueType], value: &Value) -> bool {
    allowed.iter().any(|ty| match value {
        Value::Text(_) | Value::TextList(_) => *ty == ValueType::Text,
        Value::Integer(_) => *ty == ValueType::Integer,
        Value::Geo(_) => *ty == ValueType::Float,
        Value::Temporal(_) | Value::TemporalList(_) => *ty == value.value_type(),
        Value::Periods(_) => *ty == ValueType::Period,
        Value::Duration(_) => *ty == ValueType::Duration,
        Value::UtcOffset(_) => *ty == ValueType::UtcOffset,
        Value::Recur(_) => *ty == ValueType::Recur,
        Value::Uri(_) => matches!(ty, ValueType::Uri | ValueType::CalAddress),
        Value::Raw(_) => true,
    })
}

fn parse_value(
    kind: PropertyKind,
    parameters: &[Parameter],
    text: &str,
) -> Result<Value, ValueParseError> {
    let declared = match parameter::find(parameters, KW_VALUE).and_then(Parameter::value) {
        Some(name) => {
            let ty = name.parse::<ValueType>().map_err(|_| ValueParseError {
                token: name.to_owned(),
                expected: kind.default_value_type(),
                reason: "unknown VALUE type".to_owned(),
            })?;
            if !kind.value_types().contains(&ty) {
                return Err(ValueParseError {
                    token: text.to_owned(),
                    expected: kind.default_value_type(),
                    reason: format!("VALUE={ty} is not allowed for {kind}"),
                });
            }
            Some(ty)
        }
        None => None,
    };
    let tzid = parameter::find(parameters, KW_TZID).and_then(Parameter::value);
    let ty = declared.unwrap_or(kind.default_value_type());

    Ok(match ty {
        ValueType::Text => match kind {
            PropertyKind::Categories | PropertyKind::Resources => {
                Value::TextList(parse_text_list(text)?)
            }
            PropertyKind::RequestStatus => Value::Raw(text.to_owned()),
            _ => Value::Text(parse_text(text)?),
        },
        ValueType::Integer => Value::Integer(parse_integer(text)?),
        ValueType::Float => Value::Geo(Geo::parse(text)?),
        ValueType::Date | ValueType::DateTime if kind.is_list() => {
            Value::TemporalList(parse_temporal_list(text, tzid, declared)?)
        }
        ValueType::Date | ValueType::DateTime => {
            Value::Temporal(parse_temporal(text, tzid, declared)?)
        }
        ValueType::Period => Value::Periods(parse_periods(text, tzid)?),
        ValueType::Duration => Value::Duration(ValueDuration::parse(text)?),
        ValueType::UtcOffset => Value::UtcOffset(ValueUtcOffset::parse(text)?),
        ValueType::Recur => Value::Recur(RecurrenceRule::parse(text)?),
        ValueType::Uri | ValueType::CalAddress => Value::Uri(text.to_owned()),
        ValueType::Binary | ValueType::Boolean | ValueType::Time => Value::Raw(text.to_owned()),
    })
}

/// Span-less parse of a single content line, for tests and tools.
///
/// # Errors
///
/// If the line is malformed or its value does not parse.
pub fn parse_property(line: &str) -> Result<Property, ParseError> {
    let src = format!("{line}\r\n");
    let lines = scanner::scan_content_lines(&src, lexer::tokenize(&src))?;
    match lines.first() {
        Some(line) => Property::parse(line, &ParseOptions::default()),
        None => Err(SyntaxError::MissingName {
            found: "end of input".to_owned(),
            span: Span::default(),
        }
        .into()),
    }
}

#[cfg(test)]
mod tests {
    use jiff::civil::{date, datetime};

    use super::*;
    use crate::value::PeriodEnd;

    #[test]
    fn parses_typed_values() {
        let prop = parse_property("DTSTART;TZID=America/New_York:19970714T133000").unwrap();
        assert_eq!(prop.kind(), Some(PropertyKind::DtStart));
        assert_eq!(
            prop.temporal(),
            Some(&Temporal::zoned(
                datetime(1997, 7, 14, 13, 30, 0, 0),
                "America/New_York"
            ))
        );

        let prop = parse_property("DTSTART;VALUE=DATE:20151109").unwrap();
        assert_eq!(prop.temporal(), Some(&Temporal::Date(date(2015, 11, 9))));

        let prop = parse_property("CATEGORIES:APPOINTMENT,EDUCATION").unwrap();
        assert_eq!(
            prop.value(),
            &Value::TextList(vec!["APPOINTMENT".to_owned(), "EDUCATION".to_owned()])
        );

        let prop = parse_property("EXDATE:19960402T010000Z,19960403T010000Z").unwrap();
        assert!(matches!(prop.value(), Value::TemporalList(list) if list.len() == 2));

        let prop = parse_property("RDATE;VALUE=PERIOD:19960403T020000Z/PT2H").unwrap();
        let Value::Periods(periods) = prop.value() else {
            panic!("expected periods");
        };
        assert!(matches!(periods.first().map(|p| &p.end), Some(PeriodEnd::Duration(_))));

        let prop = parse_property("ATTENDEE;CN=\"Doe, John\":mailto:john@example.com").unwrap();
        assert_eq!(prop.value(), &Value::Uri("mailto:john@example.com".to_owned()));

        let prop = parse_property("X-WR-CALNAME:Work").unwrap();
        assert_eq!(prop.name(), &PropertyName::Extension("X-WR-CALNAME".to_owned()));
        assert_eq!(prop.value(), &Value::Raw("Work".to_owned()));
    }

    #[test]
    fn rejects_bad_values() {
        let fail_cases = [
            "DTSTART;VALUE=DATE:20151109T100000", // time part under VALUE=DATE
            "DTSTART;VALUE=DURATION:PT1H",        // type not allowed for DTSTART
            "PRIORITY:high",                      // not an integer
            "RRULE:COUNT=3",                      // missing FREQ
            "GEO:1.0",                            // missing longitude
        ];
        for src in fail_cases {
            assert!(
                matches!(parse_property(src), Err(ParseError::Value { .. })),
                "Parse {src} should fail"
            );
        }

        assert!(matches!(
            parse_property("DTSTART;TZID=Europe/Paris:20151109T100000Z"),
            Err(ParseError::Consistency { .. })
        ));
        assert!(matches!(
            parse_property("FOO:bar"),
            Err(ParseError::UnknownProperty { .. })
        ));
    }

    #[test]
    fn implies_parameters() {
        let prop = Property::new(PropertyKind::DtStart, Temporal::Date(date(2015, 11, 9)));
        assert_eq!(prop.to_string(), "DTSTART;VALUE=DATE:20151109");

        let start = Temporal::zoned(datetime(2015, 11, 9, 10, 0, 0, 0), "Europe/Berlin");
        let prop = Property::new(PropertyKind::DtStart, start);
        assert_eq!(prop.to_string(), "DTSTART;TZID=Europe/Berlin:20151109T100000");
        prop.check_declared().unwrap();

        let trigger = Temporal::Utc(datetime(2015, 11, 9, 9, 0, 0, 0));
        let prop = Property::new(PropertyKind::Trigger, trigger);
        assert_eq!(prop.to_string(), "TRIGGER;VALUE=DATE-TIME:20151109T090000Z");
    }

    #[test]
    fn checks_declared_parameters() {
        let prop = Property::new(
            PropertyKind::DtStart,
            Temporal::Utc(datetime(2015, 11, 9, 10, 0, 0, 0)),
        );
        let err = prop
            .clone()
            .with_parameter(Parameter::value_type(ValueType::Date))
            .unwrap_err();
        assert!(matches!(err, ConsistencyError::DeclaredValueMismatch { .. }));

        let prop = prop.with_parameter(Parameter::new("X-NOTE", "kept")).unwrap();
        assert_eq!(prop.parameters().len(), 1);

        let bad = Property::new(PropertyKind::DtStart, Value::Text("tomorrow".to_owned()));
        assert!(bad.check_declared().is_err());
    }
}
