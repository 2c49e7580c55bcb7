// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Property parameters as defined in RFC 5545 Section 3.2.
//!
//! Parameters are kept in source order with their values as written, so a
//! parsed property serializes back to the same parameter list. Only `VALUE`
//! and `TZID` take part in value typing, everything else is carried through.

use std::fmt;
use std::str::FromStr;

use crate::keyword::{
    KW_ALTREP, KW_CN, KW_CUTYPE, KW_DELEGATED_FROM, KW_DELEGATED_TO, KW_DIR, KW_ENCODING,
    KW_FBTYPE, KW_FMTTYPE, KW_LANGUAGE, KW_MEMBER, KW_PARTSTAT, KW_RANGE, KW_RELATED, KW_RELTYPE,
    KW_ROLE, KW_RSVP, KW_SENT_BY, KW_TZID, KW_VALUE,
};
use crate::syntax::RawParameter;

macro_rules! parameter_kind {
    (
        $(#[$attr:meta])*
        enum $ty:ident {
            $(
                $variant:ident => $kw:ident
            ),+ $(,)?
        }
    ) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $(#[$attr])*
        pub enum $ty {
            $(
                $variant,
            )+
        }

        impl $ty {
            /// Returns the name keyword for the parameter type
            #[must_use]
            pub const fn name(self) -> &'static str {
                match self {
                    $(
                        Self::$variant => $kw,
                    )+
                }
            }
        }

        impl FromStr for $ty {
            type Err = ();

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                $(
                    if s.eq_ignore_ascii_case($kw) {
                        return Ok(Self::$variant);
                    }
                )+
                Err(())
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.name().fmt(f)
            }
        }
    };
}

parameter_kind! {
    /// Parameters defined by RFC 5545
    #[expect(missing_docs)]
    enum ParameterKind {
        AlternateText       => KW_ALTREP,
        CommonName          => KW_CN,
        CalendarUserType    => KW_CUTYPE,
        Delegators          => KW_DELEGATED_FROM,
        Delegatees          => KW_DELEGATED_TO,
        Directory           => KW_DIR,
        Encoding            => KW_ENCODING,
        FormatType          => KW_FMTTYPE,
        FreeBusyType        => KW_FBTYPE,
        Language            => KW_LANGUAGE,
        GroupOrListMembership => KW_MEMBER,
        ParticipationStatus => KW_PARTSTAT,
        RecurrenceIdRange   => KW_RANGE,
        AlarmTriggerRelationship => KW_RELATED,
        RelationshipType    => KW_RELTYPE,
        ParticipationRole   => KW_ROLE,
        SendBy              => KW_SENT_BY,
        RsvpExpectation     => KW_RSVP,
        TimeZoneIdentifier  => KW_TZID,
        ValueType           => KW_VALUE,
    }
}

/// A property parameter, e.g. `TZID=America/New_York` or
/// `DELEGATED-TO="mailto:a@example.com","mailto:b@example.com"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    name: String,
    values: Vec<ParameterValue>,
}

/// One value of a parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterValue {
    /// The value without surrounding quotes
    pub value: String,

    /// Whether the value is written quoted
    pub quoted: bool,
}

impl Parameter {
    /// A single-valued parameter. Surrounding double quotes are stripped and
    /// remembered.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: vec![ParameterValue::new(value)],
        }
    }

    /// A parameter with several values.
    #[must_use]
    pub fn with_values<S: Into<String>>(
        name: impl Into<String>,
        values: impl IntoIterator<Item = S>,
    ) -> Self {
        Self {
            name: name.into(),
            values: values.into_iter().map(ParameterValue::new).collect(),
        }
    }

    /// `VALUE=<type>`
    #[must_use]
    pub fn value_type(value_type: crate::value::ValueType) -> Self {
        Self::new(KW_VALUE, value_type.as_ref())
    }

    /// `TZID=<tzid>`
    #[must_use]
    pub fn tzid(tzid: impl Into<String>) -> Self {
        Self::new(KW_TZID, tzid)
    }

    /// Name as written.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The RFC 5545 parameter this is, if any.
    #[must_use]
    pub fn kind(&self) -> Option<ParameterKind> {
        self.name.parse().ok()
    }

    /// Whether this parameter has the given name, ignoring case.
    #[must_use]
    pub fn is(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }

    /// All values in order.
    #[must_use]
    pub fn values(&self) -> &[ParameterValue] {
        &self.values
    }

    /// The first value, which is the only one for most parameters.
    #[must_use]
    pub fn value(&self) -> Option<&str> {
        self.values.first().map(|v| v.value.as_str())
    }
}

impl ParameterValue {
    fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        match value
            .strip_prefix('"')
            .and_then(|rest| rest.strip_suffix('"'))
        {
            Some(inner) => Self {
                value: inner.to_owned(),
                quoted: true,
            },
            None => Self {
                value,
                quoted: false,
            },
        }
    }

    fn needs_quotes(&self) -> bool {
        self.quoted || self.value.contains([':', ';', ','])
    }
}

impl From<RawParameter> for Parameter {
    fn from(raw: RawParameter) -> Self {
        Self {
            name: raw.name,
            values: raw
                .values
                .into_iter()
                .map(|v| ParameterValue {
                    value: v.value,
                    quoted: v.quoted,
                })
                .collect(),
        }
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}=", self.name)?;
        for (i, v) in self.values.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            if v.needs_quotes() {
                write!(f, "\"{}\"", v.value)?;
            } else {
                f.write_str(&v.value)?;
            }
        }
        Ok(())
    }
}

/// Find the first parameter with `name` in a parameter list.
pub(crate) fn find<'a>(parameters: &'a [Parameter], name: &str) -> Option<&'a Parameter> {
    parameters.iter().find(|p| p.is(name))
}
