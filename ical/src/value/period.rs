// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! PERIOD values as defined in RFC 5545 Section 3.3.9.

use std::fmt;

use chumsky::Parser;
use chumsky::prelude::*;

use crate::value::datetime::{Temporal, value_date, value_time};
use crate::value::duration::{ValueDuration, value_duration};
use crate::value::{ValueParseError, ValueType, parse_with};

/// A precise period of time, either explicit or with a duration.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ValuePeriod {
    /// Start of the period
    pub start: Temporal,
    /// End of the period
    pub end: PeriodEnd,
}

/// The second half of a PERIOD value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PeriodEnd {
    /// `period-explicit`, the end has the same kind as the start
    End(Temporal),
    /// `period-start`, a positive duration
    Duration(ValueDuration),
}

impl fmt::Display for ValuePeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.end {
            PeriodEnd::End(end) => write!(f, "{}/{end}", self.start),
            PeriodEnd::Duration(duration) => write!(f, "{}/{duration}", self.start),
        }
    }
}

/// Parse a comma separated list of PERIOD values.
///
/// ```txt
/// period     = period-explicit / period-start
/// period-explicit = date-time "/" date-time
/// period-start = date-time "/" dur-value
/// ```
pub(crate) fn parse_periods(
    text: &str,
    tzid: Option<&str>,
) -> Result<Vec<ValuePeriod>, ValueParseError> {
    let date_time = || {
        value_date()
            .then_ignore(just('T'))
            .then(value_time())
            .map(|(date, (time, utc))| (date.to_datetime(time), utc))
    };

    let period = date_time()
        .then_ignore(just('/'))
        .then(choice((value_duration().map(Err), date_time().map(Ok))));

    let raw = parse_with(
        text,
        ValueType::Period,
        period.separated_by(just(',')).at_least(1).collect::<Vec<_>>(),
    )?;

    let make = |(datetime, utc): (jiff::civil::DateTime, bool)| match (utc, tzid) {
        (true, _) => Temporal::Utc(datetime),
        (false, Some(tzid)) => Temporal::zoned(datetime, tzid),
        (false, None) => Temporal::Floating(datetime),
    };

    raw.into_iter()
        .map(|(start, end)| {
            let start = make(start);
            let end = match end {
                Ok(end) => {
                    let end = make(end);
                    if end.kind() != start.kind() {
                        return Err(ValueParseError {
                            token: text.to_owned(),
                            expected: ValueType::Period,
                            reason: "period date-times must have consistent timezone".to_owned(),
                        });
                    }
                    PeriodEnd::End(end)
                }
                Err(duration) if duration.is_positive() => PeriodEnd::Duration(duration),
                Err(_) => {
                    return Err(ValueParseError {
                        token: text.to_owned(),
                        expected: ValueType::Period,
                        reason: "period duration must be positive".to_owned(),
                    });
                }
            };
            Ok(ValuePeriod { start, end })
        })
        .collect()
}
