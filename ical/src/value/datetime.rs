// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! DATE, DATE-TIME and UTC-OFFSET values as defined in RFC 5545 Sections
//! 3.3.4, 3.3.5, 3.3.12 and 3.3.14.

use std::cmp::Ordering;
use std::fmt;

use chumsky::Parser;
use chumsky::extra::ParserExtra;
use chumsky::label::LabelError;
use chumsky::prelude::*;
use jiff::civil::{Date, DateTime, Time};
use jiff::tz::TimeZone;
use jiff::{Timestamp, Zoned};

use crate::value::{ValueExpected, ValueParseError, ValueType, parse_with};

/// Structural category of a temporal value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, strum::Display)]
pub enum DateTimeKind {
    /// A bare calendar date
    #[strum(to_string = "DATE")]
    Date,

    /// A date-time without zone, local to whoever reads it
    #[strum(to_string = "floating DATE-TIME")]
    Floating,

    /// A date-time bound to an IANA zone through `TZID`
    #[strum(to_string = "zoned DATE-TIME")]
    Zoned,

    /// A date-time fixed to UTC with a trailing `Z`
    #[strum(to_string = "UTC DATE-TIME")]
    Utc,
}

/// A DATE or DATE-TIME value, tagged with its [`DateTimeKind`].
///
/// Values of the same kind are ordered chronologically. Zoned values are
/// compared by instant when their zone is known to the time zone database and
/// by wall clock otherwise. Values of different kinds are ordered by kind
/// first, callers comparing across kinds should [`coerce`](Self::coerce_like)
/// them first.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Temporal {
    /// `VALUE=DATE`
    Date(Date),

    /// Date-time without zone
    Floating(DateTime),

    /// Date-time with a `TZID` parameter
    Zoned {
        /// Wall clock time in the zone
        datetime: DateTime,
        /// IANA zone identifier
        tzid: String,
    },

    /// Date-time with a trailing `Z`
    Utc(DateTime),
}

impl Temporal {
    /// A bare date.
    ///
    /// # Errors
    ///
    /// If the date does not exist.
    pub fn date(year: i16, month: i8, day: i8) -> Result<Self, jiff::Error> {
        Date::new(year, month, day).map(Self::Date)
    }

    /// A floating date-time.
    #[must_use]
    pub const fn floating(datetime: DateTime) -> Self {
        Self::Floating(datetime)
    }

    /// A UTC date-time.
    #[must_use]
    pub const fn utc(datetime: DateTime) -> Self {
        Self::Utc(datetime)
    }

    /// A date-time in the named zone.
    #[must_use]
    pub fn zoned(datetime: DateTime, tzid: impl Into<String>) -> Self {
        Self::Zoned {
            datetime,
            tzid: tzid.into(),
        }
    }

    /// The current instant, as a UTC date-time truncated to seconds.
    #[must_use]
    pub fn now_utc() -> Self {
        let now = Timestamp::now().to_zoned(TimeZone::UTC).datetime();
        Self::Utc(now.with().subsec_nanosecond(0).build().unwrap_or(now))
    }

    /// The structural kind of this value.
    #[must_use]
    pub const fn kind(&self) -> DateTimeKind {
        match self {
            Self::Date(_) => DateTimeKind::Date,
            Self::Floating(_) => DateTimeKind::Floating,
            Self::Zoned { .. } => DateTimeKind::Zoned,
            Self::Utc(_) => DateTimeKind::Utc,
        }
    }

    /// The zone identifier of a zoned value.
    #[must_use]
    pub fn tzid(&self) -> Option<&str> {
        match self {
            Self::Zoned { tzid, .. } => Some(tzid),
            _ => None,
        }
    }

    /// The calendar date on the value's own wall clock.
    #[must_use]
    pub fn civil_date(&self) -> Date {
        match self {
            Self::Date(date) => *date,
            Self::Floating(dt) | Self::Zoned { datetime: dt, .. } | Self::Utc(dt) => dt.date(),
        }
    }

    /// The wall clock date-time; dates map to midnight.
    #[must_use]
    pub fn civil(&self) -> DateTime {
        match self {
            Self::Date(date) => date.to_datetime(Time::midnight()),
            Self::Floating(dt) | Self::Zoned { datetime: dt, .. } | Self::Utc(dt) => *dt,
        }
    }

    /// A value of the same kind and zone with a different wall clock.
    #[must_use]
    pub fn with_civil(&self, datetime: DateTime) -> Self {
        match self {
            Self::Date(_) => Self::Date(datetime.date()),
            Self::Floating(_) => Self::Floating(datetime),
            Self::Zoned { tzid, .. } => Self::zoned(datetime, tzid.clone()),
            Self::Utc(_) => Self::Utc(datetime),
        }
    }

    /// The zone this value is bound to, if it is zoned and the zone is known.
    #[must_use]
    pub fn time_zone(&self) -> Option<TimeZone> {
        match self {
            Self::Utc(_) => Some(TimeZone::UTC),
            Self::Zoned { tzid, .. } => lookup_time_zone(tzid),
            Self::Date(_) | Self::Floating(_) => None,
        }
    }

    /// The absolute instant of a UTC or zoned value.
    #[must_use]
    pub fn timestamp(&self) -> Option<Timestamp> {
        let tz = self.time_zone()?;
        to_zoned(self.civil(), &tz).map(|zdt| zdt.timestamp())
    }

    /// The instant used to compare against an RRULE `UNTIL`.
    ///
    /// UTC and zoned values use their own instant. Floating values, dates and
    /// zoned values with an unknown zone are read as UTC wall clock time.
    #[must_use]
    pub fn until_instant(&self) -> Timestamp {
        self.timestamp()
            .or_else(|| to_zoned(self.civil(), &TimeZone::UTC).map(|zdt| zdt.timestamp()))
            .unwrap_or(Timestamp::MAX)
    }

    /// Convert to the kind (and zone) of `template`.
    ///
    /// Instants are preserved between UTC and zoned values; every other
    /// conversion keeps the wall clock.
    #[must_use]
    pub fn coerce_like(&self, template: &Self) -> Self {
        match template {
            Self::Date(_) => Self::Date(self.civil_date()),
            Self::Floating(_) => Self::Floating(self.civil()),
            Self::Utc(_) => match self.timestamp() {
                Some(ts) => Self::Utc(ts.to_zoned(TimeZone::UTC).datetime()),
                None => Self::Utc(self.civil()),
            },
            Self::Zoned { tzid, .. } => {
                if self.tzid() == Some(tzid.as_str()) {
                    return self.clone();
                }
                let converted = self
                    .timestamp()
                    .zip(lookup_time_zone(tzid))
                    .map(|(ts, tz)| ts.to_zoned(tz).datetime());
                Self::zoned(converted.unwrap_or_else(|| self.civil()), tzid.clone())
            }
        }
    }
}

impl PartialOrd for Temporal {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Temporal {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Date(a), Self::Date(b)) => a.cmp(b),
            (Self::Floating(a), Self::Floating(b)) | (Self::Utc(a), Self::Utc(b)) => a.cmp(b),
            (
                Self::Zoned {
                    datetime: a,
                    tzid: tz_a,
                },
                Self::Zoned {
                    datetime: b,
                    tzid: tz_b,
                },
            ) => {
                let by_instant = if tz_a == tz_b {
                    a.cmp(b)
                } else {
                    match (self.timestamp(), other.timestamp()) {
                        (Some(x), Some(y)) => x.cmp(&y),
                        _ => a.cmp(b),
                    }
                };
                by_instant.then_with(|| tz_a.cmp(tz_b)).then_with(|| a.cmp(b))
            }
            _ => self
                .kind()
                .cmp(&other.kind())
                .then_with(|| self.civil().cmp(&other.civil())),
        }
    }
}

/// Wire form of the value, without any `TZID` parameter.
impl fmt::Display for Temporal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Date(date) => write_date(f, *date),
            Self::Floating(dt) | Self::Zoned { datetime: dt, .. } => write_date_time(f, *dt),
            Self::Utc(dt) => {
                write_date_time(f, *dt)?;
                f.write_str("Z")
            }
        }
    }
}

fn write_date(f: &mut fmt::Formatter<'_>, date: Date) -> fmt::Result {
    write!(f, "{:04}{:02}{:02}", date.year(), date.month(), date.day())
}

fn write_date_time(f: &mut fmt::Formatter<'_>, dt: DateTime) -> fmt::Result {
    write_date(f, dt.date())?;
    write!(f, "T{:02}{:02}{:02}", dt.hour(), dt.minute(), dt.second())
}

pub(crate) fn lookup_time_zone(tzid: &str) -> Option<TimeZone> {
    match TimeZone::get(tzid) {
        Ok(tz) => Some(tz),
        Err(err) => {
            tracing::debug!(tzid, %err, "unknown time zone, comparing by wall clock");
            None
        }
    }
}

/// Resolve a wall clock time in `tz`; gaps resolve forward, folds to the
/// earlier offset.
pub(crate) fn to_zoned(datetime: DateTime, tz: &TimeZone) -> Option<Zoned> {
    tz.to_ambiguous_zoned(datetime).compatible().ok()
}

/// Parse a DATE or DATE-TIME, optionally restricted by a declared `VALUE`.
///
/// A `TZID` turns a date-time without `Z` into a zoned value.
pub(crate) fn parse_temporal(
    text: &str,
    tzid: Option<&str>,
    declared: Option<ValueType>,
) -> Result<Temporal, ValueParseError> {
    let expected = declared.unwrap_or(ValueType::DateTime);
    let (date, time) = parse_with(text, expected, value_temporal())?;
    build_temporal(text, date, time, tzid, declared)
}

/// Parse a comma separated list of DATE or DATE-TIME values.
pub(crate) fn parse_temporal_list(
    text: &str,
    tzid: Option<&str>,
    declared: Option<ValueType>,
) -> Result<Vec<Temporal>, ValueParseError> {
    let expected = declared.unwrap_or(ValueType::DateTime);
    let parts = parse_with(
        text,
        expected,
        value_temporal().separated_by(just(',')).at_least(1).collect::<Vec<_>>(),
    )?;
    parts
        .into_iter()
        .map(|(date, time)| build_temporal(text, date, time, tzid, declared))
        .collect()
}

fn build_temporal(
    text: &str,
    date: Date,
    time: Option<(Time, bool)>,
    tzid: Option<&str>,
    declared: Option<ValueType>,
) -> Result<Temporal, ValueParseError> {
    let mismatch = |reason: &str| ValueParseError {
        token: text.to_owned(),
        expected: declared.unwrap_or(ValueType::DateTime),
        reason: reason.to_owned(),
    };

    match (time, declared) {
        (None, None | Some(ValueType::Date)) => Ok(Temporal::Date(date)),
        (None, Some(_)) => Err(mismatch("missing time part")),
        (Some(_), Some(ValueType::Date)) => Err(mismatch("unexpected time part")),
        (Some((time, utc)), _) => {
            let datetime = date.to_datetime(time);
            Ok(match (utc, tzid) {
                (true, _) => Temporal::Utc(datetime),
                (false, Some(tzid)) => Temporal::zoned(datetime, tzid),
                (false, None) => Temporal::Floating(datetime),
            })
        }
    }
}

/// ```txt
/// date         = date-fullyear date-month date-mday
/// date-time    = date "T" time
/// time         = time-hour time-minute time-second [time-utc]
/// ```
fn value_temporal<'src, I, E>() -> impl Parser<'src, I, (Date, Option<(Time, bool)>), E>
where
    I: Input<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
    E::Error: LabelError<'src, I, ValueExpected>,
{
    value_date().then(just('T').ignore_then(value_time()).or_not())
}

/// ```txt
/// date-value         = date-fullyear date-month date-mday
/// date-fullyear      = 4DIGIT
/// date-month         = 2DIGIT        ;01-12
/// date-mday          = 2DIGIT        ;01-28, 01-29, 01-30, 01-31
///                                    ;based on month/year
/// ```
pub(crate) fn value_date<'src, I, E>() -> impl Parser<'src, I, Date, E>
where
    I: Input<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
    E::Error: LabelError<'src, I, ValueExpected>,
{
    let year = i16_0_9()
        .then(i16_0_9())
        .then(i16_0_9())
        .then(i16_0_9())
        .map(|(((a, b), c), d)| 1000 * a + 100 * b + 10 * c + d);

    let month = choice((
        just('0').ignore_then(i8_1_9()),
        just('1').ignore_then(i8_0_2()).map(|b| 10 + b),
    ));

    let day = choice((
        just('0').ignore_then(i8_1_9()),
        i8_1_2().then(i8_0_9()).map(|(a, b)| 10 * a + b),
        just('3').ignore_then(i8_0_1()).map(|b| 30 + b),
    ));

    year.then(month)
        .then(day)
        .try_map(|((year, month), day), span| {
            Date::new(year, month, day)
                .map_err(|_| E::Error::expected_found([ValueExpected::Date], None, span))
        })
}

/// ```txt
/// time-hour    = 2DIGIT        ;00-23
/// time-minute  = 2DIGIT        ;00-59
/// time-second  = 2DIGIT        ;00-60
/// time-utc     = "Z"
/// ```
///
/// A leap second is clamped to 59, the civil time model has no second 60.
pub(crate) fn value_time<'src, I, E>() -> impl Parser<'src, I, (Time, bool), E>
where
    I: Input<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
    E::Error: LabelError<'src, I, ValueExpected>,
{
    time_hour()
        .then(time_minute())
        .then(time_second())
        .then(just('Z').or_not())
        .try_map(|(((hour, minute), second), utc), span| {
            Time::new(hour, minute, second.min(59), 0)
                .map(|time| (time, utc.is_some()))
                .map_err(|_| E::Error::expected_found([ValueExpected::Time], None, span))
        })
}

/// UTC offset value defined in RFC 5545 Section 3.3.14.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ValueUtcOffset {
    /// Whether the offset is positive
    pub positive: bool,

    /// Hour, 0-23
    pub hour: i8,

    /// Minute, 0-59
    pub minute: i8,

    /// Second, 0-59, optional
    pub second: Option<i8>,
}

impl ValueUtcOffset {
    /// Offset from UTC in seconds.
    #[must_use]
    pub fn seconds(self) -> i32 {
        let total = i32::from(self.hour) * 3600
            + i32::from(self.minute) * 60
            + i32::from(self.second.unwrap_or(0));
        if self.positive { total } else { -total }
    }

    /// The offset as a `jiff` offset.
    ///
    /// # Errors
    ///
    /// If the offset is out of `jiff`'s supported range.
    pub fn to_offset(self) -> Result<jiff::tz::Offset, jiff::Error> {
        jiff::tz::Offset::from_seconds(self.seconds())
    }

    pub(crate) fn parse(text: &str) -> Result<Self, ValueParseError> {
        parse_with(text, ValueType::UtcOffset, value_utc_offset())
    }
}

impl fmt::Display for ValueUtcOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.positive { '+' } else { '-' };
        write!(f, "{sign}{:02}{:02}", self.hour, self.minute)?;
        if let Some(second) = self.second {
            write!(f, "{second:02}")?;
        }
        Ok(())
    }
}

/// ```txt
/// utc-offset = time-numzone
/// time-numzone = ("+" / "-") time-hour time-minute [time-second]
/// ```
fn value_utc_offset<'src, I, E>() -> impl Parser<'src, I, ValueUtcOffset, E>
where
    I: Input<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
{
    select! { c @ ('+' | '-') => c }
        .then(time_hour())
        .then(time_minute())
        .then(time_second().or_not())
        .map(|(((sign, hour), minute), second)| ValueUtcOffset {
            positive: sign == '+',
            hour,
            minute,
            second,
        })
}

fn time_hour<'src, I, E>() -> impl Parser<'src, I, i8, E> + Copy
where
    I: Input<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
{
    choice((
        i8_0_1().then(i8_0_9()).map(|(a, b)| 10 * a + b),
        just('2').ignore_then(i8_0_3()).map(|b| 20 + b),
    ))
}

fn time_minute<'src, I, E>() -> impl Parser<'src, I, i8, E> + Copy
where
    I: Input<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
{
    i8_0_5().then(i8_0_9()).map(|(a, b)| 10 * a + b)
}

fn time_second<'src, I, E>() -> impl Parser<'src, I, i8, E> + Copy
where
    I: Input<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
{
    choice((
        i8_0_5().then(i8_0_9()).map(|(a, b)| 10 * a + b),
        just('6').ignore_then(just('0')).to(60), // leap second
    ))
}

macro_rules! define_digit_select {
    ($fname:ident : $ty:ty => { $($ch:literal),+ $(,)? }) => {
        #[allow(trivial_numeric_casts, clippy::cast_lossless, clippy::char_lit_as_u8, clippy::cast_possible_wrap)]
        const fn $fname<'src, I, E>() -> impl Parser<'src, I, $ty, E> + Copy
        where
            I: Input<'src, Token = char, Span = SimpleSpan>,
            E: ParserExtra<'src, I>,
        {
            select! {
                $(
                    $ch => (($ch as u8 - b'0') as $ty),
                )+
            }
        }
    };
}

define_digit_select!(i8_0_1 : i8 => { '0', '1' });
define_digit_select!(i8_0_2 : i8 => { '0', '1', '2' });
define_digit_select!(i8_0_3 : i8 => { '0', '1', '2', '3' });
define_digit_select!(i8_0_5 : i8 => { '0', '1', '2', '3', '4', '5' });
define_digit_select!(i8_0_9 : i8 => { '0', '1', '2', '3', '4', '5', '6', '7', '8', '9' });
define_digit_select!(i8_1_2 : i8 => { '1', '2' });
define_digit_select!(i8_1_9 : i8 => { '1', '2', '3', '4', '5', '6', '7', '8', '9' });
define_digit_select!(i16_0_9 : i16 => { '0', '1', '2', '3', '4', '5', '6', '7', '8', '9' });

#[cfg(test)]
mod tests {
    use jiff::civil::{date, datetime};

    use super::*;

    #[test]
    fn parses_date_and_date_time_kinds() {
        #[rustfmt::skip]
        let success_cases = [
            // examples from RFC 5545 Section 3.3.4 and 3.3.5
            ("19970714",         None,                     Temporal::Date(date(1997, 7, 14))),
            ("19980118T230000",  None,                     Temporal::Floating(datetime(1998, 1, 18, 23, 0, 0, 0))),
            ("19980119T070000Z", None,                     Temporal::Utc(datetime(1998, 1, 19, 7, 0, 0, 0))),
            ("19980119T020000",  Some("America/New_York"), Temporal::zoned(datetime(1998, 1, 19, 2, 0, 0, 0), "America/New_York")),
            // a trailing Z wins over TZID
            ("19980119T070000Z", Some("America/New_York"), Temporal::Utc(datetime(1998, 1, 19, 7, 0, 0, 0))),
            // leap second
            ("19970630T235960Z", None,                     Temporal::Utc(datetime(1997, 6, 30, 23, 59, 59, 0))),
        ];
        for (src, tzid, expected) in success_cases {
            assert_eq!(parse_temporal(src, tzid, None).unwrap(), expected, "{src}");
        }

        let fail_cases = [
            "19980119T230000-0800", // offsets are not date-times
            "19970714 133000",      // missing 'T'
            "19970714T250000",      // invalid hour
            "19970714T126000",      // invalid minute
            "19970714T123461",      // invalid second
            "20241301",             // invalid month
            "19970230",             // invalid day
            "2024011",              // too short
            "",
        ];
        for src in fail_cases {
            assert!(parse_temporal(src, None, None).is_err(), "{src} should fail");
        }
    }

    #[test]
    fn declared_value_restricts_shape() {
        assert!(parse_temporal("20151109", None, Some(ValueType::Date)).is_ok());
        assert!(parse_temporal("20151109T100000", None, Some(ValueType::Date)).is_err());
        assert!(parse_temporal("20151109", None, Some(ValueType::DateTime)).is_err());

        let err = parse_temporal("2015-11-09", None, Some(ValueType::Date)).unwrap_err();
        assert_eq!(err.token, "2015-11-09");
        assert_eq!(err.expected, ValueType::Date);
    }

    #[test]
    fn parses_lists() {
        let list = parse_temporal_list("20151109,20151111", None, Some(ValueType::Date)).unwrap();
        assert_eq!(
            list,
            [Temporal::Date(date(2015, 11, 9)), Temporal::Date(date(2015, 11, 11))]
        );
        assert!(parse_temporal_list("20151109,", None, None).is_err());
    }

    #[test]
    fn formats_wire_form() {
        #[rustfmt::skip]
        let cases = [
            (Temporal::Date(date(2015, 11, 9)),                                  "20151109"),
            (Temporal::Floating(datetime(2015, 11, 9, 10, 0, 0, 0)),             "20151109T100000"),
            (Temporal::Utc(datetime(2015, 11, 10, 7, 0, 0, 0)),                  "20151110T070000Z"),
            (Temporal::zoned(datetime(2015, 11, 9, 10, 5, 3, 0), "Europe/Paris"), "20151109T100503"),
            (Temporal::Date(date(987, 1, 2)),                                    "09870102"),
        ];
        for (value, expected) in cases {
            assert_eq!(value.to_string(), expected);
        }
    }

    #[test]
    fn orders_zoned_values_by_instant() {
        let ny = Temporal::zoned(datetime(2015, 11, 9, 10, 0, 0, 0), "America/New_York");
        let paris = Temporal::zoned(datetime(2015, 11, 9, 12, 0, 0, 0), "Europe/Paris");
        // 10:00 in New York is 16:00 in Paris
        assert!(paris < ny);
        assert_eq!(
            ny.coerce_like(&paris),
            Temporal::zoned(datetime(2015, 11, 9, 16, 0, 0, 0), "Europe/Paris")
        );
        assert_eq!(
            ny.coerce_like(&Temporal::Utc(datetime(2000, 1, 1, 0, 0, 0, 0))),
            Temporal::Utc(datetime(2015, 11, 9, 15, 0, 0, 0))
        );
    }

    #[test]
    fn until_instant_reads_floating_as_utc() {
        let floating = Temporal::Floating(datetime(2015, 11, 10, 7, 0, 0, 0));
        let utc = Temporal::Utc(datetime(2015, 11, 10, 7, 0, 0, 0));
        assert_eq!(floating.until_instant(), utc.until_instant());
    }

    #[test]
    fn parses_utc_offset() {
        #[rustfmt::skip]
        let success_cases = [
            // examples from RFC 5545 Section 3.3.14
            ("-0500",   ValueUtcOffset { positive: false, hour: 5,  minute: 0,  second: None }),
            ("+0100",   ValueUtcOffset { positive: true,  hour: 1,  minute: 0,  second: None }),
            ("-123456", ValueUtcOffset { positive: false, hour: 12, minute: 34, second: Some(56) }),
        ];
        for (src, expected) in success_cases {
            let offset = ValueUtcOffset::parse(src).unwrap();
            assert_eq!(offset, expected);
            assert_eq!(offset.to_string(), src);
        }
        assert_eq!(ValueUtcOffset::parse("-0500").unwrap().seconds(), -5 * 3600);

        for src in ["0500", "+2400", "-1260", "+120", "+120000Z", ""] {
            assert!(ValueUtcOffset::parse(src).is_err(), "{src} should fail");
        }
    }
}
