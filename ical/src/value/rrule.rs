// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Recurrence rule value as defined in RFC 5545 Section 3.3.10.

use std::fmt::{self, Display};

use chumsky::extra::ParserExtra;
use chumsky::input::Input;
use chumsky::label::LabelError;
use chumsky::prelude::*;
use chumsky::span::SimpleSpan;
use jiff::civil::Weekday;
use jiff::tz::TimeZone;

use crate::keyword::{
    KW_DAY_FR, KW_DAY_MO, KW_DAY_SA, KW_DAY_SU, KW_DAY_TH, KW_DAY_TU, KW_DAY_WE, KW_FREQ_DAILY,
    KW_FREQ_HOURLY, KW_FREQ_MINUTELY, KW_FREQ_MONTHLY, KW_FREQ_SECONDLY, KW_FREQ_WEEKLY,
    KW_FREQ_YEARLY, KW_RRULE_BYDAY, KW_RRULE_BYHOUR, KW_RRULE_BYMINUTE, KW_RRULE_BYMONTH,
    KW_RRULE_BYMONTHDAY, KW_RRULE_BYSECOND, KW_RRULE_BYSETPOS, KW_RRULE_BYWEEKNO,
    KW_RRULE_BYYEARDAY, KW_RRULE_COUNT, KW_RRULE_FREQ, KW_RRULE_INTERVAL, KW_RRULE_UNTIL,
    KW_RRULE_WKST,
};
use crate::value::datetime::{Temporal, value_date, value_time};
use crate::value::{ValueExpected, ValueParseError, ValueType, parse_with};

/// A parsed and validated `RECUR` value.
///
/// Rule parts are kept structurally; serialization writes them in a canonical
/// order starting with `FREQ`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecurrenceRule {
    /// Frequency of recurrence
    pub freq: Frequency,
    /// Inclusive upper bound of the recurrence set
    pub until: Option<Temporal>,
    /// Number of occurrences, DTSTART included
    pub count: Option<u32>,
    /// Interval between recurrences, 1 when absent
    pub interval: Option<u32>,
    /// Second specifier, 0 to 60
    pub by_second: Vec<u8>,
    /// Minute specifier, 0 to 59
    pub by_minute: Vec<u8>,
    /// Hour specifier, 0 to 23
    pub by_hour: Vec<u8>,
    /// Day of week specifier
    pub by_day: Vec<WeekdayNum>,
    /// Day of month specifier, ±1 to ±31
    pub by_month_day: Vec<i8>,
    /// Day of year specifier, ±1 to ±366
    pub by_year_day: Vec<i16>,
    /// ISO week number specifier, ±1 to ±53
    pub by_week_no: Vec<i8>,
    /// Month specifier, 1 to 12
    pub by_month: Vec<u8>,
    /// Position within each interval's set, ±1 to ±366
    pub by_set_pos: Vec<i16>,
    /// Start day of the week, Monday when absent
    pub week_start: Option<Weekday>,
}

/// Recurrence frequency
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[expect(missing_docs)]
pub enum Frequency {
    Secondly,
    Minutely,
    Hourly,
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Frequency::Secondly => KW_FREQ_SECONDLY,
            Frequency::Minutely => KW_FREQ_MINUTELY,
            Frequency::Hourly => KW_FREQ_HOURLY,
            Frequency::Daily => KW_FREQ_DAILY,
            Frequency::Weekly => KW_FREQ_WEEKLY,
            Frequency::Monthly => KW_FREQ_MONTHLY,
            Frequency::Yearly => KW_FREQ_YEARLY,
        })
    }
}

/// A `BYDAY` entry: a weekday with an optional ordinal, e.g. `-1FR`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WeekdayNum {
    /// Ordinal within the month or year, ±1 to ±53
    pub nth: Option<i8>,
    /// Day of the week
    pub weekday: Weekday,
}

impl WeekdayNum {
    /// Every `weekday` in the period.
    #[must_use]
    pub const fn every(weekday: Weekday) -> Self {
        Self { nth: None, weekday }
    }

    /// The `nth` `weekday` in the period, negative values count from the end.
    #[must_use]
    pub const fn nth(nth: i8, weekday: Weekday) -> Self {
        Self {
            nth: Some(nth),
            weekday,
        }
    }
}

impl Display for WeekdayNum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(nth) = self.nth {
            write!(f, "{nth}")?;
        }
        f.write_str(weekday_keyword(self.weekday))
    }
}

/// A recurrence rule violating RFC 5545 Section 3.3.10.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid recurrence rule: {reason}")]
pub struct RuleError {
    /// What is wrong with the rule
    pub reason: String,
}

impl RuleError {
    fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl RecurrenceRule {
    /// A rule with only `FREQ` set.
    #[must_use]
    pub const fn new(freq: Frequency) -> Self {
        Self {
            freq,
            until: None,
            count: None,
            interval: None,
            by_second: Vec::new(),
            by_minute: Vec::new(),
            by_hour: Vec::new(),
            by_day: Vec::new(),
            by_month_day: Vec::new(),
            by_year_day: Vec::new(),
            by_week_no: Vec::new(),
            by_month: Vec::new(),
            by_set_pos: Vec::new(),
            week_start: None,
        }
    }

    /// Parse a `RECUR` value and validate it.
    ///
    /// # Errors
    ///
    /// If the text does not match the grammar or the rule is invalid.
    pub fn parse(text: &str) -> Result<Self, ValueParseError> {
        let rule = parse_with(text, ValueType::Recur, value_rrule())?;
        rule.validate().map_err(|err| ValueParseError {
            token: text.to_owned(),
            expected: ValueType::Recur,
            reason: err.reason,
        })?;
        Ok(rule)
    }

    /// The effective interval.
    #[must_use]
    pub fn interval(&self) -> u32 {
        self.interval.unwrap_or(1)
    }

    /// The effective week start.
    #[must_use]
    pub fn week_start(&self) -> Weekday {
        self.week_start.unwrap_or(Weekday::Monday)
    }

    /// Check the constraints between rule parts and the ranges of each part.
    ///
    /// # Errors
    ///
    /// The first violation found.
    pub fn validate(&self) -> Result<(), RuleError> {
        use Frequency::{Daily, Monthly, Weekly, Yearly};

        if self.until.is_some() && self.count.is_some() {
            return Err(RuleError::new("UNTIL and COUNT MUST NOT occur in the same rule"));
        }
        if self.interval == Some(0) {
            return Err(RuleError::new("INTERVAL must be a positive integer"));
        }
        if self.count == Some(0) {
            return Err(RuleError::new("COUNT must be a positive integer"));
        }

        check_range(KW_RRULE_BYSECOND, &self.by_second, 0..=60)?;
        check_range(KW_RRULE_BYMINUTE, &self.by_minute, 0..=59)?;
        check_range(KW_RRULE_BYHOUR, &self.by_hour, 0..=23)?;
        check_range(KW_RRULE_BYMONTH, &self.by_month, 1..=12)?;
        check_signed_range(KW_RRULE_BYMONTHDAY, &self.by_month_day, 31)?;
        check_signed_range(KW_RRULE_BYYEARDAY, &self.by_year_day, 366)?;
        check_signed_range(KW_RRULE_BYWEEKNO, &self.by_week_no, 53)?;
        check_signed_range(KW_RRULE_BYSETPOS, &self.by_set_pos, 366)?;
        let ordinals: Vec<i8> = self.by_day.iter().filter_map(|d| d.nth).collect();
        check_signed_range(KW_RRULE_BYDAY, &ordinals, 53)?;

        if !ordinals.is_empty() {
            if !matches!(self.freq, Monthly | Yearly) {
                return Err(RuleError::new(
                    "BYDAY with a numeric value is only allowed with FREQ=MONTHLY or FREQ=YEARLY",
                ));
            }
            if self.freq == Yearly && !self.by_week_no.is_empty() {
                return Err(RuleError::new(
                    "BYDAY with a numeric value MUST NOT be used with FREQ=YEARLY and BYWEEKNO",
                ));
            }
        }
        if !self.by_week_no.is_empty() && self.freq != Yearly {
            return Err(RuleError::new("BYWEEKNO is only allowed with FREQ=YEARLY"));
        }
        if !self.by_year_day.is_empty() && matches!(self.freq, Daily | Weekly | Monthly) {
            return Err(RuleError::new(
                "BYYEARDAY MUST NOT be used with FREQ=DAILY, FREQ=WEEKLY or FREQ=MONTHLY",
            ));
        }
        if !self.by_month_day.is_empty() && self.freq == Weekly {
            return Err(RuleError::new("BYMONTHDAY MUST NOT be used with FREQ=WEEKLY"));
        }
        if !self.by_set_pos.is_empty() && !self.has_by_rule() {
            return Err(RuleError::new("BYSETPOS MUST only be used with another BYxxx rule part"));
        }
        Ok(())
    }

    /// Whether any `BYxxx` part other than `BYSETPOS` is present.
    #[must_use]
    pub fn has_by_rule(&self) -> bool {
        !(self.by_second.is_empty()
            && self.by_minute.is_empty()
            && self.by_hour.is_empty()
            && self.by_day.is_empty()
            && self.by_month_day.is_empty()
            && self.by_year_day.is_empty()
            && self.by_week_no.is_empty()
            && self.by_month.is_empty())
    }

    /// The same rule ending just before `occurrence`, for splitting a series.
    ///
    /// `COUNT` is replaced by an `UNTIL` one unit before `occurrence`: one day
    /// for dates, one second otherwise. Zoned occurrences produce a UTC
    /// `UNTIL`.
    ///
    /// # Errors
    ///
    /// If the bound falls outside the supported civil range.
    pub fn truncated_before(&self, occurrence: &Temporal) -> Result<Self, jiff::Error> {
        let second = jiff::Span::new().seconds(1);
        let until = match occurrence {
            Temporal::Date(date) => Temporal::Date(date.yesterday()?),
            Temporal::Floating(dt) => Temporal::Floating(dt.checked_sub(second)?),
            Temporal::Utc(dt) => Temporal::Utc(dt.checked_sub(second)?),
            Temporal::Zoned { .. } => {
                let instant = occurrence.until_instant().checked_sub(second)?;
                Temporal::Utc(instant.to_zoned(TimeZone::UTC).datetime())
            }
        };

        Ok(Self {
            until: Some(until),
            count: None,
            ..self.clone()
        })
    }
}

fn check_range(
    part: &str,
    values: &[u8],
    range: std::ops::RangeInclusive<u8>,
) -> Result<(), RuleError> {
    match values.iter().find(|v| !range.contains(v)) {
        Some(v) => Err(RuleError::new(format!(
            "{part} value {v} is out of range {}..={}",
            range.start(),
            range.end()
        ))),
        None => Ok(()),
    }
}

fn check_signed_range<T>(part: &str, values: &[T], max: i16) -> Result<(), RuleError>
where
    T: Copy + Into<i16> + Display,
{
    match values.iter().find(|v| {
        let v: i16 = (**v).into();
        v == 0 || !(-max..=max).contains(&v)
    }) {
        Some(v) => Err(RuleError::new(format!(
            "{part} value {v} is out of range ±1..=±{max}"
        ))),
        None => Ok(()),
    }
}

impl Display for RecurrenceRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{KW_RRULE_FREQ}={}", self.freq)?;
        if let Some(until) = &self.until {
            // zone is implied by DTSTART, only the wall clock is written
            write!(f, ";{KW_RRULE_UNTIL}={until}")?;
        }
        if let Some(count) = self.count {
            write!(f, ";{KW_RRULE_COUNT}={count}")?;
        }
        if let Some(interval) = self.interval {
            write!(f, ";{KW_RRULE_INTERVAL}={interval}")?;
        }
        write_list(f, KW_RRULE_BYSECOND, &self.by_second)?;
        write_list(f, KW_RRULE_BYMINUTE, &self.by_minute)?;
        write_list(f, KW_RRULE_BYHOUR, &self.by_hour)?;
        write_list(f, KW_RRULE_BYDAY, &self.by_day)?;
        write_list(f, KW_RRULE_BYMONTHDAY, &self.by_month_day)?;
        write_list(f, KW_RRULE_BYYEARDAY, &self.by_year_day)?;
        write_list(f, KW_RRULE_BYWEEKNO, &self.by_week_no)?;
        write_list(f, KW_RRULE_BYMONTH, &self.by_month)?;
        write_list(f, KW_RRULE_BYSETPOS, &self.by_set_pos)?;
        if let Some(wkst) = self.week_start {
            write!(f, ";{KW_RRULE_WKST}={}", weekday_keyword(wkst))?;
        }
        Ok(())
    }
}

fn write_list<T: Display>(f: &mut fmt::Formatter<'_>, part: &str, values: &[T]) -> fmt::Result {
    if values.is_empty() {
        return Ok(());
    }
    write!(f, ";{part}=")?;
    for (i, v) in values.iter().enumerate() {
        if i > 0 {
            f.write_str(",")?;
        }
        write!(f, "{v}")?;
    }
    Ok(())
}

const fn weekday_keyword(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Sunday => KW_DAY_SU,
        Weekday::Monday => KW_DAY_MO,
        Weekday::Tuesday => KW_DAY_TU,
        Weekday::Wednesday => KW_DAY_WE,
        Weekday::Thursday => KW_DAY_TH,
        Weekday::Friday => KW_DAY_FR,
        Weekday::Saturday => KW_DAY_SA,
    }
}

/// Format Definition:  This value type is defined by the following notation:
///
/// ```txt
/// recur           = recur-rule-part *( ";" recur-rule-part )
///                 ;
///                 ; The rule parts are not ordered in any
///                 ; particular sequence.
///                 ;
///                 ; The FREQ rule part is REQUIRED,
///                 ; but MUST NOT occur more than once.
///                 ;
///                 ; The other rule parts are OPTIONAL,
///                 ; but MUST NOT occur more than once.
/// ```
fn value_rrule<'src, I, E>() -> impl Parser<'src, I, RecurrenceRule, E>
where
    I: Input<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
    E::Error: LabelError<'src, I, ValueExpected>,
{
    rule_part()
        .separated_by(just(';'))
        .at_least(1)
        .collect::<Vec<_>>()
        .try_map(|parts, span| {
            build_from_parts(parts)
                .map_err(|expected| E::Error::expected_found([expected], None, span))
        })
}

#[derive(Debug, Clone)]
enum Part {
    Freq(Frequency),
    Until(Temporal),
    Count(u32),
    Interval(u32),
    BySecond(Vec<u8>),
    ByMinute(Vec<u8>),
    ByHour(Vec<u8>),
    ByDay(Vec<WeekdayNum>),
    ByMonthDay(Vec<i8>),
    ByYearDay(Vec<i16>),
    ByWeekNo(Vec<i8>),
    ByMonth(Vec<u8>),
    BySetPos(Vec<i16>),
    Wkst(Weekday),
}

fn build_from_parts(parts: Vec<Part>) -> Result<RecurrenceRule, ValueExpected> {
    fn set_once<T>(slot: &mut Option<T>, value: T) -> Result<(), ValueExpected> {
        match slot {
            Some(_) => Err(ValueExpected::RRuleDuplicatePart),
            None => {
                *slot = Some(value);
                Ok(())
            }
        }
    }

    fn set_list<T>(slot: &mut Vec<T>, values: Vec<T>) -> Result<(), ValueExpected> {
        if slot.is_empty() {
            *slot = values;
            Ok(())
        } else {
            Err(ValueExpected::RRuleDuplicatePart)
        }
    }

    let mut freq = None;
    let mut until = None;
    let mut count = None;
    let mut interval = None;
    let mut week_start = None;
    let mut rule = RecurrenceRule::new(Frequency::Daily);

    for part in parts {
        match part {
            Part::Freq(v) => set_once(&mut freq, v)?,
            Part::Until(v) => set_once(&mut until, v)?,
            Part::Count(v) => set_once(&mut count, v)?,
            Part::Interval(v) => set_once(&mut interval, v)?,
            Part::Wkst(v) => set_once(&mut week_start, v)?,
            Part::BySecond(v) => set_list(&mut rule.by_second, v)?,
            Part::ByMinute(v) => set_list(&mut rule.by_minute, v)?,
            Part::ByHour(v) => set_list(&mut rule.by_hour, v)?,
            Part::ByDay(v) => set_list(&mut rule.by_day, v)?,
            Part::ByMonthDay(v) => set_list(&mut rule.by_month_day, v)?,
            Part::ByYearDay(v) => set_list(&mut rule.by_year_day, v)?,
            Part::ByWeekNo(v) => set_list(&mut rule.by_week_no, v)?,
            Part::ByMonth(v) => set_list(&mut rule.by_month, v)?,
            Part::BySetPos(v) => set_list(&mut rule.by_set_pos, v)?,
        }
    }

    rule.freq = freq.ok_or(ValueExpected::RRuleRequiredFreq)?;
    rule.until = until;
    rule.count = count;
    rule.interval = interval;
    rule.week_start = week_start;
    Ok(rule)
}

/// ```txt
/// recur-rule-part = ( "FREQ" "=" freq )
///                 / ( "UNTIL" "=" enddate )
///                 / ( "COUNT" "=" 1*DIGIT )
///                 / ( "INTERVAL" "=" 1*DIGIT )
///                 / ( "BYSECOND" "=" byseclist )
///                 / ( "BYMINUTE" "=" byminlist )
///                 / ( "BYHOUR" "=" byhrlist )
///                 / ( "BYDAY" "=" bywdaylist )
///                 / ( "BYMONTHDAY" "=" bymodaylist )
///                 / ( "BYYEARDAY" "=" byyrdaylist )
///                 / ( "BYWEEKNO" "=" bywknolist )
///                 / ( "BYMONTH" "=" bymolist )
///                 / ( "BYSETPOS" "=" bysplist )
///                 / ( "WKST" "=" weekday )
/// ```
///
/// Numeric lists are parsed leniently here, ranges are checked by
/// [`RecurrenceRule::validate`].
fn rule_part<'src, I, E>() -> impl Parser<'src, I, Part, E>
where
    I: Input<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
    E::Error: LabelError<'src, I, ValueExpected>,
{
    let kw = |kw| just(kw).ignore_then(just('='));

    choice((
        kw(KW_RRULE_FREQ).ignore_then(freq()).map(Part::Freq),
        kw(KW_RRULE_UNTIL).ignore_then(enddate()).map(Part::Until),
        kw(KW_RRULE_COUNT).ignore_then(number()).map(Part::Count),
        kw(KW_RRULE_INTERVAL).ignore_then(number()).map(Part::Interval),
        kw(KW_RRULE_BYSECOND).ignore_then(list(number())).map(Part::BySecond),
        kw(KW_RRULE_BYMINUTE).ignore_then(list(number())).map(Part::ByMinute),
        kw(KW_RRULE_BYHOUR).ignore_then(list(number())).map(Part::ByHour),
        kw(KW_RRULE_BYDAY).ignore_then(list(weekdaynum())).map(Part::ByDay),
        kw(KW_RRULE_BYMONTHDAY).ignore_then(list(number())).map(Part::ByMonthDay),
        kw(KW_RRULE_BYYEARDAY).ignore_then(list(number())).map(Part::ByYearDay),
        kw(KW_RRULE_BYWEEKNO).ignore_then(list(number())).map(Part::ByWeekNo),
        kw(KW_RRULE_BYMONTH).ignore_then(list(number())).map(Part::ByMonth),
        kw(KW_RRULE_BYSETPOS).ignore_then(list(number())).map(Part::BySetPos),
        kw(KW_RRULE_WKST).ignore_then(weekday()).map(Part::Wkst),
    ))
}

/// ```txt
/// freq        = "SECONDLY" / "MINUTELY" / "HOURLY" / "DAILY"
///             / "WEEKLY" / "MONTHLY" / "YEARLY"
/// ```
fn freq<'src, I, E>() -> impl Parser<'src, I, Frequency, E>
where
    I: Input<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
{
    choice((
        just(KW_FREQ_SECONDLY).to(Frequency::Secondly),
        just(KW_FREQ_MINUTELY).to(Frequency::Minutely),
        just(KW_FREQ_HOURLY).to(Frequency::Hourly),
        just(KW_FREQ_DAILY).to(Frequency::Daily),
        just(KW_FREQ_WEEKLY).to(Frequency::Weekly),
        just(KW_FREQ_MONTHLY).to(Frequency::Monthly),
        just(KW_FREQ_YEARLY).to(Frequency::Yearly),
    ))
}

/// ```txt
/// enddate     = date / date-time
/// ```
///
/// A date-time without `Z` is floating; the zone of a zoned DTSTART is never
/// written into UNTIL.
fn enddate<'src, I, E>() -> impl Parser<'src, I, Temporal, E>
where
    I: Input<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
    E::Error: LabelError<'src, I, ValueExpected>,
{
    value_date()
        .then(just('T').ignore_then(value_time()).or_not())
        .map(|(date, time)| match time {
            None => Temporal::Date(date),
            Some((time, true)) => Temporal::Utc(date.to_datetime(time)),
            Some((time, false)) => Temporal::Floating(date.to_datetime(time)),
        })
}

/// ```txt
/// weekdaynum  = [[plus / minus] ordwk] weekday
/// ```
fn weekdaynum<'src, I, E>() -> impl Parser<'src, I, WeekdayNum, E>
where
    I: Input<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
    E::Error: LabelError<'src, I, ValueExpected>,
{
    number()
        .or_not()
        .then(weekday())
        .map(|(nth, weekday)| WeekdayNum { nth, weekday })
}

/// ```txt
/// weekday     = "SU" / "MO" / "TU" / "WE" / "TH" / "FR" / "SA"
/// ```
fn weekday<'src, I, E>() -> impl Parser<'src, I, Weekday, E>
where
    I: Input<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
{
    choice((
        just(KW_DAY_SU).to(Weekday::Sunday),
        just(KW_DAY_MO).to(Weekday::Monday),
        just(KW_DAY_TU).to(Weekday::Tuesday),
        just(KW_DAY_WE).to(Weekday::Wednesday),
        just(KW_DAY_TH).to(Weekday::Thursday),
        just(KW_DAY_FR).to(Weekday::Friday),
        just(KW_DAY_SA).to(Weekday::Saturday),
    ))
}

fn list<'src, I, E, T>(item: impl Parser<'src, I, T, E>) -> impl Parser<'src, I, Vec<T>, E>
where
    I: Input<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
{
    item.separated_by(just(',')).at_least(1).collect()
}

/// Optionally signed decimal, checked against the target integer type.
fn number<'src, I, E, T>() -> impl Parser<'src, I, T, E> + Clone
where
    I: Input<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
    E::Error: LabelError<'src, I, ValueExpected>,
    T: lexical::FromLexical,
{
    select! { c @ ('+' | '-') => c }
        .or_not()
        .then(
            select! { c @ '0'..='9' => c }
                .repeated()
                .at_least(1)
                .at_most(10)
                .collect::<String>(),
        )
        .try_map(|(sign, digits), span| {
            let mut s = String::with_capacity(digits.len() + 1);
            if let Some(sign) = sign {
                s.push(sign);
            }
            s.push_str(&digits);
            match lexical::parse_partial::<T, _>(&s) {
                Ok((v, n)) if n == s.len() => Ok(v),
                _ => Err(E::Error::expected_found([ValueExpected::Integer], None, span)),
            }
        })
}
