// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Expansion of one recurrence rule period into civil date-times.
//!
//! Each interval step of the rule (one year for `FREQ=YEARLY`, one week for
//! `FREQ=WEEKLY`, ...) is a *period*. The [`Expander`] turns the period's
//! seed into the full, sorted set of candidate date-times, applying the
//! `BYxxx` parts as expansions or limits per the table in RFC 5545 Section
//! 3.3.10.

use jiff::civil::{Date, DateTime, Time, Weekday};
use jiff::{Span, ToSpan};

use crate::value::{Frequency, RecurrenceRule, WeekdayNum};

/// Expands a single period of a rule.
#[derive(Debug, Clone)]
pub(crate) struct Expander<'a> {
    rule: &'a RecurrenceRule,
    /// The civil start of the whole series
    start: DateTime,
    /// The seed of the period being expanded
    cur: DateTime,
}

impl<'a> Expander<'a> {
    pub(crate) const fn new(rule: &'a RecurrenceRule, start: DateTime, cur: DateTime) -> Self {
        Self { rule, start, cur }
    }

    /// All candidates of the period, ascending and without duplicates.
    pub(crate) fn expand(&self) -> Vec<DateTime> {
        let mut set = RecurrenceSet::default();
        match self.rule.freq {
            Frequency::Yearly => self.yearly(&mut set),
            Frequency::Monthly => self.monthly(&mut set),
            Frequency::Weekly => self.weekly(&mut set),
            Frequency::Daily => self.daily(&mut set),
            Frequency::Hourly | Frequency::Minutely | Frequency::Secondly => {
                self.sub_daily(&mut set);
            }
        }
        set.canonicalize();

        if !self.rule.by_set_pos.is_empty() {
            let len = set.items.len();
            let mut position = 0;
            set.items.retain(|_| {
                let keep = self.satisfies_by_set_pos(position, len);
                position += 1;
                keep
            });
        }
        set.items
    }

    /// Whether the seed's day is rejected by the day level limits of a
    /// sub-daily rule, so the whole day can be skipped.
    pub(crate) fn day_is_excluded(&self) -> bool {
        !(self.satisfies_by_month(self.cur)
            && self.satisfies_by_year_day(self.cur)
            && self.satisfies_by_month_day(self.cur)
            && self.satisfies_by_week_day(self.cur))
    }

    fn yearly(&self, set: &mut RecurrenceSet) {
        set.insert(self.cur);
        if self.has_by_week_day() {
            if self.has_by_week() {
                self.expand_by_week(set);
                set.expand(|dt| self.iter_by_week_day_weekly(dt));
                self.limit_by_month(set);
            } else if self.has_by_month() {
                self.expand_by_month(set);
                set.expand(|dt| self.iter_by_week_day_monthly(dt));
            } else {
                set.expand(|dt| self.iter_by_week_day_yearly(dt));
            }
            self.limit_by_year_day(set);
            self.limit_by_month_day(set);
        } else if self.has_by_week() {
            self.expand_by_week(set);
            // every day of the selected weeks, as python-dateutil does
            set.expand(|dt| (0..7).filter_map(move |n: i64| dt.checked_add(n.days()).ok()));
            self.limit_by_month(set);
            self.limit_by_year_day(set);
            self.limit_by_month_day(set);
        } else if self.has_by_month() {
            self.expand_by_month(set);
            if self.has_by_month_day() {
                set.expand(|dt| self.iter_by_month_day(dt));
            }
            self.limit_by_year_day(set);
        } else if self.has_by_month_day() {
            set.expand(|dt| {
                (1..=12).filter_map(move |month| dt.with().month(month).day(1).build().ok())
            });
            set.expand(|dt| self.iter_by_month_day(dt));
            self.limit_by_year_day(set);
        } else if self.has_by_year_day() {
            set.expand(|dt| self.iter_by_year_day(dt));
        }
        self.expand_by_time(set);
    }

    fn monthly(&self, set: &mut RecurrenceSet) {
        if !self.satisfies_by_month(self.cur) {
            return;
        }
        set.insert(self.cur);
        if self.has_by_week_day() {
            set.expand(|dt| self.iter_by_week_day_monthly(dt));
            self.limit_by_month_day(set);
        } else if self.has_by_month_day() {
            set.expand(|dt| self.iter_by_month_day(dt));
        }
        self.expand_by_time(set);
    }

    fn weekly(&self, set: &mut RecurrenceSet) {
        set.insert(self.cur);
        if self.has_by_week_day() {
            set.expand(|dt| self.iter_by_week_day_weekly(dt));
        }
        self.limit_by_month(set);
        self.expand_by_time(set);
    }

    fn daily(&self, set: &mut RecurrenceSet) {
        if !self.satisfies_by_month(self.cur)
            || !self.satisfies_by_month_day(self.cur)
            || !self.satisfies_by_week_day(self.cur)
        {
            return;
        }
        set.insert(self.cur);
        self.expand_by_time(set);
    }

    fn sub_daily(&self, set: &mut RecurrenceSet) {
        if self.day_is_excluded() || !self.satisfies_by_hour(self.cur) {
            return;
        }
        match self.rule.freq {
            Frequency::Hourly => {
                set.insert(self.cur);
                self.expand_by_minute(set);
                self.expand_by_second(set);
            }
            Frequency::Minutely => {
                if !self.satisfies_by_minute(self.cur) {
                    return;
                }
                set.insert(self.cur);
                self.expand_by_second(set);
            }
            _ => {
                if !self.satisfies_by_minute(self.cur) || !self.satisfies_by_second(self.cur) {
                    return;
                }
                set.insert(self.cur);
            }
        }
    }

    fn expand_by_time(&self, set: &mut RecurrenceSet) {
        if self.has_by_hour() {
            set.expand(|dt| {
                self.rule
                    .by_hour
                    .iter()
                    .filter_map(move |h| dt.with().hour(i8::try_from(*h).ok()?).build().ok())
            });
        }
        self.expand_by_minute(set);
        self.expand_by_second(set);
    }

    fn expand_by_minute(&self, set: &mut RecurrenceSet) {
        if self.rule.by_minute.is_empty() {
            return;
        }
        set.expand(|dt| {
            self.rule
                .by_minute
                .iter()
                .filter_map(move |m| dt.with().minute(i8::try_from(*m).ok()?).build().ok())
        });
    }

    fn expand_by_second(&self, set: &mut RecurrenceSet) {
        if self.rule.by_second.is_empty() {
            return;
        }
        set.expand(|dt| {
            self.rule
                .by_second
                .iter()
                .filter_map(move |s| dt.with().second(i8::try_from(*s).ok()?).build().ok())
        });
    }

    fn expand_by_month(&self, set: &mut RecurrenceSet) {
        // the day comes from the series start, the seed may have been
        // constrained to a shorter month
        let day = self.start.day();
        set.expand(|dt| {
            self.rule.by_month.iter().filter_map(move |month| {
                let month = i8::try_from(*month).ok()?;
                if self.has_by_month_day() || self.has_by_week_day() {
                    dt.with().month(month).day(1).build().ok()
                } else {
                    dt.with().month(month).day(day).build().ok()
                }
            })
        });
    }

    fn expand_by_week(&self, set: &mut RecurrenceSet) {
        let wkst = self.rule.week_start();
        set.expand(|dt| {
            let year = dt.year();
            let weeks = weeks_in_year(wkst, year);
            self.rule.by_week_no.iter().filter_map(move |week| {
                let week = i16::from(*week);
                let week = if week < 0 {
                    i16::from(weeks?) + week + 1
                } else {
                    week
                };
                let first = week_one_start(wkst, year).ok()?;
                let start = first.checked_add((i64::from(week) - 1).weeks()).ok()?;
                dt.with().date(start).build().ok()
            })
        });
    }

    fn iter_by_month_day(&self, dt: DateTime) -> impl Iterator<Item = DateTime> {
        let days_in_month = dt.days_in_month();
        self.rule.by_month_day.iter().filter_map(move |day| {
            let day = if *day < 0 {
                days_in_month.checked_add(*day + 1)?
            } else {
                *day
            };
            dt.with().day(day).build().ok()
        })
    }

    fn iter_by_year_day(&self, dt: DateTime) -> impl Iterator<Item = DateTime> {
        let days_in_year = dt.days_in_year();
        self.rule.by_year_day.iter().filter_map(move |day| {
            let day = if *day < 0 {
                days_in_year.checked_add(*day + 1)?
            } else {
                *day
            };
            dt.with().day_of_year(day).build().ok()
        })
    }

    fn iter_by_week_day_yearly(&self, dt: DateTime) -> Vec<DateTime> {
        let start = dt.first_of_year();
        let end = dt.last_of_year();
        self.rule
            .by_day
            .iter()
            .flat_map(|wd| weekdays_in(*wd, start, end))
            .collect()
    }

    fn iter_by_week_day_monthly(&self, dt: DateTime) -> Vec<DateTime> {
        let start = dt.first_of_month();
        let end = dt.last_of_month();
        self.rule
            .by_day
            .iter()
            .flat_map(|wd| weekdays_in(*wd, start, end))
            .collect()
    }

    fn iter_by_week_day_weekly(&self, dt: DateTime) -> Vec<DateTime> {
        let wkst = self.rule.week_start();
        let Ok(start) = first_of_week(wkst, dt.date()) else {
            return Vec::new();
        };
        let Ok(start) = dt.with().date(start).build() else {
            return Vec::new();
        };
        let Ok(end) = start.checked_add(6.days()) else {
            return Vec::new();
        };
        self.rule
            .by_day
            .iter()
            .flat_map(|wd| weekdays_between(wd.weekday, start, end))
            .collect()
    }

    fn limit_by_month(&self, set: &mut RecurrenceSet) {
        if self.has_by_month() {
            set.retain(|dt| self.satisfies_by_month(*dt));
        }
    }

    fn limit_by_year_day(&self, set: &mut RecurrenceSet) {
        if self.has_by_year_day() {
            set.retain(|dt| self.satisfies_by_year_day(*dt));
        }
    }

    fn limit_by_month_day(&self, set: &mut RecurrenceSet) {
        if self.has_by_month_day() {
            set.retain(|dt| self.satisfies_by_month_day(*dt));
        }
    }

    fn has_by_month(&self) -> bool {
        !self.rule.by_month.is_empty()
    }

    fn has_by_week(&self) -> bool {
        !self.rule.by_week_no.is_empty()
    }

    fn has_by_year_day(&self) -> bool {
        !self.rule.by_year_day.is_empty()
    }

    fn has_by_month_day(&self) -> bool {
        !self.rule.by_month_day.is_empty()
    }

    fn has_by_week_day(&self) -> bool {
        !self.rule.by_day.is_empty()
    }

    fn has_by_hour(&self) -> bool {
        !self.rule.by_hour.is_empty()
    }

    fn satisfies_by_month(&self, dt: DateTime) -> bool {
        !self.has_by_month()
            || u8::try_from(dt.month()).is_ok_and(|m| self.rule.by_month.contains(&m))
    }

    fn satisfies_by_year_day(&self, dt: DateTime) -> bool {
        if !self.has_by_year_day() {
            return true;
        }
        let positive = dt.day_of_year();
        // -1 is the last day of the year
        let negative = positive - 1 - dt.days_in_year();
        self.rule.by_year_day.contains(&positive) || self.rule.by_year_day.contains(&negative)
    }

    fn satisfies_by_month_day(&self, dt: DateTime) -> bool {
        if !self.has_by_month_day() {
            return true;
        }
        let positive = dt.day();
        let negative = positive - 1 - dt.days_in_month();
        self.rule.by_month_day.contains(&positive) || self.rule.by_month_day.contains(&negative)
    }

    /// Only meaningful where `BYDAY` carries no ordinals.
    fn satisfies_by_week_day(&self, dt: DateTime) -> bool {
        !self.has_by_week_day() || self.rule.by_day.iter().any(|wd| wd.weekday == dt.weekday())
    }

    fn satisfies_by_hour(&self, dt: DateTime) -> bool {
        !self.has_by_hour() || u8::try_from(dt.hour()).is_ok_and(|h| self.rule.by_hour.contains(&h))
    }

    fn satisfies_by_minute(&self, dt: DateTime) -> bool {
        self.rule.by_minute.is_empty()
            || u8::try_from(dt.minute()).is_ok_and(|m| self.rule.by_minute.contains(&m))
    }

    fn satisfies_by_second(&self, dt: DateTime) -> bool {
        self.rule.by_second.is_empty()
            || u8::try_from(dt.second()).is_ok_and(|s| self.rule.by_second.contains(&s))
    }

    fn satisfies_by_set_pos(&self, position: usize, len: usize) -> bool {
        let (Ok(position), Ok(len)) = (i16::try_from(position), i16::try_from(len)) else {
            return false;
        };
        let positive = position + 1;
        // -1 is the last member of the period's set
        let negative = positive - 1 - len;
        self.rule.by_set_pos.contains(&positive) || self.rule.by_set_pos.contains(&negative)
    }
}

/// Scratch set of candidates for one period.
#[derive(Debug, Default)]
struct RecurrenceSet {
    items: Vec<DateTime>,
}

impl RecurrenceSet {
    fn insert(&mut self, dt: DateTime) {
        self.items.push(dt);
    }

    fn retain(&mut self, predicate: impl FnMut(&DateTime) -> bool) {
        self.items.retain(predicate);
    }

    /// Replace every member with its expansion.
    fn expand<E, I>(&mut self, expand: E)
    where
        E: Fn(DateTime) -> I,
        I: IntoIterator<Item = DateTime>,
    {
        let current = std::mem::take(&mut self.items);
        for dt in current {
            self.items.extend(expand(dt));
        }
    }

    fn canonicalize(&mut self) {
        self.items.sort_unstable();
        self.items.dedup();
    }
}

/// Start of the period a seed belongs to; no candidate of the period is
/// earlier than this.
pub(crate) fn period_start(rule: &RecurrenceRule, seed: DateTime) -> DateTime {
    let midnight = seed.date().to_datetime(Time::midnight());
    match rule.freq {
        Frequency::Yearly => seed.first_of_year().with().time(Time::midnight()).build(),
        Frequency::Monthly => seed.first_of_month().with().time(Time::midnight()).build(),
        Frequency::Weekly => first_of_week(rule.week_start(), seed.date())
            .map(|d| d.to_datetime(Time::midnight())),
        Frequency::Daily => Ok(midnight),
        Frequency::Hourly => seed.with().minute(0).second(0).build(),
        Frequency::Minutely => seed.with().second(0).build(),
        Frequency::Secondly => Ok(seed),
    }
    .unwrap_or(midnight)
}

/// The span of `n` periods.
pub(crate) fn period_span(freq: Frequency, n: i64) -> Result<Span, jiff::Error> {
    let span = Span::new();
    match freq {
        Frequency::Yearly => span.try_years(n),
        Frequency::Monthly => span.try_months(n),
        Frequency::Weekly => span.try_weeks(n),
        Frequency::Daily => span.try_days(n),
        Frequency::Hourly => span.try_hours(n),
        Frequency::Minutely => span.try_minutes(n),
        Frequency::Secondly => span.try_seconds(n),
    }
}

fn weekdays_in(wd: WeekdayNum, start: DateTime, end: DateTime) -> Vec<DateTime> {
    let Some(nth) = wd.nth else {
        return weekdays_between(wd.weekday, start, end);
    };
    let from = if nth < 0 { end } else { start };
    let first = if from.weekday() == wd.weekday {
        if nth.abs() == 1 {
            return vec![from];
        }
        nth - nth.signum()
    } else {
        nth
    };
    from.nth_weekday(i32::from(first), wd.weekday)
        .ok()
        .filter(|dt| (start..=end).contains(dt))
        .into_iter()
        .collect()
}

fn weekdays_between(weekday: Weekday, start: DateTime, end: DateTime) -> Vec<DateTime> {
    let first = if start.weekday() == weekday {
        Ok(start)
    } else {
        start.nth_weekday(1, weekday)
    };
    let Ok(first) = first else {
        return Vec::new();
    };
    std::iter::successors(Some(first), |dt| dt.checked_add(1.week()).ok())
        .take_while(|dt| *dt <= end)
        .collect()
}

/// First day of the week containing `date`, weeks starting on `wkst`.
pub(crate) fn first_of_week(wkst: Weekday, date: Date) -> Result<Date, jiff::Error> {
    let back = (date.weekday().to_monday_zero_offset() - wkst.to_monday_zero_offset())
        .rem_euclid(7);
    date.checked_sub(i64::from(back).days())
}

/// First day of week 1 of `year`: the week holding at least four days of the
/// year, which is the week containing January 4th.
fn week_one_start(wkst: Weekday, year: i16) -> Result<Date, jiff::Error> {
    first_of_week(wkst, Date::new(year, 1, 4)?)
}

fn weeks_in_year(wkst: Weekday, year: i16) -> Option<i8> {
    let this = week_one_start(wkst, year).ok()?;
    let next = week_one_start(wkst, year.checked_add(1)?).ok()?;
    let days = this.until(next).ok()?.get_days();
    i8::try_from(days / 7).ok()
}

#[cfg(test)]
mod tests {
    use jiff::civil::{date, datetime};

    use super::*;

    fn expand(rule: &str, seed: DateTime) -> Vec<DateTime> {
        let rule = RecurrenceRule::parse(rule).unwrap();
        Expander::new(&rule, seed, seed).expand()
    }

    #[test]
    fn expands_monthly_by_day() {
        // last Friday of the month
        let got = expand("FREQ=MONTHLY;BYDAY=-1FR", datetime(2015, 11, 1, 9, 0, 0, 0));
        assert_eq!(got, [datetime(2015, 11, 27, 9, 0, 0, 0)]);

        // every Tuesday and Thursday
        let got = expand("FREQ=MONTHLY;BYDAY=TU,TH", datetime(1997, 9, 2, 9, 0, 0, 0));
        assert_eq!(got.len(), 9);
        assert_eq!(got.first(), Some(&datetime(1997, 9, 2, 9, 0, 0, 0)));
    }

    #[test]
    fn expands_yearly_by_week_no() {
        // RFC 5545: Monday of week number 20
        let got = expand("FREQ=YEARLY;BYWEEKNO=20;BYDAY=MO", datetime(1997, 5, 12, 9, 0, 0, 0));
        assert_eq!(got, [datetime(1997, 5, 12, 9, 0, 0, 0)]);
    }

    #[test]
    fn expands_set_pos() {
        // last work day of the month
        let got = expand(
            "FREQ=MONTHLY;BYDAY=MO,TU,WE,TH,FR;BYSETPOS=-1",
            datetime(1997, 9, 29, 9, 0, 0, 0),
        );
        assert_eq!(got, [datetime(1997, 9, 30, 9, 0, 0, 0)]);
    }

    #[test]
    fn skips_invalid_month_days() {
        let got = expand("FREQ=MONTHLY;BYMONTHDAY=31", datetime(2015, 2, 1, 0, 0, 0, 0));
        assert!(got.is_empty());
        let got = expand("FREQ=MONTHLY;BYMONTHDAY=-1", datetime(2015, 2, 1, 0, 0, 0, 0));
        assert_eq!(got, [datetime(2015, 2, 28, 0, 0, 0, 0)]);
    }

    #[test]
    fn computes_week_numbers() {
        assert_eq!(week_one_start(Weekday::Monday, 2015).unwrap(), date(2014, 12, 29));
        assert_eq!(weeks_in_year(Weekday::Monday, 2015), Some(53));
        assert_eq!(weeks_in_year(Weekday::Monday, 2016), Some(52));
        assert_eq!(
            first_of_week(Weekday::Sunday, date(2015, 11, 11)).unwrap(),
            date(2015, 11, 8)
        );
    }

    #[test]
    fn finds_period_starts() {
        let rule = RecurrenceRule::parse("FREQ=WEEKLY;WKST=SU").unwrap();
        let start = period_start(&rule, datetime(2015, 11, 11, 10, 30, 0, 0));
        assert_eq!(start, datetime(2015, 11, 8, 0, 0, 0, 0));

        let rule = RecurrenceRule::parse("FREQ=YEARLY").unwrap();
        let start = period_start(&rule, datetime(2015, 11, 11, 10, 30, 0, 0));
        assert_eq!(start, datetime(2015, 1, 1, 0, 0, 0, 0));
    }
}
