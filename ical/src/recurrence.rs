// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Recurrence sets as defined in RFC 5545 Section 3.8.5.
//!
//! The recurrence set of a component is `DTSTART`, every instance of its
//! `RRULE`, and every `RDATE`, less every `EXDATE`. [`occurrences`] streams
//! the set lazily in ascending order, so callers bound the work by how far
//! they pull.
//!
//! Rule expansion resumes from checkpoints kept in the component's
//! [`RecurrenceCache`], so repeated queries further into a series do not
//! replay it from `DTSTART`. Changing `DTSTART`, `RRULE` or `RDATE` through
//! the component API clears the cache.

mod cache;
mod expand;

use std::cell::RefCell;
use std::iter::Peekable;

use jiff::civil::{DateTime, Time};
use jiff::tz::{AmbiguousOffset, TimeZone};

pub use cache::RecurrenceCache;

use crate::component::Component;
use crate::keyword::{KW_DTSTART, KW_EXDATE, KW_RDATE, KW_RRULE};
use crate::recurrence::cache::{Checkpoint, PeriodKey};
use crate::recurrence::expand::{Expander, period_span, period_start};
use crate::value::{DateTimeKind, Frequency, RecurrenceRule, Temporal, Value};

/// A component without a recurrence set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RecurrenceError {
    /// The component has no `DTSTART`.
    #[error("DTSTART is not present, the component has no recurrence set")]
    MissingStart,
}

/// Stream the recurrence set of `component` from `from` on.
///
/// `from` is converted to the kind of `DTSTART` first, so a UTC bound works
/// for a series of dates.
///
/// # Errors
///
/// [`RecurrenceError::MissingStart`] if the component has no `DTSTART`.
pub fn occurrences<'a>(
    component: &'a Component,
    from: &Temporal,
) -> Result<Occurrences<'a>, RecurrenceError> {
    let start = component
        .get_one(KW_DTSTART)
        .and_then(|p| p.temporal())
        .ok_or(RecurrenceError::MissingStart)?
        .clone();
    let from = from.coerce_like(&start);

    let mut rdates: Vec<Temporal> = component
        .get(KW_RDATE)
        .flat_map(|p| p.value().temporals())
        .map(|t| t.coerce_like(&start))
        .filter(|t| *t >= from)
        .collect();
    rdates.sort();
    rdates.dedup();

    let mut exdates: Vec<Temporal> = component
        .get(KW_EXDATE)
        .flat_map(|p| p.value().temporals())
        .map(|t| t.coerce_like(&start))
        .collect();
    exdates.sort();
    exdates.dedup();

    let rule = component
        .get_one(KW_RRULE)
        .and_then(|p| match p.value() {
            Value::Recur(rule) => Some(rule),
            _ => None,
        })
        .map(|rule| RuleStream::new(rule, &start, &from, component.recurrence_cache()).peekable());

    Ok(Occurrences {
        from,
        start: Some(start),
        rule,
        rdates: rdates.into_iter().peekable(),
        exdates,
        last: None,
    })
}

/// Stream the recurrence set of `component` within `[start, end)`.
///
/// # Errors
///
/// [`RecurrenceError::MissingStart`] if the component has no `DTSTART`.
pub fn occurrences_between<'a>(
    component: &'a Component,
    start: &Temporal,
    end: &Temporal,
) -> Result<impl Iterator<Item = Temporal> + 'a, RecurrenceError> {
    let occurrences = occurrences(component, start)?;
    let end = end.coerce_like(&occurrences.from);
    Ok(occurrences.take_while(move |t| *t < end))
}

/// Whether `value` is a member of the recurrence set of `component`.
///
/// # Errors
///
/// [`RecurrenceError::MissingStart`] if the component has no `DTSTART`.
pub fn is_occurrence(component: &Component, value: &Temporal) -> Result<bool, RecurrenceError> {
    let mut occurrences = occurrences(component, value)?;
    let target = occurrences.from.clone();
    Ok(occurrences.next().is_some_and(|t| t == target))
}

/// Ascending stream of the recurrence set; see [`occurrences`].
#[derive(Debug)]
pub struct Occurrences<'a> {
    from: Temporal,
    start: Option<Temporal>,
    rule: Option<Peekable<RuleStream<'a>>>,
    rdates: Peekable<std::vec::IntoIter<Temporal>>,
    exdates: Vec<Temporal>,
    last: Option<Temporal>,
}

impl Iterator for Occurrences<'_> {
    type Item = Temporal;

    fn next(&mut self) -> Option<Temporal> {
        loop {
            let rule_head = self.rule.as_mut().and_then(Peekable::peek);
            let next = [self.start.as_ref(), rule_head, self.rdates.peek()]
                .into_iter()
                .flatten()
                .min()?
                .clone();

            if self.start.as_ref() == Some(&next) {
                self.start = None;
            }
            if let Some(rule) = self.rule.as_mut() {
                rule.next_if_eq(&next);
            }
            self.rdates.next_if_eq(&next);

            if next < self.from
                || self.last.as_ref() == Some(&next)
                || self.exdates.binary_search(&next).is_ok()
            {
                continue;
            }
            self.last = Some(next.clone());
            return Some(next);
        }
    }
}

/// Instances of an `RRULE` after `DTSTART`, in ascending order, with `UNTIL`
/// and `COUNT` applied.
#[derive(Debug)]
struct RuleStream<'a> {
    rule: &'a RecurrenceRule,
    start: Temporal,
    civil_start: DateTime,
    time_zone: Option<TimeZone>,
    cache: &'a RefCell<RecurrenceCache>,
    /// Interval index of the next period to expand
    attempt: i64,
    /// Candidates of the current period, in descending order
    pending: Vec<DateTime>,
    /// Instances counted against `COUNT`, `DTSTART` included
    emitted: u32,
    done: bool,
}

impl<'a> RuleStream<'a> {
    fn new(
        rule: &'a RecurrenceRule,
        start: &Temporal,
        from: &Temporal,
        cache: &'a RefCell<RecurrenceCache>,
    ) -> Self {
        let civil_start = start.civil();
        let time_zone = match start.kind() {
            DateTimeKind::Zoned => start.time_zone(),
            _ => None,
        };
        let mut stream = Self {
            rule,
            start: start.clone(),
            civil_start,
            time_zone,
            cache,
            attempt: 0,
            pending: Vec::new(),
            emitted: 1,
            done: false,
        };

        let key = PeriodKey::new(start.kind(), from.civil());
        let checkpoint = cache.borrow().seed_for(key).cloned();
        match checkpoint {
            Some(checkpoint) => {
                tracing::debug!(attempt = checkpoint.attempt, "resuming expansion from cache");
                stream.attempt = checkpoint.attempt + 1;
                stream.emitted = checkpoint.emitted_before;
                stream.pending = checkpoint.starts.into_iter().rev().collect();
            }
            None if rule.count.is_none() => {
                stream.attempt = stream.attempt_near(from.civil());
                tracing::debug!(attempt = stream.attempt, "no cached period, expanding near start");
            }
            None => tracing::debug!("no cached period, expanding from DTSTART"),
        }
        stream
    }

    /// An interval index at or before the period holding `target`. Only
    /// valid without `COUNT`, which needs every earlier instance counted.
    fn attempt_near(&self, target: DateTime) -> i64 {
        let interval = i64::from(self.rule.interval());
        let start = self.civil_start;
        let periods = match self.rule.freq {
            Frequency::Yearly => i64::from(target.year() - start.year()),
            Frequency::Monthly => {
                i64::from(target.year() - start.year()) * 12
                    + i64::from(target.month() - start.month())
            }
            freq => {
                let unit = match freq {
                    Frequency::Weekly => 7 * 86_400,
                    Frequency::Daily => 86_400,
                    Frequency::Hourly => 3_600,
                    Frequency::Minutely => 60,
                    _ => 1,
                };
                start.duration_until(target).as_secs() / unit
            }
        };
        (periods / interval - 1).max(0)
    }

    /// Expand the next period into `pending`. Returns `false` once the rule
    /// can produce no more instances.
    fn advance(&mut self) -> bool {
        let Some(steps) = self.attempt.checked_mul(i64::from(self.rule.interval())) else {
            return false;
        };
        let Ok(seed) = period_span(self.rule.freq, steps)
            .and_then(|span| self.civil_start.checked_add(span))
        else {
            return false;
        };
        let attempt = self.attempt;
        self.attempt += 1;

        if let Some(until) = &self.rule.until {
            let first = self.start.with_civil(period_start(self.rule, seed));
            if exceeds(&first, until) {
                return false;
            }
        }

        if self.is_constrained(seed) {
            return true;
        }

        let expander = Expander::new(self.rule, self.civil_start, seed);
        if self.rule.freq < Frequency::Daily && expander.day_is_excluded() {
            self.skip_day(seed);
            return true;
        }

        let mut starts: Vec<DateTime> = expander
            .expand()
            .into_iter()
            .map(|dt| match self.start {
                Temporal::Date(_) => dt.date().to_datetime(Time::midnight()),
                _ => dt,
            })
            .filter(|dt| *dt > self.civil_start && self.exists(*dt))
            .collect();
        starts.dedup();

        let key = PeriodKey::new(self.start.kind(), seed);
        let mut cache = self.cache.borrow_mut();
        if !cache.contains(key) {
            cache.publish(
                key,
                Checkpoint {
                    attempt,
                    emitted_before: self.emitted,
                    starts: starts.clone(),
                },
            );
        }

        self.pending = starts.into_iter().rev().collect();
        true
    }

    /// Yearly and monthly seeds clamped to a shorter month, e.g. Jan 31 plus
    /// one month, are not instances unless a `BYxxx` part picks the day.
    fn is_constrained(&self, seed: DateTime) -> bool {
        if seed.day() == self.civil_start.day() {
            return false;
        }
        let r = self.rule;
        match r.freq {
            Frequency::Yearly => {
                r.by_month.is_empty()
                    && r.by_week_no.is_empty()
                    && r.by_year_day.is_empty()
                    && r.by_month_day.is_empty()
                    && r.by_day.is_empty()
            }
            Frequency::Monthly => r.by_day.is_empty() && r.by_month_day.is_empty(),
            _ => false,
        }
    }

    /// Jump over the rest of a day rejected by the day level limits.
    fn skip_day(&mut self, seed: DateTime) {
        let Ok(tomorrow) = seed.date().tomorrow() else {
            self.done = true;
            return;
        };
        let unit: i64 = match self.rule.freq {
            Frequency::Hourly => 3_600,
            Frequency::Minutely => 60,
            _ => 1,
        };
        let step = unit * i64::from(self.rule.interval());
        let elapsed = self
            .civil_start
            .duration_until(tomorrow.to_datetime(Time::midnight()))
            .as_secs();
        let next = (elapsed + step - 1) / step;
        self.attempt = self.attempt.max(next);
    }

    /// Local times in a DST gap do not exist and are skipped.
    fn exists(&self, dt: DateTime) -> bool {
        match &self.time_zone {
            Some(tz) => !matches!(tz.to_ambiguous_zoned(dt).offset(), AmbiguousOffset::Gap { .. }),
            None => true,
        }
    }
}

impl Iterator for RuleStream<'_> {
    type Item = Temporal;

    fn next(&mut self) -> Option<Temporal> {
        while !self.done {
            let Some(dt) = self.pending.pop() else {
                self.done = !self.advance();
                continue;
            };
            let instance = self.start.with_civil(dt);
            let past_until = self.rule.until.as_ref().is_some_and(|u| exceeds(&instance, u));
            let past_count = self.rule.count.is_some_and(|c| self.emitted >= c);
            if past_until || past_count {
                self.done = true;
                self.pending.clear();
                return None;
            }
            self.emitted += 1;
            return Some(instance);
        }
        None
    }
}

/// Whether an instance lies after `UNTIL`. A DATE `UNTIL` bounds by date,
/// anything else by UTC instant.
fn exceeds(instance: &Temporal, until: &Temporal) -> bool {
    match until {
        Temporal::Date(date) => instance.civil_date() > *date,
        _ => instance.until_instant() > until.until_instant(),
    }
}

impl Component {
    /// Stream the recurrence set from `from` on; see [`occurrences`].
    ///
    /// # Errors
    ///
    /// [`RecurrenceError::MissingStart`] if there is no `DTSTART`.
    pub fn occurrences(&self, from: &Temporal) -> Result<Occurrences<'_>, RecurrenceError> {
        occurrences(self, from)
    }
}
