// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Occurrences of a series once its overrides are taken into account.

use agendum_ical::keyword::{KW_DTSTART, KW_EXDATE, KW_RDATE, KW_RECURRENCE_ID, KW_RRULE};
use agendum_ical::{
    Component, ComponentKind, Property, PropertyKind, RecurrenceError, RecurrenceRule, Temporal,
    Value,
};

use super::{Calendar, CalendarError, ComponentId, uid_of};

/// One entry of a series view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesOccurrence {
    /// When this occurrence starts.
    pub start: Temporal,
    /// The series itself, or the override replacing this occurrence.
    pub component: ComponentId,
    /// The occurrence replaced, for overrides.
    pub recurrence_id: Option<Temporal>,
}

impl Calendar {
    /// Occurrences of a series from `from` on, without those replaced by an
    /// override.
    ///
    /// # Errors
    ///
    /// If there is no such component or it has no `DTSTART`.
    pub fn occurrences<'a>(
        &'a self,
        id: ComponentId,
        from: &Temporal,
    ) -> Result<impl Iterator<Item = Temporal> + 'a, CalendarError> {
        let component = self.get(id).ok_or(CalendarError::UnknownComponentId(id))?;
        let start = component
            .temporal(KW_DTSTART)
            .ok_or(RecurrenceError::MissingStart)?;

        let mut replaced: Vec<Temporal> = self
            .recurrence_children(id)
            .into_iter()
            .filter_map(|(_, c)| c.temporal(KW_RECURRENCE_ID))
            .map(|rid| rid.coerce_like(start))
            .collect();
        replaced.sort();
        replaced.dedup();

        let occurrences = agendum_ical::occurrences(component, from)?;
        Ok(occurrences.filter(move |t| replaced.binary_search(t).is_err()))
    }

    /// [`occurrences`](Self::occurrences) within `[start, end)`.
    ///
    /// # Errors
    ///
    /// See [`occurrences`](Self::occurrences).
    pub fn occurrences_between<'a>(
        &'a self,
        id: ComponentId,
        start: &Temporal,
        end: &Temporal,
    ) -> Result<impl Iterator<Item = Temporal> + 'a, CalendarError> {
        let series_start = self
            .get(id)
            .and_then(|c| c.temporal(KW_DTSTART))
            .ok_or(RecurrenceError::MissingStart)?;
        let end = end.coerce_like(series_start);
        let occurrences = self.occurrences(id, start)?;
        Ok(occurrences.take_while(move |t| *t < end))
    }

    /// Ascending view of a series from `from` on, where each override takes
    /// the place of the occurrence it replaces, at its own start.
    ///
    /// Override starts are converted to the kind of the series' `DTSTART`.
    ///
    /// # Errors
    ///
    /// See [`occurrences`](Self::occurrences).
    pub fn series<'a>(
        &'a self,
        id: ComponentId,
        from: &Temporal,
    ) -> Result<impl Iterator<Item = SeriesOccurrence> + 'a, CalendarError> {
        let mut occurrences = self.occurrences(id, from)?.peekable();
        let start = self
            .get(id)
            .and_then(|c| c.temporal(KW_DTSTART))
            .ok_or(RecurrenceError::MissingStart)?;
        let from = from.coerce_like(start);

        let mut moved: Vec<SeriesOccurrence> = self
            .recurrence_children(id)
            .into_iter()
            .filter_map(|(child, c)| {
                let rid = c.temporal(KW_RECURRENCE_ID)?;
                let own = c.temporal(KW_DTSTART).unwrap_or(rid);
                Some(SeriesOccurrence {
                    start: own.coerce_like(start),
                    component: child,
                    recurrence_id: Some(rid.clone()),
                })
            })
            .filter(|o| o.start >= from)
            .collect();
        moved.sort_by(|a, b| a.start.cmp(&b.start));
        let mut moved = moved.into_iter().peekable();

        Ok(std::iter::from_fn(move || {
            let take_moved = match (occurrences.peek(), moved.peek()) {
                (Some(next), Some(o)) => o.start <= *next,
                (None, Some(_)) => true,
                (_, None) => false,
            };
            if take_moved {
                moved.next()
            } else {
                occurrences.next().map(|start| SeriesOccurrence {
                    start,
                    component: id,
                    recurrence_id: None,
                })
            }
        }))
    }

    /// A detached override of one occurrence of a series, ready to be
    /// edited and added with [`add_child`](Self::add_child).
    ///
    /// The copy drops `RRULE`, `RDATE` and `EXDATE`, takes the occurrence as
    /// `DTSTART` and `RECURRENCE-ID`, and moves `DTEND` or `DUE` along.
    ///
    /// # Errors
    ///
    /// If the component is not a series, `occurrence` is not one of its
    /// occurrences, or is already overridden.
    pub fn split_override(
        &self,
        id: ComponentId,
        occurrence: &Temporal,
    ) -> Result<Component, CalendarError> {
        let parent = self.get(id).ok_or(CalendarError::UnknownComponentId(id))?;
        if parent.get_one(KW_RECURRENCE_ID).is_some() {
            return Err(CalendarError::NotASeries(id));
        }
        let start = parent
            .temporal(KW_DTSTART)
            .ok_or(RecurrenceError::MissingStart)?;
        let uid = uid_of(parent).unwrap_or_default().to_string();

        let occurrence = occurrence.coerce_like(start);
        if !agendum_ical::is_occurrence(parent, &occurrence)? {
            return Err(CalendarError::NotAnOccurrence { uid, occurrence });
        }
        let overridden = self
            .recurrence_children(id)
            .iter()
            .filter_map(|(_, c)| c.temporal(KW_RECURRENCE_ID))
            .any(|rid| rid.coerce_like(start) == occurrence);
        if overridden {
            return Err(CalendarError::DuplicateComponent {
                uid,
                recurrence_id: Some(occurrence),
            });
        }

        let shift = start.civil().until(occurrence.civil())?;
        let mut split = Component::new(parent.kind());
        for property in parent.properties() {
            if [KW_RRULE, KW_RDATE, KW_EXDATE].iter().any(|n| property.is(n)) {
                continue;
            }
            if property.is(KW_DTSTART) {
                split.add_property(Property::new(PropertyKind::DtStart, occurrence.clone()))?;
                split.add_property(Property::new(PropertyKind::RecurrenceId, occurrence.clone()))?;
                continue;
            }
            let moved = match (property.kind(), property.temporal()) {
                (Some(kind @ (PropertyKind::DtEnd | PropertyKind::Due)), Some(end)) => {
                    let civil = end.civil().checked_add(shift)?;
                    Property::new(kind, Value::Temporal(end.with_civil(civil)))
                }
                _ => property.clone(),
            };
            split.add_property(moved)?;
        }
        for child in parent.children() {
            split.add_child(child.clone())?;
        }
        tracing::debug!(%uid, %occurrence, "split override from series");
        Ok(split)
    }

    /// End a series just before `occurrence` by rewriting its rule with an
    /// `UNTIL`, e.g. to continue it as a new series from there. A rule
    /// whose `COUNT` runs out before `occurrence` is left unchanged. Overrides
    /// left outside the shortened set are reported by
    /// [`orphaned_children`](Self::orphaned_children).
    ///
    /// # Errors
    ///
    /// If the component has no `RRULE` or the bound is out of range.
    pub fn truncate_series(
        &mut self,
        id: ComponentId,
        occurrence: &Temporal,
    ) -> Result<(), CalendarError> {
        self.update(id, |component| -> Result<(), CalendarError> {
            let start = component
                .temporal(KW_DTSTART)
                .ok_or(RecurrenceError::MissingStart)?
                .clone();
            let Some(Value::Recur(rule)) = component.get_one(KW_RRULE).map(Property::value)
            else {
                return Err(CalendarError::NotASeries(id));
            };
            let bound = occurrence.coerce_like(&start);
            if rule.count.is_some() {
                // a counted rule already ending before the bound stays as is
                let last = last_rule_instance(component.kind(), &start, rule)?;
                if last.is_some_and(|last| last < bound) {
                    tracing::debug!(%bound, "series already ends before the bound");
                    return Ok(());
                }
            }
            let rule = rule.truncated_before(&bound)?;
            component.set_single(Property::new(PropertyKind::RRule, rule))?;
            Ok(())
        })
    }
}

/// The last instance of a finite rule anchored at `start`, `RDATE` and
/// `EXDATE` aside.
fn last_rule_instance(
    kind: ComponentKind,
    start: &Temporal,
    rule: &RecurrenceRule,
) -> Result<Option<Temporal>, CalendarError> {
    let mut rule_only = Component::new(kind);
    rule_only.add_property(Property::new(PropertyKind::DtStart, start.clone()))?;
    rule_only.add_property(Property::new(PropertyKind::RRule, rule.clone()))?;
    Ok(agendum_ical::occurrences(&rule_only, start)?.last())
}
