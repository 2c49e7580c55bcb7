// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Capabilities shared by several component kinds.
//!
//! Each trait covers one group of related properties. Getters read the
//! underlying [`Component`]; setters go through [`Component::set_single`] or
//! [`Component::add_property`] and are validated like any other mutation.
//! The `with_*` forms are eager builders: each call is checked on the spot.

use crate::component::Component;
use crate::keyword::{
    KW_ATTENDEE, KW_CATEGORIES, KW_DESCRIPTION, KW_DTEND, KW_DTSTAMP, KW_DTSTART, KW_DUE,
    KW_DURATION, KW_EXDATE, KW_LOCATION, KW_ORGANIZER, KW_RDATE, KW_RECURRENCE_ID, KW_RELATED_TO,
    KW_RRULE, KW_SUMMARY, KW_UID,
};
use crate::property::{Property, PropertyKind};
use crate::validate::ConsistencyError;
use crate::value::{RecurrenceRule, Temporal, Value, ValueDuration};

/// Typed wrappers around a [`Component`].
pub trait AsComponent {
    /// The wrapped component.
    fn component(&self) -> &Component;

    /// The wrapped component, mutably.
    fn component_mut(&mut self) -> &mut Component;
}

fn text_of<'a>(c: &'a Component, name: &str) -> Option<&'a str> {
    c.get_one(name).and_then(|p| p.value().as_text())
}

fn set(c: &mut Component, kind: PropertyKind, value: impl Into<Value>) -> Result<(), ConsistencyError> {
    c.set_single(Property::new(kind, value))
}

/// `UID` and `DTSTAMP`.
pub trait Identified: AsComponent {
    /// The unique identifier.
    fn uid(&self) -> Option<&str> {
        text_of(self.component(), KW_UID)
    }

    /// Set the unique identifier.
    ///
    /// # Errors
    ///
    /// Never for a well-formed component; kept fallible like every setter.
    fn set_uid(&mut self, uid: impl Into<String>) -> Result<(), ConsistencyError> {
        set(self.component_mut(), PropertyKind::Uid, Value::Text(uid.into()))
    }

    /// Builder form of [`set_uid`](Self::set_uid).
    ///
    /// # Errors
    ///
    /// See [`set_uid`](Self::set_uid).
    fn with_uid(mut self, uid: impl Into<String>) -> Result<Self, ConsistencyError>
    where
        Self: Sized,
    {
        self.set_uid(uid)?;
        Ok(self)
    }

    /// When the object was created or last sent.
    fn dtstamp(&self) -> Option<&Temporal> {
        self.component().temporal(KW_DTSTAMP)
    }

    /// Set `DTSTAMP`.
    ///
    /// # Errors
    ///
    /// If the value is not a DATE-TIME.
    fn set_dtstamp(&mut self, stamp: Temporal) -> Result<(), ConsistencyError> {
        set(self.component_mut(), PropertyKind::DtStamp, stamp)
    }

    /// Builder form of [`set_dtstamp`](Self::set_dtstamp).
    ///
    /// # Errors
    ///
    /// See [`set_dtstamp`](Self::set_dtstamp).
    fn with_dtstamp(mut self, stamp: Temporal) -> Result<Self, ConsistencyError>
    where
        Self: Sized,
    {
        self.set_dtstamp(stamp)?;
        Ok(self)
    }

    /// `RELATED-TO` identifiers, e.g. the series this one was split from.
    fn related_to(&self) -> Vec<&str> {
        self.component()
            .get(KW_RELATED_TO)
            .filter_map(|p| p.value().as_text())
            .collect()
    }

    /// Link to another component by its UID.
    ///
    /// # Errors
    ///
    /// Never for a well-formed component.
    fn add_related_to(&mut self, uid: impl Into<String>) -> Result<(), ConsistencyError> {
        let property = Property::new(PropertyKind::RelatedTo, Value::Text(uid.into()));
        self.component_mut().add_property(property)
    }
}

/// `DTSTART`.
pub trait Dated: AsComponent {
    /// The start.
    fn start(&self) -> Option<&Temporal> {
        self.component().temporal(KW_DTSTART)
    }

    /// Set the start.
    ///
    /// # Errors
    ///
    /// If the kind differs from `DTEND`, `DUE`, `RDATE` or `EXDATE`, or the
    /// start is not before `DTEND` or `DUE`.
    fn set_start(&mut self, start: Temporal) -> Result<(), ConsistencyError> {
        set(self.component_mut(), PropertyKind::DtStart, start)
    }

    /// Builder form of [`set_start`](Self::set_start).
    ///
    /// # Errors
    ///
    /// See [`set_start`](Self::set_start).
    fn with_start(mut self, start: Temporal) -> Result<Self, ConsistencyError>
    where
        Self: Sized,
    {
        self.set_start(start)?;
        Ok(self)
    }
}

/// `DTEND` or `DURATION` bounding a start.
pub trait Bounded: Dated {
    /// The explicit end.
    fn end(&self) -> Option<&Temporal> {
        self.component().temporal(KW_DTEND)
    }

    /// Set the end.
    ///
    /// # Errors
    ///
    /// If the kind differs from `DTSTART` or the end is not after it.
    fn set_end(&mut self, end: Temporal) -> Result<(), ConsistencyError> {
        set(self.component_mut(), PropertyKind::DtEnd, end)
    }

    /// Builder form of [`set_end`](Self::set_end).
    ///
    /// # Errors
    ///
    /// See [`set_end`](Self::set_end).
    fn with_end(mut self, end: Temporal) -> Result<Self, ConsistencyError>
    where
        Self: Sized,
    {
        self.set_end(end)?;
        Ok(self)
    }

    /// The explicit duration.
    fn duration(&self) -> Option<ValueDuration> {
        match self.component().get_one(KW_DURATION)?.value() {
            Value::Duration(d) => Some(*d),
            _ => None,
        }
    }

    /// Set the duration.
    ///
    /// # Errors
    ///
    /// Never for a well-formed component.
    fn set_duration(&mut self, duration: ValueDuration) -> Result<(), ConsistencyError> {
        set(self.component_mut(), PropertyKind::Duration, duration)
    }

    /// The end as given by `DTEND`, or `DTSTART` plus `DURATION`, or the day
    /// after a DATE start.
    fn effective_end(&self) -> Option<Temporal> {
        if let Some(end) = self.end() {
            return Some(end.clone());
        }
        let start = self.start()?;
        let span = match self.duration() {
            Some(duration) => duration.to_span().ok()?,
            None if matches!(start, Temporal::Date(_)) => jiff::Span::new().days(1),
            None => return Some(start.clone()),
        };
        let end = start.civil().checked_add(span).ok()?;
        Some(start.with_civil(end))
    }
}

/// `DUE` of a to-do.
pub trait Due: Dated {
    /// When the to-do is due.
    fn due(&self) -> Option<&Temporal> {
        self.component().temporal(KW_DUE)
    }

    /// Set the due date.
    ///
    /// # Errors
    ///
    /// If the kind differs from `DTSTART` or it is not after it.
    fn set_due(&mut self, due: Temporal) -> Result<(), ConsistencyError> {
        set(self.component_mut(), PropertyKind::Due, due)
    }

    /// Builder form of [`set_due`](Self::set_due).
    ///
    /// # Errors
    ///
    /// See [`set_due`](Self::set_due).
    fn with_due(mut self, due: Temporal) -> Result<Self, ConsistencyError>
    where
        Self: Sized,
    {
        self.set_due(due)?;
        Ok(self)
    }
}

/// `RRULE`, `RDATE` and `EXDATE`.
pub trait Recurring: Dated {
    /// The recurrence rule.
    fn rrule(&self) -> Option<&RecurrenceRule> {
        match self.component().get_one(KW_RRULE)?.value() {
            Value::Recur(rule) => Some(rule),
            _ => None,
        }
    }

    /// Set the recurrence rule.
    ///
    /// # Errors
    ///
    /// If the rule is invalid.
    fn set_rrule(&mut self, rule: RecurrenceRule) -> Result<(), ConsistencyError> {
        set(self.component_mut(), PropertyKind::RRule, rule)
    }

    /// Builder form of [`set_rrule`](Self::set_rrule).
    ///
    /// # Errors
    ///
    /// See [`set_rrule`](Self::set_rrule).
    fn with_rrule(mut self, rule: RecurrenceRule) -> Result<Self, ConsistencyError>
    where
        Self: Sized,
    {
        self.set_rrule(rule)?;
        Ok(self)
    }

    /// Every `RDATE` value, including period starts.
    fn rdates(&self) -> Vec<&Temporal> {
        self.component()
            .get(KW_RDATE)
            .flat_map(|p| p.value().temporals())
            .collect()
    }

    /// Add an `RDATE` property.
    ///
    /// # Errors
    ///
    /// If the values differ in kind from each other or from `DTSTART`.
    fn add_rdates(&mut self, dates: Vec<Temporal>) -> Result<(), ConsistencyError> {
        let property = Property::new(PropertyKind::RDate, Value::TemporalList(dates));
        self.component_mut().add_property(property)
    }

    /// Every `EXDATE` value.
    fn exdates(&self) -> Vec<&Temporal> {
        self.component()
            .get(KW_EXDATE)
            .flat_map(|p| p.value().temporals())
            .collect()
    }

    /// Add an `EXDATE` property.
    ///
    /// # Errors
    ///
    /// If the values differ in kind from each other or from `DTSTART`.
    fn add_exdates(&mut self, dates: Vec<Temporal>) -> Result<(), ConsistencyError> {
        let property = Property::new(PropertyKind::ExDate, Value::TemporalList(dates));
        self.component_mut().add_property(property)
    }

    /// Builder form of [`add_exdates`](Self::add_exdates).
    ///
    /// # Errors
    ///
    /// See [`add_exdates`](Self::add_exdates).
    fn with_exdates(mut self, dates: Vec<Temporal>) -> Result<Self, ConsistencyError>
    where
        Self: Sized,
    {
        self.add_exdates(dates)?;
        Ok(self)
    }
}

/// `RECURRENCE-ID` of an override.
pub trait Overriding: Dated {
    /// The original start of the occurrence this component replaces.
    fn recurrence_id(&self) -> Option<&Temporal> {
        self.component().temporal(KW_RECURRENCE_ID)
    }

    /// Set the replaced occurrence. Its kind is checked against the parent
    /// by the calendar holding both.
    ///
    /// # Errors
    ///
    /// If the value is not a DATE or DATE-TIME.
    fn set_recurrence_id(&mut self, id: Temporal) -> Result<(), ConsistencyError> {
        set(self.component_mut(), PropertyKind::RecurrenceId, id)
    }

    /// Builder form of [`set_recurrence_id`](Self::set_recurrence_id).
    ///
    /// # Errors
    ///
    /// See [`set_recurrence_id`](Self::set_recurrence_id).
    fn with_recurrence_id(mut self, id: Temporal) -> Result<Self, ConsistencyError>
    where
        Self: Sized,
    {
        self.set_recurrence_id(id)?;
        Ok(self)
    }
}

/// `SUMMARY`, `DESCRIPTION`, `LOCATION` and `CATEGORIES`.
pub trait Descriptive: AsComponent {
    /// The summary.
    fn summary(&self) -> Option<&str> {
        text_of(self.component(), KW_SUMMARY)
    }

    /// Set the summary.
    ///
    /// # Errors
    ///
    /// Never for a well-formed component.
    fn set_summary(&mut self, summary: impl Into<String>) -> Result<(), ConsistencyError> {
        set(self.component_mut(), PropertyKind::Summary, Value::Text(summary.into()))
    }

    /// Builder form of [`set_summary`](Self::set_summary).
    ///
    /// # Errors
    ///
    /// See [`set_summary`](Self::set_summary).
    fn with_summary(mut self, summary: impl Into<String>) -> Result<Self, ConsistencyError>
    where
        Self: Sized,
    {
        self.set_summary(summary)?;
        Ok(self)
    }

    /// The first description.
    fn description(&self) -> Option<&str> {
        text_of(self.component(), KW_DESCRIPTION)
    }

    /// Set the description, replacing every existing one.
    ///
    /// # Errors
    ///
    /// Never for a well-formed component.
    fn set_description(&mut self, text: impl Into<String>) -> Result<(), ConsistencyError> {
        set(self.component_mut(), PropertyKind::Description, Value::Text(text.into()))
    }

    /// Builder form of [`set_description`](Self::set_description).
    ///
    /// # Errors
    ///
    /// See [`set_description`](Self::set_description).
    fn with_description(mut self, text: impl Into<String>) -> Result<Self, ConsistencyError>
    where
        Self: Sized,
    {
        self.set_description(text)?;
        Ok(self)
    }

    /// The location.
    fn location(&self) -> Option<&str> {
        text_of(self.component(), KW_LOCATION)
    }

    /// Set the location.
    ///
    /// # Errors
    ///
    /// Never for a well-formed component.
    fn set_location(&mut self, location: impl Into<String>) -> Result<(), ConsistencyError> {
        set(self.component_mut(), PropertyKind::Location, Value::Text(location.into()))
    }

    /// Categories over every `CATEGORIES` property.
    fn categories(&self) -> Vec<&str> {
        self.component()
            .get(KW_CATEGORIES)
            .flat_map(|p| match p.value() {
                Value::TextList(list) => list.iter().map(String::as_str).collect(),
                Value::Text(s) => vec![s.as_str()],
                _ => Vec::new(),
            })
            .collect()
    }

    /// Add a `CATEGORIES` property.
    ///
    /// # Errors
    ///
    /// Never for a well-formed component.
    fn add_categories(&mut self, categories: Vec<String>) -> Result<(), ConsistencyError> {
        let property = Property::new(PropertyKind::Categories, Value::TextList(categories));
        self.component_mut().add_property(property)
    }
}

/// `ATTENDEE` and `ORGANIZER`.
pub trait Attended: AsComponent {
    /// Calendar addresses of the attendees.
    fn attendees(&self) -> Vec<&str> {
        self.component()
            .get(KW_ATTENDEE)
            .filter_map(|p| p.value().as_text())
            .collect()
    }

    /// Add an attendee by calendar address, e.g. `mailto:jane@example.com`.
    ///
    /// # Errors
    ///
    /// Never for a well-formed component.
    fn add_attendee(&mut self, address: impl Into<String>) -> Result<(), ConsistencyError> {
        let property = Property::new(PropertyKind::Attendee, Value::Uri(address.into()));
        self.component_mut().add_property(property)
    }

    /// Builder form of [`add_attendee`](Self::add_attendee).
    ///
    /// # Errors
    ///
    /// See [`add_attendee`](Self::add_attendee).
    fn with_attendee(mut self, address: impl Into<String>) -> Result<Self, ConsistencyError>
    where
        Self: Sized,
    {
        self.add_attendee(address)?;
        Ok(self)
    }

    /// Calendar address of the organizer.
    fn organizer(&self) -> Option<&str> {
        text_of(self.component(), KW_ORGANIZER)
    }

    /// Set the organizer.
    ///
    /// # Errors
    ///
    /// Never for a well-formed component.
    fn set_organizer(&mut self, address: impl Into<String>) -> Result<(), ConsistencyError> {
        set(self.component_mut(), PropertyKind::Organizer, Value::Uri(address.into()))
    }
}
