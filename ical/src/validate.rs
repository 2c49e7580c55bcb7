// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Consistency rules across the properties of a component.
//!
//! Rules come in two tiers. Hard rules are checked by [`check_insert`] on
//! every mutation and reject it with a [`ConsistencyError`], leaving the
//! component untouched. Soft rules, such as required properties, are only
//! collected on demand by [`errors`], since a component under construction
//! is expected to break them for a while.

use crate::component::{Component, ComponentKind};
use crate::keyword::{
    KW_ACTION, KW_ACTION_DISPLAY, KW_ACTION_EMAIL, KW_ATTENDEE, KW_DESCRIPTION, KW_DTEND,
    KW_DTSTART, KW_DUE, KW_DURATION, KW_REPEAT, KW_RRULE, KW_SUMMARY,
};
use crate::property::{Property, PropertyKind, PropertyName};
use crate::value::{DateTimeKind, RuleError, Temporal, Value};

/// A mutation that would break a hard invariant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConsistencyError {
    /// A date or date-time of a different kind than `DTSTART`.
    #[error("{property} is a {found} but DTSTART is a {expected}, they MUST be of the same type")]
    KindMismatch {
        /// Name of the offending property
        property: String,
        /// Kind of `DTSTART`
        expected: DateTimeKind,
        /// Kind of the offending value
        found: DateTimeKind,
    },

    /// `DTEND` or `DUE` at or before `DTSTART`.
    #[error("{property} MUST be later in time than DTSTART")]
    NotAfterStart {
        /// Name of the offending property
        property: String,
    },

    /// A list of dates and date-times of different kinds.
    #[error("all values of {property} MUST be of the same type")]
    MixedKinds {
        /// Name of the offending property
        property: String,
    },

    /// A second instance of a property that may occur only once.
    #[error("{property} MUST NOT occur more than once in {component}")]
    MultipleNotAllowed {
        /// Name of the property
        property: String,
        /// Kind of the owning component
        component: ComponentKind,
    },

    /// A sub-component the parent kind may not hold.
    #[error("{child} is not allowed inside {parent}")]
    ChildNotAllowed {
        /// Kind of the parent
        parent: ComponentKind,
        /// Kind of the rejected child
        child: ComponentKind,
    },

    /// `VALUE` or `TZID` disagreeing with the value.
    #[error("{property}: {reason}")]
    DeclaredValueMismatch {
        /// Name of the property
        property: String,
        /// What disagrees
        reason: String,
    },

    /// An `RRULE` breaking the recurrence rule grammar.
    #[error(transparent)]
    InvalidRule(#[from] RuleError),
}

/// Check the hard invariants of adding `new` to a component of `kind` that
/// already holds `existing`.
///
/// The check does not depend on insertion order: `DTEND` added before
/// `DTSTART` is checked when `DTSTART` arrives.
///
/// # Errors
///
/// The first hard invariant broken.
pub fn check_insert<'a>(
    kind: ComponentKind,
    existing: impl IntoIterator<Item = &'a Property> + Clone,
    new: &Property,
) -> Result<(), ConsistencyError> {
    new.check_declared()?;

    if let Value::Recur(rule) = new.value() {
        rule.validate()?;
    }

    let name = new.name().to_string();
    if !kind.is_repeatable(new.name()) && existing.clone().into_iter().any(|p| p.is(&name)) {
        return Err(ConsistencyError::MultipleNotAllowed {
            property: name,
            component: kind,
        });
    }

    if let Some(Err(())) = new.temporal_kind() {
        return Err(ConsistencyError::MixedKinds {
            property: new.name().to_string(),
        });
    }

    match new.kind() {
        Some(PropertyKind::DtStart) => {
            let Some(start) = new.temporal() else {
                return Ok(());
            };
            existing
                .into_iter()
                .filter(|p| p.kind().is_some_and(PropertyKind::is_start_relative))
                .try_for_each(|p| check_against_start(start, p))
        }
        Some(k) if k.is_start_relative() => {
            let start = existing
                .into_iter()
                .find(|p| p.kind() == Some(PropertyKind::DtStart))
                .and_then(Property::temporal);
            match start {
                Some(start) => check_against_start(start, new),
                None => Ok(()),
            }
        }
        _ => Ok(()),
    }
}

fn check_against_start(start: &Temporal, property: &Property) -> Result<(), ConsistencyError> {
    let expected = start.kind();
    if let Some(Ok(found)) = property.temporal_kind()
        && found != expected
    {
        return Err(ConsistencyError::KindMismatch {
            property: property.name().to_string(),
            expected,
            found,
        });
    }

    if matches!(property.kind(), Some(PropertyKind::DtEnd | PropertyKind::Due))
        && let Some(end) = property.temporal()
        && end <= start
    {
        return Err(ConsistencyError::NotAfterStart {
            property: property.name().to_string(),
        });
    }
    Ok(())
}

/// Collect the soft invariants broken by `component` and its children, in a
/// stable order. Children's messages are prefixed with their kind.
#[must_use]
pub fn errors(component: &Component) -> Vec<String> {
    let kind = component.kind();
    let mut errors = Vec::new();

    for required in required_properties(kind) {
        match component.get(required.name()).count() {
            0 => errors.push(format!(
                "{required} is not present. {required} is REQUIRED and MUST NOT occur more than once"
            )),
            1 => {}
            _ => errors.push(format!("{required} is REQUIRED and MUST NOT occur more than once")),
        }
    }

    for property in component.properties() {
        if let PropertyName::Known(p) = property.name()
            && !is_allowed(kind, *p)
        {
            errors.push(format!("{p} is not a property of {kind}"));
        }
    }

    let has = |name: &str| component.get_one(name).is_some();
    match kind {
        ComponentKind::VEvent if has(KW_DTEND) && has(KW_DURATION) => errors.push(
            "DTEND and DURATION are both present. Either DTEND or DURATION MAY appear, but they MUST NOT occur in the same VEVENT".to_string(),
        ),
        ComponentKind::VTodo => {
            if has(KW_DUE) && has(KW_DURATION) {
                errors.push("DUE and DURATION are both present. Either DUE or DURATION MAY appear, but they MUST NOT occur in the same VTODO".to_string());
            }
            if has(KW_DURATION) && !has(KW_DTSTART) {
                errors.push("DURATION is present without DTSTART. If DURATION appears in a VTODO, then DTSTART MUST also appear".to_string());
            }
        }
        ComponentKind::VAlarm => errors.extend(alarm_errors(component)),
        ComponentKind::VTimeZone
            if !component.children().iter().any(|c| c.kind().is_observance()) =>
        {
            errors.push(
                "VTIMEZONE has no observance. One of STANDARD or DAYLIGHT MUST occur".to_string(),
            );
        }
        _ => {}
    }

    if has(KW_RRULE) && !has(KW_DTSTART) {
        errors.push("RRULE is present without DTSTART. DTSTART is REQUIRED when RRULE is present".to_string());
    }
    errors.extend(until_errors(component));

    for child in component.children() {
        let child_kind = child.kind();
        errors.extend(self::errors(child).into_iter().map(|e| format!("{child_kind}: {e}")));
    }
    errors
}

fn alarm_errors(alarm: &Component) -> Vec<String> {
    let mut errors = Vec::new();
    let has = |name: &str| alarm.get_one(name).is_some();
    if has(KW_DURATION) != has(KW_REPEAT) {
        errors.push("DURATION and REPEAT are both OPTIONAL, but if one occurs, so MUST the other".to_string());
    }

    let action = alarm
        .get_one(KW_ACTION)
        .and_then(|p| p.value().as_text())
        .map(str::to_ascii_uppercase);
    let needed: &[&str] = match action.as_deref() {
        Some(KW_ACTION_DISPLAY) => &[KW_DESCRIPTION],
        Some(KW_ACTION_EMAIL) => &[KW_DESCRIPTION, KW_SUMMARY, KW_ATTENDEE],
        _ => &[],
    };
    if let Some(action) = action {
        for name in needed {
            if !has(name) {
                errors.push(format!("{name} is not present. {name} is REQUIRED for an {action} alarm"));
            }
        }
    }
    errors
}

fn until_errors(component: &Component) -> Option<String> {
    let until = component.get_one(KW_RRULE).and_then(|p| match p.value() {
        Value::Recur(rule) => rule.until.as_ref(),
        _ => None,
    })?;

    if component.kind().is_observance() {
        return (until.kind() != DateTimeKind::Utc).then(|| {
            format!("UNTIL of {} MUST be specified as a date with UTC time", component.kind())
        });
    }

    let start = component.get_one(KW_DTSTART).and_then(Property::temporal)?;
    let expected = match start.kind() {
        DateTimeKind::Date => DateTimeKind::Date,
        DateTimeKind::Floating => DateTimeKind::Floating,
        DateTimeKind::Zoned | DateTimeKind::Utc => DateTimeKind::Utc,
    };
    (until.kind() != expected).then(|| {
        format!(
            "UNTIL is a {} but DTSTART is a {}, UNTIL MUST be a {expected}",
            until.kind(),
            start.kind(),
        )
    })
}

/// Properties that MUST occur exactly once.
fn required_properties(kind: ComponentKind) -> &'static [PropertyKind] {
    use PropertyKind as P;
    match kind {
        ComponentKind::VCalendar => &[P::ProdId, P::Version],
        ComponentKind::VEvent => &[P::DtStamp, P::Uid, P::DtStart],
        ComponentKind::VTodo | ComponentKind::VJournal | ComponentKind::VFreeBusy => {
            &[P::DtStamp, P::Uid]
        }
        ComponentKind::VTimeZone => &[P::TzId],
        ComponentKind::Standard | ComponentKind::Daylight => {
            &[P::DtStart, P::TzOffsetTo, P::TzOffsetFrom]
        }
        ComponentKind::VAlarm => &[P::Action, P::Trigger],
    }
}

/// Whether a standard property may appear in `kind`. Extension properties
/// are allowed everywhere.
fn is_allowed(kind: ComponentKind, property: PropertyKind) -> bool {
    use PropertyKind as P;
    match kind {
        ComponentKind::VCalendar => {
            matches!(property, P::ProdId | P::Version | P::CalScale | P::Method)
        }
        ComponentKind::VEvent => matches!(
            property,
            P::DtStamp | P::Uid | P::DtStart | P::Class | P::Created | P::Description | P::Geo
                | P::LastModified | P::Location | P::Organizer | P::Priority | P::Sequence
                | P::Status | P::Summary | P::Transp | P::Url | P::RecurrenceId | P::RRule
                | P::DtEnd | P::Duration | P::Attach | P::Attendee | P::Categories | P::Comment
                | P::Contact | P::ExDate | P::RequestStatus | P::RelatedTo | P::Resources
                | P::RDate
        ),
        ComponentKind::VTodo => matches!(
            property,
            P::DtStamp | P::Uid | P::Class | P::Completed | P::Created | P::Description
                | P::DtStart | P::Geo | P::LastModified | P::Location | P::Organizer
                | P::PercentComplete | P::Priority | P::RecurrenceId | P::Sequence | P::Status
                | P::Summary | P::Url | P::RRule | P::Due | P::Duration | P::Attach | P::Attendee
                | P::Categories | P::Comment | P::Contact | P::ExDate | P::RequestStatus
                | P::RelatedTo | P::Resources | P::RDate
        ),
        ComponentKind::VJournal => matches!(
            property,
            P::DtStamp | P::Uid | P::Class | P::Created | P::DtStart | P::LastModified
                | P::Organizer | P::RecurrenceId | P::Sequence | P::Status | P::Summary | P::Url
                | P::RRule | P::Attach | P::Attendee | P::Categories | P::Comment | P::Contact
                | P::Description | P::ExDate | P::RelatedTo | P::RDate | P::RequestStatus
        ),
        ComponentKind::VFreeBusy => matches!(
            property,
            P::DtStamp | P::Uid | P::Contact | P::DtStart | P::DtEnd | P::Organizer | P::Url
                | P::Attendee | P::Comment | P::FreeBusy | P::RequestStatus
        ),
        ComponentKind::VTimeZone => matches!(property, P::TzId | P::LastModified | P::TzUrl),
        ComponentKind::Standard | ComponentKind::Daylight => matches!(
            property,
            P::DtStart | P::TzOffsetTo | P::TzOffsetFrom | P::RRule | P::Comment | P::RDate
                | P::TzName
        ),
        ComponentKind::VAlarm => matches!(
            property,
            P::Action | P::Trigger | P::Duration | P::Repeat | P::Attach | P::Description
                | P::Summary | P::Attendee
        ),
    }
}

#[cfg(test)]
mod tests {
    use jiff::civil::{date, datetime};

    use super::*;
    use crate::value::RecurrenceRule;

    fn start_date() -> Property {
        Property::new(PropertyKind::DtStart, Temporal::Date(date(2015, 11, 9)))
    }

    #[test]
    fn rejects_end_of_other_kind() {
        let end = Property::new(
            PropertyKind::DtEnd,
            Temporal::Floating(datetime(2015, 11, 10, 10, 0, 0, 0)),
        );
        let start = start_date();
        let err = check_insert(ComponentKind::VEvent, [&start], &end).unwrap_err();
        assert_eq!(
            err,
            ConsistencyError::KindMismatch {
                property: "DTEND".to_string(),
                expected: DateTimeKind::Date,
                found: DateTimeKind::Floating,
            }
        );

        // order independent
        let err = check_insert(ComponentKind::VEvent, [&end], &start).unwrap_err();
        assert!(matches!(err, ConsistencyError::KindMismatch { .. }));
    }

    #[test]
    fn rejects_end_not_after_start() {
        let start = start_date();
        let end = Property::new(PropertyKind::DtEnd, Temporal::Date(date(2015, 11, 9)));
        let err = check_insert(ComponentKind::VEvent, [&start], &end).unwrap_err();
        assert!(matches!(err, ConsistencyError::NotAfterStart { .. }));

        let end = Property::new(PropertyKind::DtEnd, Temporal::Date(date(2015, 11, 10)));
        assert!(check_insert(ComponentKind::VEvent, [&start], &end).is_ok());
    }

    #[test]
    fn rejects_mixed_lists() {
        let exdate = Property::new(
            PropertyKind::ExDate,
            Value::TemporalList(vec![
                Temporal::Date(date(2015, 11, 10)),
                Temporal::Utc(datetime(2015, 11, 11, 9, 0, 0, 0)),
            ]),
        );
        let err = check_insert(ComponentKind::VEvent, [], &exdate).unwrap_err();
        assert!(matches!(err, ConsistencyError::MixedKinds { .. }));
    }

    #[test]
    fn rejects_repeated_singletons() {
        let start = start_date();
        let err = check_insert(ComponentKind::VEvent, [&start], &start_date()).unwrap_err();
        assert!(matches!(err, ConsistencyError::MultipleNotAllowed { .. }));

        let comment = Property::new(PropertyKind::Comment, Value::Text("a".to_string()));
        assert!(check_insert(ComponentKind::VEvent, [&comment], &comment).is_ok());
    }

    #[test]
    fn rejects_invalid_rules() {
        let mut rule = RecurrenceRule::parse("FREQ=WEEKLY").unwrap();
        rule.by_week_no = vec![20];
        let rrule = Property::new(PropertyKind::RRule, rule);
        let err = check_insert(ComponentKind::VEvent, [], &rrule).unwrap_err();
        assert!(matches!(err, ConsistencyError::InvalidRule(_)));
    }

    #[test]
    fn reports_missing_required() {
        let event = Component::new(ComponentKind::VEvent);
        let errors = errors(&event);
        assert_eq!(
            errors,
            [
                "DTSTAMP is not present. DTSTAMP is REQUIRED and MUST NOT occur more than once",
                "UID is not present. UID is REQUIRED and MUST NOT occur more than once",
                "DTSTART is not present. DTSTART is REQUIRED and MUST NOT occur more than once",
            ]
        );
    }

    #[test]
    fn reports_alarm_pairs() {
        let mut alarm = Component::new(ComponentKind::VAlarm);
        alarm
            .add_property(Property::new(PropertyKind::Action, Value::Text("DISPLAY".to_string())))
            .unwrap();
        alarm
            .add_property(Property::new(PropertyKind::Repeat, Value::Integer(2)))
            .unwrap();
        let errors = errors(&alarm);
        assert!(errors.iter().any(|e| e.starts_with("TRIGGER is not present")));
        assert!(errors.iter().any(|e| e.starts_with("DURATION and REPEAT")));
        assert!(errors.iter().any(|e| e.starts_with("DESCRIPTION is not present")));
    }

    #[test]
    fn prefixes_child_errors_with_kind() {
        let mut todo = Component::new(ComponentKind::VTodo);
        todo.add_child(Component::new(ComponentKind::VAlarm)).unwrap();
        let errors = errors(&todo);
        assert!(errors.iter().any(|e| e.starts_with("UID is not present")));
        assert!(errors.iter().any(|e| e.starts_with("VALARM: ACTION is not present")));
        assert!(errors.iter().any(|e| e.starts_with("VALARM: TRIGGER is not present")));
    }

    #[test]
    fn reports_until_kind() {
        let mut event = Component::new(ComponentKind::VEvent);
        event
            .add_property(Property::new(
                PropertyKind::DtStart,
                Temporal::zoned(datetime(2015, 11, 9, 9, 0, 0, 0), "Europe/Berlin"),
            ))
            .unwrap();
        event
            .add_property(Property::new(
                PropertyKind::RRule,
                RecurrenceRule::parse("FREQ=DAILY;UNTIL=20151120T090000").unwrap(),
            ))
            .unwrap();
        let errors = errors(&event);
        assert!(errors.iter().any(|e| e.starts_with("UNTIL is a floating DATE-TIME")));
        assert_eq!(errors, super::errors(&event));
    }
}
