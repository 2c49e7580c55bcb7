// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Typed views of each component kind.

use std::ops::Deref;

use crate::component::capability::{
    AsComponent, Attended, Bounded, Dated, Descriptive, Due, Identified, Overriding, Recurring,
};
use crate::component::{Component, ComponentKind};
use crate::keyword::{KW_ACTION, KW_TRIGGER, KW_TZID, KW_TZOFFSETFROM, KW_TZOFFSETTO};
use crate::property::{Property, PropertyKind};
use crate::validate::ConsistencyError;
use crate::value::{Value, ValueDuration, ValueUtcOffset};

/// Macro to define a component newtype.
///
/// Usage: `component_newtype!(Name => Kind | Kind; Trait, Trait)`
macro_rules! component_newtype {
    (
        $(#[$attr:meta])*
        $name:ident => $($kind:ident)|+ ; $($capability:ident),*
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq)]
        pub struct $name(Component);

        impl AsComponent for $name {
            fn component(&self) -> &Component {
                &self.0
            }

            fn component_mut(&mut self) -> &mut Component {
                &mut self.0
            }
        }

        impl Deref for $name {
            type Target = Component;

            fn deref(&self) -> &Component {
                &self.0
            }
        }

        impl TryFrom<Component> for $name {
            type Error = Component;

            fn try_from(component: Component) -> Result<Self, Component> {
                match component.kind() {
                    $(ComponentKind::$kind)|+ => Ok(Self(component)),
                    _ => Err(component),
                }
            }
        }

        impl From<$name> for Component {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        $(impl $capability for $name {})*
    };
}

component_newtype! {
    /// An event, `VEVENT`.
    VEvent => VEvent; Identified, Dated, Bounded, Recurring, Overriding, Descriptive, Attended
}

component_newtype! {
    /// A to-do, `VTODO`.
    VTodo => VTodo; Identified, Dated, Due, Recurring, Overriding, Descriptive, Attended
}

component_newtype! {
    /// A journal entry, `VJOURNAL`.
    VJournal => VJournal; Identified, Dated, Recurring, Overriding, Descriptive, Attended
}

component_newtype! {
    /// A free/busy request or reply, `VFREEBUSY`.
    VFreeBusy => VFreeBusy; Identified, Dated, Bounded, Attended
}

component_newtype! {
    /// A time zone definition, `VTIMEZONE`.
    VTimeZone => VTimeZone;
}

component_newtype! {
    /// A `STANDARD` or `DAYLIGHT` observance of a time zone.
    Observance => Standard | Daylight; Dated, Recurring
}

component_newtype! {
    /// An alarm, `VALARM`.
    VAlarm => VAlarm; Descriptive, Attended
}

impl VEvent {
    /// An empty event.
    #[must_use]
    pub fn new() -> Self {
        Self(Component::new(ComponentKind::VEvent))
    }

    /// The alarms of the event.
    pub fn alarms(&self) -> impl Iterator<Item = &Component> {
        self.0.children().iter()
    }

    /// Attach an alarm.
    ///
    /// # Errors
    ///
    /// Never, an event always accepts alarms.
    pub fn add_alarm(&mut self, alarm: VAlarm) -> Result<(), ConsistencyError> {
        self.0.add_child(alarm.into())
    }
}

impl Default for VEvent {
    fn default() -> Self {
        Self::new()
    }
}

impl VTodo {
    /// An empty to-do.
    #[must_use]
    pub fn new() -> Self {
        Self(Component::new(ComponentKind::VTodo))
    }

    /// The duration, if set instead of `DUE`.
    #[must_use]
    pub fn duration(&self) -> Option<ValueDuration> {
        match self.0.get_one(crate::keyword::KW_DURATION)?.value() {
            Value::Duration(d) => Some(*d),
            _ => None,
        }
    }

    /// Attach an alarm.
    ///
    /// # Errors
    ///
    /// Never, a to-do always accepts alarms.
    pub fn add_alarm(&mut self, alarm: VAlarm) -> Result<(), ConsistencyError> {
        self.0.add_child(alarm.into())
    }
}

impl Default for VTodo {
    fn default() -> Self {
        Self::new()
    }
}

impl VJournal {
    /// An empty journal entry.
    #[must_use]
    pub fn new() -> Self {
        Self(Component::new(ComponentKind::VJournal))
    }
}

impl Default for VJournal {
    fn default() -> Self {
        Self::new()
    }
}

impl VFreeBusy {
    /// An empty free/busy component.
    #[must_use]
    pub fn new() -> Self {
        Self(Component::new(ComponentKind::VFreeBusy))
    }
}

impl Default for VFreeBusy {
    fn default() -> Self {
        Self::new()
    }
}

impl VTimeZone {
    /// A time zone definition for `tzid`, without observances.
    ///
    /// # Errors
    ///
    /// Never for a fresh component.
    pub fn new(tzid: impl Into<String>) -> Result<Self, ConsistencyError> {
        let mut component = Component::new(ComponentKind::VTimeZone);
        component.add_property(Property::new(PropertyKind::TzId, Value::Text(tzid.into())))?;
        Ok(Self(component))
    }

    /// The time zone identifier.
    #[must_use]
    pub fn tzid(&self) -> Option<&str> {
        self.0.get_one(KW_TZID).and_then(|p| p.value().as_text())
    }

    /// The observances, in order.
    pub fn observances(&self) -> impl Iterator<Item = Observance> + '_ {
        self.0
            .children()
            .iter()
            .filter_map(|c| Observance::try_from(c.clone()).ok())
    }

    /// Add an observance.
    ///
    /// # Errors
    ///
    /// Never, a time zone always accepts observances.
    pub fn add_observance(&mut self, observance: Observance) -> Result<(), ConsistencyError> {
        self.0.add_child(observance.into())
    }
}

impl Observance {
    /// An empty `STANDARD` observance.
    #[must_use]
    pub fn standard() -> Self {
        Self(Component::new(ComponentKind::Standard))
    }

    /// An empty `DAYLIGHT` observance.
    #[must_use]
    pub fn daylight() -> Self {
        Self(Component::new(ComponentKind::Daylight))
    }

    /// Whether this is a `DAYLIGHT` observance.
    #[must_use]
    pub fn is_daylight(&self) -> bool {
        self.0.kind() == ComponentKind::Daylight
    }

    /// The offset in use before the onset.
    #[must_use]
    pub fn offset_from(&self) -> Option<ValueUtcOffset> {
        offset(&self.0, KW_TZOFFSETFROM)
    }

    /// The offset in use from the onset.
    #[must_use]
    pub fn offset_to(&self) -> Option<ValueUtcOffset> {
        offset(&self.0, KW_TZOFFSETTO)
    }

    /// Set both offsets.
    ///
    /// # Errors
    ///
    /// Never for a well-formed observance.
    pub fn set_offsets(
        &mut self,
        from: ValueUtcOffset,
        to: ValueUtcOffset,
    ) -> Result<(), ConsistencyError> {
        self.0
            .set_single(Property::new(PropertyKind::TzOffsetFrom, Value::UtcOffset(from)))?;
        self.0
            .set_single(Property::new(PropertyKind::TzOffsetTo, Value::UtcOffset(to)))
    }
}

fn offset(component: &Component, name: &str) -> Option<ValueUtcOffset> {
    match component.get_one(name)?.value() {
        Value::UtcOffset(offset) => Some(*offset),
        _ => None,
    }
}

impl VAlarm {
    /// An alarm with the given `ACTION` and `TRIGGER`.
    ///
    /// # Errors
    ///
    /// If the trigger is not a DURATION or UTC DATE-TIME.
    pub fn new(action: impl Into<String>, trigger: impl Into<Value>) -> Result<Self, ConsistencyError> {
        let mut component = Component::new(ComponentKind::VAlarm);
        component.add_property(Property::new(PropertyKind::Action, Value::Text(action.into())))?;
        component.add_property(Property::new(PropertyKind::Trigger, trigger))?;
        Ok(Self(component))
    }

    /// The `ACTION`, e.g. `DISPLAY`.
    #[must_use]
    pub fn action(&self) -> Option<&str> {
        self.0.get_one(KW_ACTION).and_then(|p| p.value().as_text())
    }

    /// The `TRIGGER` value.
    #[must_use]
    pub fn trigger(&self) -> Option<&Value> {
        self.0.get_one(KW_TRIGGER).map(Property::value)
    }
}

#[cfg(test)]
mod tests {
    use jiff::civil::{date, datetime};

    use super::*;
    use crate::value::{RecurrenceRule, Temporal};

    #[test]
    fn builds_event_fluently() {
        let event = VEvent::new()
            .with_uid("1@example.com")
            .and_then(|e| e.with_dtstamp(Temporal::Utc(datetime(2015, 11, 1, 0, 0, 0, 0))))
            .and_then(|e| e.with_start(Temporal::Date(date(2015, 11, 9))))
            .and_then(|e| e.with_rrule(RecurrenceRule::parse("FREQ=DAILY;COUNT=6").unwrap()))
            .and_then(|e| e.with_summary("Stand-up"))
            .unwrap();
        assert_eq!(event.uid(), Some("1@example.com"));
        assert_eq!(event.summary(), Some("Stand-up"));
        assert_eq!(
            event.effective_end(),
            Some(Temporal::Date(date(2015, 11, 10)))
        );
        assert!(event.errors().is_empty());
    }

    #[test]
    fn rejects_end_of_other_kind() {
        let mut event = VEvent::new()
            .with_start(Temporal::Floating(datetime(2015, 11, 9, 10, 0, 0, 0)))
            .unwrap();
        let err = event.set_end(Temporal::Date(date(2015, 11, 10))).unwrap_err();
        assert!(matches!(err, ConsistencyError::KindMismatch { .. }));
        assert_eq!(event.end(), None);
    }

    #[test]
    fn converts_by_kind() {
        let todo = Component::new(ComponentKind::VTodo);
        let todo = VEvent::try_from(todo).unwrap_err();
        assert!(VTodo::try_from(todo).is_ok());

        let standard = Observance::standard();
        assert!(!standard.is_daylight());
        let mut tz = VTimeZone::new("Europe/Berlin").unwrap();
        tz.add_observance(standard).unwrap();
        assert_eq!(tz.observances().count(), 1);
        assert_eq!(tz.tzid(), Some("Europe/Berlin"));
    }
}
