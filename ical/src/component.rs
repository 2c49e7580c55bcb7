// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Components: the `BEGIN`/`END` blocks of an iCalendar stream.
//!
//! A [`Component`] keeps its properties and children in the order they were
//! added or parsed, which is the order they are written back. Every mutation
//! goes through the hard checks of [`crate::validate`]; a rejected mutation
//! leaves the component as it was.

mod capability;
mod kinds;

use std::cell::RefCell;

pub use capability::{
    AsComponent, Attended, Bounded, Dated, Descriptive, Due, Identified, Overriding, Recurring,
};
pub use kinds::{Observance, VAlarm, VEvent, VFreeBusy, VJournal, VTimeZone, VTodo};

use crate::keyword::{KW_DTSTART, KW_RDATE, KW_RRULE};
use crate::property::{Property, PropertyKind, PropertyName};
use crate::recurrence::RecurrenceCache;
use crate::validate::{self, ConsistencyError};
use crate::value::Temporal;

/// Kind of an iCalendar component. Extension components are not supported.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumString, strum::AsRefStr,
)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
#[expect(missing_docs)]
pub enum ComponentKind {
    VCalendar,
    VEvent,
    VTodo,
    VJournal,
    VFreeBusy,
    VTimeZone,
    Standard,
    Daylight,
    VAlarm,
}

impl ComponentKind {
    /// Kinds that may nest directly inside this kind.
    #[must_use]
    pub const fn allowed_children(self) -> &'static [ComponentKind] {
        match self {
            Self::VCalendar => &[
                Self::VEvent,
                Self::VTodo,
                Self::VJournal,
                Self::VFreeBusy,
                Self::VTimeZone,
            ],
            Self::VEvent | Self::VTodo => &[Self::VAlarm],
            Self::VTimeZone => &[Self::Standard, Self::Daylight],
            Self::VJournal | Self::VFreeBusy | Self::Standard | Self::Daylight | Self::VAlarm => {
                &[]
            }
        }
    }

    /// Whether `child` may nest directly inside this kind.
    #[must_use]
    pub fn allows_child(self, child: ComponentKind) -> bool {
        self.allowed_children().contains(&child)
    }

    /// Events, to-dos and journals: the kinds shown on a calendar, which may
    /// recur and be overridden.
    #[must_use]
    pub const fn is_displayable(self) -> bool {
        matches!(self, Self::VEvent | Self::VTodo | Self::VJournal)
    }

    /// `STANDARD` and `DAYLIGHT`.
    #[must_use]
    pub const fn is_observance(self) -> bool {
        matches!(self, Self::Standard | Self::Daylight)
    }

    /// Whether a property may occur more than once in this kind.
    #[must_use]
    pub fn is_repeatable(self, name: &PropertyName) -> bool {
        use PropertyKind as P;
        match name {
            PropertyName::Extension(_) => true,
            PropertyName::Known(P::Description) => self == Self::VJournal,
            PropertyName::Known(kind) => matches!(
                kind,
                P::Attach
                    | P::Attendee
                    | P::Categories
                    | P::Comment
                    | P::Contact
                    | P::ExDate
                    | P::RDate
                    | P::RelatedTo
                    | P::Resources
                    | P::RequestStatus
                    | P::TzName
                    | P::FreeBusy
            ),
        }
    }
}

/// A component with its properties and sub-components.
#[derive(Debug)]
pub struct Component {
    kind: ComponentKind,
    properties: Vec<Property>,
    children: Vec<Component>,
    cache: RefCell<RecurrenceCache>,
}

impl Component {
    /// An empty component.
    #[must_use]
    pub fn new(kind: ComponentKind) -> Self {
        Self {
            kind,
            properties: Vec::new(),
            children: Vec::new(),
            cache: RefCell::default(),
        }
    }

    /// The kind of the component.
    #[must_use]
    pub const fn kind(&self) -> ComponentKind {
        self.kind
    }

    /// All properties, in order.
    #[must_use]
    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    /// Properties named `name`, in order. Names are case-insensitive.
    pub fn get<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Property> + 'a {
        self.properties.iter().filter(move |p| p.is(name))
    }

    /// The first property named `name`.
    #[must_use]
    pub fn get_one(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.is(name))
    }

    /// The date or date-time value of the first property named `name`.
    #[must_use]
    pub fn temporal(&self, name: &str) -> Option<&Temporal> {
        self.get_one(name).and_then(Property::temporal)
    }

    /// Append a property.
    ///
    /// # Errors
    ///
    /// If the property breaks a hard invariant, e.g. a second `DTSTART`.
    pub fn add_property(&mut self, property: Property) -> Result<(), ConsistencyError> {
        validate::check_insert(self.kind, &self.properties, &property)?;
        self.invalidate(property.name());
        self.properties.push(property);
        Ok(())
    }

    /// Builder form of [`add_property`](Self::add_property).
    ///
    /// # Errors
    ///
    /// If the property breaks a hard invariant.
    pub fn with_property(mut self, property: Property) -> Result<Self, ConsistencyError> {
        self.add_property(property)?;
        Ok(self)
    }

    /// Replace every property of the same name with `property`, in the slot
    /// of the first one, or append it if there is none.
    ///
    /// # Errors
    ///
    /// [`ConsistencyError::MultipleNotAllowed`] if several instances exist
    /// although the kind forbids repetition, or any hard invariant the new
    /// value breaks.
    pub fn set_single(&mut self, property: Property) -> Result<(), ConsistencyError> {
        let name = property.name().to_string();
        if !self.kind.is_repeatable(property.name()) && self.get(&name).count() > 1 {
            return Err(ConsistencyError::MultipleNotAllowed {
                property: name,
                component: self.kind,
            });
        }

        let others = self.properties.iter().filter(|p| !p.is(&name));
        validate::check_insert(self.kind, others, &property)?;
        self.invalidate(property.name());

        match self.properties.iter().position(|p| p.is(&name)) {
            Some(index) => {
                let mut index_seen = 0;
                self.properties.retain(|p| {
                    let keep = !p.is(&name) || index_seen == index;
                    index_seen += 1;
                    keep
                });
                if let Some(slot) = self.properties.get_mut(index) {
                    *slot = property;
                }
            }
            None => self.properties.push(property),
        }
        Ok(())
    }

    /// Remove every property named `name`, returning them in order.
    pub fn remove(&mut self, name: &str) -> Vec<Property> {
        let (removed, kept) = std::mem::take(&mut self.properties)
            .into_iter()
            .partition(|p| p.is(name));
        self.properties = kept;
        if let Some(first) = removed.first() {
            self.invalidate(first.name());
        }
        removed
    }

    /// Sub-components, in order.
    #[must_use]
    pub fn children(&self) -> &[Component] {
        &self.children
    }

    /// Mutable access to the sub-components.
    pub fn children_mut(&mut self) -> &mut [Component] {
        &mut self.children
    }

    /// Append a sub-component.
    ///
    /// # Errors
    ///
    /// [`ConsistencyError::ChildNotAllowed`] if this kind cannot hold it.
    pub fn add_child(&mut self, child: Component) -> Result<(), ConsistencyError> {
        if !self.kind.allows_child(child.kind) {
            return Err(ConsistencyError::ChildNotAllowed {
                parent: self.kind,
                child: child.kind,
            });
        }
        self.children.push(child);
        Ok(())
    }

    /// Remove the sub-component at `index`.
    pub fn remove_child(&mut self, index: usize) -> Option<Component> {
        (index < self.children.len()).then(|| self.children.remove(index))
    }

    /// Soft invariants this component and its children break, see
    /// [`validate::errors`].
    #[must_use]
    pub fn errors(&self) -> Vec<String> {
        validate::errors(self)
    }

    /// Split into properties and children.
    #[must_use]
    pub fn into_parts(self) -> (ComponentKind, Vec<Property>, Vec<Component>) {
        (self.kind, self.properties, self.children)
    }

    pub(crate) const fn recurrence_cache(&self) -> &RefCell<RecurrenceCache> {
        &self.cache
    }

    fn invalidate(&mut self, name: &PropertyName) {
        if [KW_DTSTART, KW_RRULE, KW_RDATE].iter().any(|kw| name.is(kw)) {
            self.cache.get_mut().clear();
        }
    }
}

/// Clones start with an empty recurrence cache.
impl Clone for Component {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            properties: self.properties.clone(),
            children: self.children.clone(),
            cache: RefCell::default(),
        }
    }
}

/// Equality ignores the recurrence cache.
impl PartialEq for Component {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
            && self.properties == other.properties
            && self.children == other.children
    }
}

#[cfg(test)]
mod tests {
    use jiff::civil::{date, datetime};

    use super::*;
    use crate::value::{RecurrenceRule, Value};

    fn text(kind: PropertyKind, s: &str) -> Property {
        Property::new(kind, Value::Text(s.to_string()))
    }

    #[test]
    fn kinds_parse_case_insensitively() {
        assert_eq!("vevent".parse(), Ok(ComponentKind::VEvent));
        assert_eq!("VFREEBUSY".parse(), Ok(ComponentKind::VFreeBusy));
        assert_eq!(ComponentKind::Daylight.to_string(), "DAYLIGHT");
        assert!("X-CUSTOM".parse::<ComponentKind>().is_err());
    }

    #[test]
    fn keeps_property_order() {
        let mut event = Component::new(ComponentKind::VEvent);
        event.add_property(text(PropertyKind::Summary, "a")).unwrap();
        event.add_property(text(PropertyKind::Comment, "b")).unwrap();
        event.add_property(text(PropertyKind::Comment, "c")).unwrap();
        let comments: Vec<_> = event
            .get("comment")
            .filter_map(|p| p.value().as_text())
            .collect();
        assert_eq!(comments, ["b", "c"]);

        event.set_single(text(PropertyKind::Comment, "d")).unwrap();
        let names: Vec<_> = event.properties().iter().map(|p| p.name().to_string()).collect();
        assert_eq!(names, ["SUMMARY", "COMMENT"]);
        assert_eq!(event.get_one("COMMENT").and_then(|p| p.value().as_text()), Some("d"));
    }

    #[test]
    fn rejected_mutation_keeps_state() {
        let mut event = Component::new(ComponentKind::VEvent);
        let start = Temporal::Floating(datetime(2015, 11, 9, 10, 0, 0, 0));
        event.add_property(Property::new(PropertyKind::DtStart, start.clone())).unwrap();

        let end = Property::new(PropertyKind::DtEnd, Temporal::Date(date(2015, 11, 10)));
        assert!(event.set_single(end).is_err());
        assert!(event.get_one("DTEND").is_none());

        let second = Property::new(PropertyKind::DtStart, Temporal::Date(date(2015, 11, 9)));
        assert!(matches!(
            event.add_property(second),
            Err(ConsistencyError::MultipleNotAllowed { .. })
        ));

        // replacing DTSTART checks against the existing DTEND
        let end = Temporal::Floating(datetime(2015, 11, 9, 11, 0, 0, 0));
        event.set_single(Property::new(PropertyKind::DtEnd, end)).unwrap();
        let late = Temporal::Floating(datetime(2015, 11, 9, 12, 0, 0, 0));
        assert!(matches!(
            event.set_single(Property::new(PropertyKind::DtStart, late)),
            Err(ConsistencyError::NotAfterStart { .. })
        ));
        assert_eq!(event.temporal("DTSTART"), Some(&start));
    }

    #[test]
    fn validates_children() {
        let mut event = Component::new(ComponentKind::VEvent);
        assert!(event.add_child(Component::new(ComponentKind::VAlarm)).is_ok());
        assert_eq!(
            event.add_child(Component::new(ComponentKind::Standard)),
            Err(ConsistencyError::ChildNotAllowed {
                parent: ComponentKind::VEvent,
                child: ComponentKind::Standard,
            })
        );
        assert!(event.remove_child(3).is_none());
        assert!(event.remove_child(0).is_some());
        assert!(event.children().is_empty());
    }

    #[test]
    fn clears_cache_on_recurrence_change() {
        let mut event = Component::new(ComponentKind::VEvent);
        let start = Temporal::Date(date(2015, 11, 9));
        event.add_property(Property::new(PropertyKind::DtStart, start.clone())).unwrap();
        let rule = RecurrenceRule::parse("FREQ=DAILY").unwrap();
        event.add_property(Property::new(PropertyKind::RRule, rule)).unwrap();

        let _ = event.occurrences(&start).unwrap().take(100).count();
        assert!(!event.recurrence_cache().borrow().is_empty());

        event.add_property(text(PropertyKind::Summary, "unrelated")).unwrap();
        assert!(!event.recurrence_cache().borrow().is_empty());

        event.remove("RRULE");
        assert!(event.recurrence_cache().borrow().is_empty());
    }

    #[test]
    fn errors_are_idempotent() {
        let mut event = Component::new(ComponentKind::VEvent);
        event.add_property(text(PropertyKind::Uid, "1@example.com")).unwrap();
        let first = event.errors();
        assert_eq!(first, event.errors());
        assert_eq!(first.len(), 2);
    }
}
