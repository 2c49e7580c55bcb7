// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! The calendar aggregate.
//!
//! A [`Calendar`] owns the top-level components of one `VCALENDAR` object
//! and keeps a UID index over them, so that the overrides of a recurring
//! series and the series of an override are found without scanning. All
//! structural mutations go through the calendar, which checks the
//! invariants spanning several components and then fires the optional
//! change callback.

mod series;

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::io::{self, Write};

use agendum_ical::formatter::Formatter;
use agendum_ical::keyword::{KW_DTSTART, KW_RECURRENCE_ID, KW_UID};
use agendum_ical::{
    Component, ComponentKind, ConsistencyError, FormatOptions, ParseError, ParseOptions,
    Property, PropertyKind, RecurrenceError, Temporal, Value, parse_with_options,
};

use crate::uid::{TimestampUidGenerator, UidGenerator};

pub use series::SeriesOccurrence;

/// `PRODID` of calendars created from scratch.
pub const PRODID: &str = "-//yzx9//agendum//EN";

const UID_ATTEMPTS: usize = 16;

/// Stable handle of a top-level component within one [`Calendar`].
///
/// Handles are never reused, and sort in insertion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ComponentId(u64);

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Components sharing one UID.
#[derive(Debug, Default)]
struct UidEntry {
    parent: Option<ComponentId>,
    overrides: Vec<ComponentId>,
}

impl UidEntry {
    fn is_empty(&self) -> bool {
        self.parent.is_none() && self.overrides.is_empty()
    }
}

type ChangeCallback = Box<dyn FnMut(&Calendar)>;

/// A `VCALENDAR` object with its top-level components.
pub struct Calendar {
    /// Calendar properties, held by a childless `VCALENDAR` component.
    header: Component,
    components: BTreeMap<ComponentId, Component>,
    next_id: u64,
    index: HashMap<String, UidEntry>,
    uid_generator: Box<dyn UidGenerator>,
    on_change: Option<ChangeCallback>,
}

impl Calendar {
    /// Create a calendar carrying `PRODID` and `VERSION`.
    #[must_use]
    pub fn new() -> Self {
        let mut calendar = Self::empty();
        for (kind, value) in [(PropertyKind::ProdId, PRODID), (PropertyKind::Version, "2.0")] {
            // a fresh header accepts one of each
            if let Err(err) = calendar.header.add_property(Property::new(kind, Value::Text(value.to_string()))) {
                tracing::warn!(%err, "failed to initialize calendar header");
            }
        }
        calendar
    }

    /// Create a calendar without any property.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            header: Component::new(ComponentKind::VCalendar),
            components: BTreeMap::new(),
            next_id: 0,
            index: HashMap::new(),
            uid_generator: Box::new(TimestampUidGenerator::default()),
            on_change: None,
        }
    }

    /// Parse a stream holding exactly one `VCALENDAR`.
    ///
    /// Either the whole calendar is returned or an error is; nothing of a
    /// failed parse is observable.
    ///
    /// # Errors
    ///
    /// If the text is malformed, breaks a hard invariant, or does not hold
    /// exactly one `VCALENDAR`.
    pub fn parse(src: &str) -> Result<Self, CalendarError> {
        Self::parse_with_options(src, &ParseOptions::default())
    }

    /// [`Calendar::parse`] with explicit parser options.
    ///
    /// # Errors
    ///
    /// See [`Calendar::parse`].
    pub fn parse_with_options(src: &str, options: &ParseOptions) -> Result<Self, CalendarError> {
        let mut roots = parse_with_options(src, options)?;
        if roots.len() != 1 {
            return Err(CalendarError::CalendarCount(roots.len()));
        }
        let Some(root) = roots.pop() else {
            return Err(CalendarError::CalendarCount(0));
        };

        let (_, properties, children) = root.into_parts();
        let mut calendar = Self::empty();
        for property in properties {
            calendar.header.add_property(property)?;
        }
        for child in children {
            calendar.insert(child)?;
        }
        tracing::debug!(components = calendar.len(), "parsed calendar");
        Ok(calendar)
    }

    /// Serialize with the default options.
    ///
    /// # Errors
    ///
    /// If formatting fails.
    pub fn serialize(&self) -> io::Result<String> {
        self.serialize_with(&FormatOptions::default())
    }

    /// Serialize with explicit formatter options.
    ///
    /// # Errors
    ///
    /// If formatting fails or the output is not valid UTF-8.
    pub fn serialize_with(&self, options: &FormatOptions) -> io::Result<String> {
        let mut buffer = Vec::new();
        self.write(&mut buffer, options)?;
        String::from_utf8(buffer).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    /// Write the calendar to any `Write` implementer.
    ///
    /// # Errors
    ///
    /// If writing fails.
    pub fn write(&self, writer: &mut impl Write, options: &FormatOptions) -> io::Result<()> {
        let kind = ComponentKind::VCalendar;
        let mut formatter = Formatter::new(writer, *options);
        formatter.write_line(&format!("BEGIN:{kind}"))?;
        for property in self.header.properties() {
            formatter.write_line(&property.to_string())?;
        }
        for component in self.components.values() {
            formatter.write_component(component)?;
        }
        formatter.write_line(&format!("END:{kind}"))?;
        formatter.flush()
    }

    /// Calendar properties in order.
    #[must_use]
    pub fn properties(&self) -> &[Property] {
        self.header.properties()
    }

    /// Append a calendar property.
    ///
    /// # Errors
    ///
    /// If the property may not occur again.
    pub fn add_property(&mut self, property: Property) -> Result<(), CalendarError> {
        Ok(self.header.add_property(property)?)
    }

    /// Replace the sole instance of a calendar property.
    ///
    /// # Errors
    ///
    /// See [`Component::set_single`].
    pub fn set_property(&mut self, property: Property) -> Result<(), CalendarError> {
        Ok(self.header.set_single(property)?)
    }

    /// Top-level components in order.
    pub fn components(&self) -> impl Iterator<Item = (ComponentId, &Component)> {
        self.components.iter().map(|(id, c)| (*id, c))
    }

    /// Top-level components of one kind, in order.
    pub fn components_of(
        &self,
        kind: ComponentKind,
    ) -> impl Iterator<Item = (ComponentId, &Component)> {
        self.components().filter(move |(_, c)| c.kind() == kind)
    }

    /// The component behind a handle.
    #[must_use]
    pub fn get(&self, id: ComponentId) -> Option<&Component> {
        self.components.get(&id)
    }

    /// Number of top-level components.
    #[must_use]
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Whether the calendar has no top-level component.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// The series, or the only component, with this UID.
    #[must_use]
    pub fn find(&self, uid: &str) -> Option<(ComponentId, &Component)> {
        let id = self.index.get(uid)?.parent?;
        self.get(id).map(|c| (id, c))
    }

    /// Every component with this UID, the series first.
    #[must_use]
    pub fn find_all(&self, uid: &str) -> Vec<(ComponentId, &Component)> {
        let Some(entry) = self.index.get(uid) else {
            return Vec::new();
        };
        entry
            .parent
            .iter()
            .chain(&entry.overrides)
            .filter_map(|id| self.get(*id).map(|c| (*id, c)))
            .collect()
    }

    /// Add a top-level component.
    ///
    /// # Errors
    ///
    /// - [`CalendarError::NotTopLevel`] for kinds that only nest.
    /// - [`CalendarError::DuplicateComponent`] for a second series, or a
    ///   second override of the same occurrence, with this UID.
    /// - [`CalendarError::Consistency`] if `RECURRENCE-ID` and the series'
    ///   `DTSTART` differ in kind.
    pub fn add_child(&mut self, component: Component) -> Result<ComponentId, CalendarError> {
        let id = self.insert(component)?;
        self.notify();
        Ok(id)
    }

    /// Remove a top-level component.
    ///
    /// Overrides of a removed series stay in place; see
    /// [`orphaned_children`](Self::orphaned_children).
    ///
    /// # Errors
    ///
    /// [`CalendarError::UnknownComponentId`] if there is no such component.
    pub fn remove_child(&mut self, id: ComponentId) -> Result<Component, CalendarError> {
        let component = self
            .components
            .remove(&id)
            .ok_or(CalendarError::UnknownComponentId(id))?;
        index_remove(&mut self.index, id, &component);
        tracing::debug!(%id, kind = %component.kind(), "removed component");
        self.notify();
        Ok(component)
    }

    /// Replace a top-level component in place, returning the previous one.
    ///
    /// # Errors
    ///
    /// As [`add_child`](Self::add_child), or
    /// [`CalendarError::UnknownComponentId`].
    pub fn replace_child(
        &mut self,
        id: ComponentId,
        component: Component,
    ) -> Result<Component, CalendarError> {
        let previous = self.replace(id, component)?;
        self.notify();
        Ok(previous)
    }

    /// Edit a top-level component. The edit applies to a copy, which
    /// replaces the component only if every edit and check succeeds.
    ///
    /// # Errors
    ///
    /// The first error of `edit`, or as [`replace_child`](Self::replace_child).
    pub fn update<F, E>(&mut self, id: ComponentId, edit: F) -> Result<(), CalendarError>
    where
        F: FnOnce(&mut Component) -> Result<(), E>,
        CalendarError: From<E>,
    {
        let mut component = self
            .get(id)
            .ok_or(CalendarError::UnknownComponentId(id))?
            .clone();
        edit(&mut component)?;
        self.replace(id, component)?;
        self.notify();
        Ok(())
    }

    /// Register the callback run after each add, remove, replace or update
    /// of a top-level component. Replaces any previous callback.
    pub fn set_on_change(&mut self, callback: impl FnMut(&Self) + 'static) {
        self.on_change = Some(Box::new(callback));
    }

    /// Remove the change callback.
    pub fn clear_on_change(&mut self) {
        self.on_change = None;
    }

    /// Replace the UID generation policy.
    pub fn set_uid_generator(&mut self, generator: Box<dyn UidGenerator>) {
        self.uid_generator = generator;
    }

    /// Builder form of [`set_uid_generator`](Self::set_uid_generator).
    #[must_use]
    pub fn with_uid_generator(mut self, generator: Box<dyn UidGenerator>) -> Self {
        self.uid_generator = generator;
        self
    }

    /// A UID not used in this calendar yet, from the UID generator.
    ///
    /// # Errors
    ///
    /// [`CalendarError::UidExhausted`] if the generator keeps producing
    /// UIDs in use.
    pub fn generate_uid(&mut self) -> Result<String, CalendarError> {
        for _ in 0..UID_ATTEMPTS {
            let uid = self.uid_generator.generate();
            if !self.index.contains_key(&uid) {
                return Ok(uid);
            }
            tracing::debug!(%uid, "generated UID already in use");
        }
        Err(CalendarError::UidExhausted(UID_ATTEMPTS))
    }

    /// Overrides of a series: the other components with its UID and a
    /// `RECURRENCE-ID`. Empty for overrides and components without UID.
    #[must_use]
    pub fn recurrence_children(&self, id: ComponentId) -> Vec<(ComponentId, &Component)> {
        let Some(entry) = self.get(id).and_then(uid_of).and_then(|uid| self.index.get(uid)) else {
            return Vec::new();
        };
        if entry.parent != Some(id) {
            return Vec::new();
        }
        entry
            .overrides
            .iter()
            .filter_map(|o| self.get(*o).map(|c| (*o, c)))
            .collect()
    }

    /// The series an override belongs to.
    #[must_use]
    pub fn recurrence_parent(&self, id: ComponentId) -> Option<(ComponentId, &Component)> {
        let component = self.get(id)?;
        component.get_one(KW_RECURRENCE_ID)?;
        let parent = self.index.get(uid_of(component)?)?.parent?;
        self.get(parent).map(|c| (parent, c))
    }

    /// Overrides whose `RECURRENCE-ID` is no longer an occurrence of the
    /// series, e.g. after its rule was shortened. Removing them is up to
    /// the caller.
    ///
    /// # Errors
    ///
    /// If there is no such component or it has no `DTSTART`.
    pub fn orphaned_children(&self, id: ComponentId) -> Result<Vec<ComponentId>, CalendarError> {
        let parent = self.get(id).ok_or(CalendarError::UnknownComponentId(id))?;
        let mut orphans = Vec::new();
        for (child, component) in self.recurrence_children(id) {
            if let Some(rid) = component.temporal(KW_RECURRENCE_ID)
                && !agendum_ical::is_occurrence(parent, rid)?
            {
                orphans.push(child);
            }
        }
        Ok(orphans)
    }

    /// Soft problems of the calendar: its own and those of every component,
    /// plus overrides that are not an occurrence of their series.
    #[must_use]
    pub fn errors(&self) -> Vec<String> {
        let mut errors = self.header.errors();
        for component in self.components.values() {
            let kind = component.kind();
            errors.extend(component.errors().into_iter().map(|e| format!("{kind}: {e}")));
        }

        // a series without DTSTART is already reported by the component
        for (id, component) in &self.components {
            let Ok(orphans) = self.orphaned_children(*id) else {
                continue;
            };
            for orphan in orphans.iter().filter_map(|o| self.get(*o)) {
                if let Some(rid) = orphan.temporal(KW_RECURRENCE_ID) {
                    errors.push(format!(
                        "{}: RECURRENCE-ID {rid} is not an occurrence of {}",
                        orphan.kind(),
                        uid_of(component).unwrap_or_default()
                    ));
                }
            }
        }
        errors
    }

    fn insert(&mut self, component: Component) -> Result<ComponentId, CalendarError> {
        self.check(&component, None)?;
        let id = ComponentId(self.next_id);
        self.next_id += 1;
        index_insert(&mut self.index, id, &component);
        tracing::debug!(%id, kind = %component.kind(), uid = uid_of(&component), "added component");
        self.components.insert(id, component);
        Ok(id)
    }

    fn replace(&mut self, id: ComponentId, component: Component) -> Result<Component, CalendarError> {
        if !self.components.contains_key(&id) {
            return Err(CalendarError::UnknownComponentId(id));
        }
        self.check(&component, Some(id))?;

        let previous = self
            .components
            .insert(id, component)
            .ok_or(CalendarError::UnknownComponentId(id))?;
        index_remove(&mut self.index, id, &previous);
        if let Some(current) = self.components.get(&id) {
            index_insert(&mut self.index, id, current);
        }
        tracing::debug!(%id, "replaced component");
        Ok(previous)
    }

    /// Check the invariants involving other top-level components, ignoring
    /// the one at `replacing`.
    fn check(&self, component: &Component, replacing: Option<ComponentId>) -> Result<(), CalendarError> {
        let kind = component.kind();
        if !ComponentKind::VCalendar.allows_child(kind) {
            return Err(CalendarError::NotTopLevel(kind));
        }

        let Some(uid) = uid_of(component) else {
            return Ok(());
        };
        let Some(entry) = self.index.get(uid) else {
            return Ok(());
        };
        let others = |ids: &[ComponentId]| -> Vec<&Component> {
            ids.iter()
                .filter(|id| Some(**id) != replacing)
                .filter_map(|id| self.get(*id))
                .collect()
        };
        let parent = entry
            .parent
            .filter(|p| Some(*p) != replacing)
            .and_then(|p| self.get(p));
        let overrides = others(&entry.overrides);

        match component.temporal(KW_RECURRENCE_ID) {
            Some(rid) => {
                if overrides
                    .iter()
                    .any(|o| o.temporal(KW_RECURRENCE_ID) == Some(rid))
                {
                    return Err(CalendarError::DuplicateComponent {
                        uid: uid.to_string(),
                        recurrence_id: Some(rid.clone()),
                    });
                }
                if let Some(start) = parent.and_then(|p| p.temporal(KW_DTSTART)) {
                    check_recurrence_id(start, rid)?;
                }
            }
            None => {
                if parent.is_some() {
                    return Err(CalendarError::DuplicateComponent {
                        uid: uid.to_string(),
                        recurrence_id: None,
                    });
                }
                if let Some(start) = component.temporal(KW_DTSTART) {
                    for rid in overrides.iter().filter_map(|o| o.temporal(KW_RECURRENCE_ID)) {
                        check_recurrence_id(start, rid)?;
                    }
                }
            }
        }
        Ok(())
    }

    fn notify(&mut self) {
        if let Some(mut callback) = self.on_change.take() {
            callback(self);
            self.on_change = Some(callback);
        }
    }
}

impl Default for Calendar {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Calendar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Calendar")
            .field("properties", &self.header.properties())
            .field("components", &self.components)
            .field("uid_generator", &self.uid_generator)
            .field("on_change", &self.on_change.is_some())
            .finish_non_exhaustive()
    }
}

/// Equal properties and equal components in the same order.
impl PartialEq for Calendar {
    fn eq(&self, other: &Self) -> bool {
        self.header == other.header && self.components.values().eq(other.components.values())
    }
}

fn uid_of(component: &Component) -> Option<&str> {
    component.get_one(KW_UID).and_then(|p| p.value().as_text())
}

fn check_recurrence_id(start: &Temporal, rid: &Temporal) -> Result<(), ConsistencyError> {
    if start.kind() == rid.kind() {
        Ok(())
    } else {
        Err(ConsistencyError::KindMismatch {
            property: KW_RECURRENCE_ID.to_string(),
            expected: start.kind(),
            found: rid.kind(),
        })
    }
}

fn index_insert(index: &mut HashMap<String, UidEntry>, id: ComponentId, component: &Component) {
    let Some(uid) = uid_of(component) else {
        return;
    };
    let entry = index.entry(uid.to_string()).or_default();
    if component.get_one(KW_RECURRENCE_ID).is_some() {
        entry.overrides.push(id);
    } else {
        entry.parent = Some(id);
    }
}

fn index_remove(index: &mut HashMap<String, UidEntry>, id: ComponentId, component: &Component) {
    let Some(uid) = uid_of(component) else {
        return;
    };
    if let Some(entry) = index.get_mut(uid) {
        if entry.parent == Some(id) {
            entry.parent = None;
        }
        entry.overrides.retain(|o| *o != id);
        if entry.is_empty() {
            index.remove(uid);
        }
    }
}

/// Errors of calendar-level operations.
#[derive(Debug, thiserror::Error)]
pub enum CalendarError {
    /// The text could not be parsed.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// A hard invariant would be broken.
    #[error(transparent)]
    Consistency(#[from] ConsistencyError),

    /// The recurrence set could not be computed.
    #[error(transparent)]
    Recurrence(#[from] RecurrenceError),

    /// Date arithmetic left the supported range.
    #[error(transparent)]
    Time(#[from] jiff::Error),

    /// The stream holds zero or several `VCALENDAR` objects.
    #[error("expected exactly one VCALENDAR, found {0}")]
    CalendarCount(usize),

    /// No component behind the handle.
    #[error("no component {0} in calendar")]
    UnknownComponentId(ComponentId),

    /// A kind that may only nest inside another component.
    #[error("{0} is not a top-level component")]
    NotTopLevel(ComponentKind),

    /// A second series, or a second override of one occurrence.
    #[error("{}", duplicate_message(.uid, .recurrence_id.as_ref()))]
    DuplicateComponent {
        /// The shared UID
        uid: String,
        /// The shared `RECURRENCE-ID`, if overrides clash
        recurrence_id: Option<Temporal>,
    },

    /// An override, or a component without rule, where a series is expected.
    #[error("component {0} is not a recurring series")]
    NotASeries(ComponentId),

    /// A value outside the recurrence set of a series.
    #[error("{occurrence} is not an occurrence of {uid}")]
    NotAnOccurrence {
        /// UID of the series
        uid: String,
        /// The value looked up
        occurrence: Temporal,
    },

    /// The UID generator kept producing UIDs in use.
    #[error("failed to generate an unused UID after {0} attempts")]
    UidExhausted(usize),
}

fn duplicate_message(uid: &str, recurrence_id: Option<&Temporal>) -> String {
    match recurrence_id {
        Some(rid) => format!("{uid} already has an override for {rid}"),
        None => format!("{uid} already has a series"),
    }
}
