// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Parse, represent and expand iCalendar (RFC 5545) data.
//!
//! The crate is layered: [`syntax`] turns text into content lines and
//! blocks, [`value`] and [`property`] type the lines, [`component`] holds
//! the tree, [`recurrence`] expands recurrence sets and [`formatter`] writes
//! the tree back.

#![warn(
    trivial_casts,
    trivial_numeric_casts,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unsafe_code,
    unstable_features,
    unused_import_braces,
    unused_qualifications,
    clippy::dbg_macro,
    clippy::indexing_slicing,
    clippy::pedantic
)]
// Allow certain clippy lints that are too restrictive for this crate
#![allow(
    clippy::option_option,
    clippy::similar_names,
    clippy::single_match_else,
    clippy::match_bool
)]

pub mod component;
pub mod formatter;
pub mod keyword;
pub mod parameter;
mod parser;
pub mod property;
pub mod recurrence;
pub mod syntax;
pub mod validate;
pub mod value;

pub use crate::component::{
    AsComponent, Attended, Bounded, Component, ComponentKind, Dated, Descriptive, Due, Identified,
    Observance, Overriding, Recurring, VAlarm, VEvent, VFreeBusy, VJournal, VTimeZone, VTodo,
};
pub use crate::formatter::{FormatOptions, serialize};
pub use crate::parameter::{Parameter, ParameterKind};
pub use crate::parser::{ParseError, ParseOptions, parse, parse_with_options};
pub use crate::property::{Property, PropertyKind, PropertyName, parse_property};
pub use crate::recurrence::{
    Occurrences, RecurrenceError, is_occurrence, occurrences, occurrences_between,
};
pub use crate::validate::ConsistencyError;
pub use crate::value::{
    DateTimeKind, Frequency, RecurrenceRule, RuleError, Temporal, Value, ValueDuration,
    ValueParseError, ValueType, ValueUtcOffset, WeekdayNum,
};
