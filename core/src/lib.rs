// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Calendar aggregate of Agendum.
//!
//! [`Calendar`] holds the top-level components of one `VCALENDAR`, indexes
//! them by UID, resolves recurrence overrides and notifies a callback on
//! structural changes. [`Config`] and the [`io`] helpers connect it to
//! configuration and `.ics` files.

mod calendar;
mod config;
pub mod io;
mod uid;

pub use crate::calendar::{Calendar, CalendarError, ComponentId, PRODID, SeriesOccurrence};
pub use crate::config::{APP_NAME, Config, UidPolicy, expand_path};
pub use crate::uid::{
    DEFAULT_UID_DOMAIN, SequentialUidGenerator, TimestampUidGenerator, UidGenerator,
    UuidUidGenerator,
};
