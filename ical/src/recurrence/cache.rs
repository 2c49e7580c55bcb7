// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Checkpoints of earlier expansions, keyed by the month of their seed.
//!
//! A checkpoint records everything needed to resume expanding a rule at a
//! period without replaying the series from `DTSTART`: the interval index of
//! the period, how many instances `COUNT` has already consumed, and the
//! candidates the period produced.

use std::collections::BTreeMap;

use jiff::civil::DateTime;

use crate::value::DateTimeKind;

/// Calendar month of an expansion seed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) struct PeriodKey {
    kind: DateTimeKind,
    year: i16,
    month: i8,
}

impl PeriodKey {
    pub(crate) fn new(kind: DateTimeKind, civil: DateTime) -> Self {
        Self {
            kind,
            year: civil.year(),
            month: civil.month(),
        }
    }
}

/// Resumable state of the first period seeded in a month.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Checkpoint {
    /// Interval index of the period
    pub attempt: i64,

    /// Instances counted against `COUNT` before this period, `DTSTART`
    /// included
    pub emitted_before: u32,

    /// Candidates of the period, ascending
    pub starts: Vec<DateTime>,
}

/// Memo of rule expansions for one component.
#[derive(Debug, Default, Clone)]
pub struct RecurrenceCache {
    entries: BTreeMap<PeriodKey, Checkpoint>,
}

impl RecurrenceCache {
    /// The checkpoint to resume from for a query starting in `key`'s month.
    ///
    /// This is the entry before the greatest entry at or before `key`, since
    /// the period seeded just before a month boundary may still produce
    /// instances after it.
    pub(crate) fn seed_for(&self, key: PeriodKey) -> Option<&Checkpoint> {
        let mut candidates = self
            .entries
            .range(..=key)
            .rev()
            .take_while(|(k, _)| k.kind == key.kind);
        candidates.next()?;
        candidates.next().map(|(_, checkpoint)| checkpoint)
    }

    /// Record a finished period; the first period seen for a month wins.
    pub(crate) fn publish(&mut self, key: PeriodKey, checkpoint: Checkpoint) {
        self.entries.entry(key).or_insert(checkpoint);
    }

    /// Whether a checkpoint exists for the month.
    pub(crate) fn contains(&self, key: PeriodKey) -> bool {
        self.entries.contains_key(&key)
    }

    /// Drop every checkpoint.
    pub fn clear(&mut self) {
        if !self.entries.is_empty() {
            tracing::debug!(entries = self.entries.len(), "recurrence cache invalidated");
        }
        self.entries.clear();
    }

    /// Number of checkpoints held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no checkpoint is held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
