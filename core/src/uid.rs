// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::fmt;

use jiff::Timestamp;
use jiff::tz::TimeZone;
use uuid::Uuid;

/// Domain used by the default generators.
pub const DEFAULT_UID_DOMAIN: &str = "@agendum.local";

/// A policy for new unique identifiers, owned by one [`Calendar`](crate::Calendar).
pub trait UidGenerator: fmt::Debug {
    /// Produce the next identifier.
    fn generate(&mut self) -> String;
}

/// `<UTC yyyymmddThhmmssZ>-<counter><domain>`, the counter being local to
/// the generator.
#[derive(Debug, Clone)]
pub struct TimestampUidGenerator {
    domain: String,
    counter: u64,
    clock: fn() -> Timestamp,
}

impl TimestampUidGenerator {
    /// Create a generator appending `domain`, e.g. `@example.com`.
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            counter: 0,
            clock: Timestamp::now,
        }
    }

    /// Replace the clock, mostly for tests.
    #[must_use]
    pub fn with_clock(mut self, clock: fn() -> Timestamp) -> Self {
        self.clock = clock;
        self
    }
}

impl Default for TimestampUidGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_UID_DOMAIN)
    }
}

impl UidGenerator for TimestampUidGenerator {
    fn generate(&mut self) -> String {
        let now = (self.clock)().to_zoned(TimeZone::UTC);
        let uid = format!(
            "{}-{}{}",
            now.strftime("%Y%m%dT%H%M%SZ"),
            self.counter,
            self.domain
        );
        self.counter += 1;
        uid
    }
}

/// Random version 4 UUIDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidUidGenerator;

impl UidGenerator for UuidUidGenerator {
    fn generate(&mut self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// `<prefix><n><domain>` with `n` counting from zero. Deterministic.
#[derive(Debug, Clone)]
pub struct SequentialUidGenerator {
    prefix: String,
    domain: String,
    next: u64,
}

impl SequentialUidGenerator {
    /// Create a generator producing `<prefix>0<domain>`, `<prefix>1<domain>`, ...
    pub fn new(prefix: impl Into<String>, domain: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            domain: domain.into(),
            next: 0,
        }
    }
}

impl UidGenerator for SequentialUidGenerator {
    fn generate(&mut self) -> String {
        let uid = format!("{}{}{}", self.prefix, self.next, self.domain);
        self.next += 1;
        uid
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed_clock() -> Timestamp {
        "2015-11-09T08:00:00Z".parse().unwrap()
    }

    #[test]
    fn timestamp_generator_counts_up() {
        let mut generator = TimestampUidGenerator::new("@example.com").with_clock(fixed_clock);
        assert_eq!(generator.generate(), "20151109T080000Z-0@example.com");
        assert_eq!(generator.generate(), "20151109T080000Z-1@example.com");
    }

    #[test]
    fn timestamp_generators_are_independent() {
        let mut a = TimestampUidGenerator::default().with_clock(fixed_clock);
        let mut b = TimestampUidGenerator::default().with_clock(fixed_clock);
        a.generate();
        assert_eq!(b.generate(), "20151109T080000Z-0@agendum.local");
    }

    #[test]
    fn sequential_generator_is_deterministic() {
        let mut generator = SequentialUidGenerator::new("uid-", "@test");
        let uids: Vec<_> = (0..3).map(|_| generator.generate()).collect();
        assert_eq!(uids, ["uid-0@test", "uid-1@test", "uid-2@test"]);
    }

    #[test]
    fn uuid_generator_is_unique() {
        let mut generator = UuidUidGenerator;
        let a = generator.generate();
        assert_ne!(a, generator.generate());
        assert!(Uuid::parse_str(&a).is_ok());
    }
}
