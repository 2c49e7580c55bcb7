// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::error::Error;

use agendum_ical::Temporal;
use clap::ValueEnum;
use jiff::{Timestamp, civil, tz::TimeZone};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
}

/// Parse a date or date-time given on the command line.
///
/// `2015-11-09` is a date, `2015-11-09T10:00` a floating date-time and
/// anything with an offset (`2015-11-09T10:00:00Z`) a UTC instant.
pub fn parse_temporal(text: &str) -> Result<Temporal, Box<dyn Error>> {
    let text = text.trim();
    if let Ok(ts) = text.parse::<Timestamp>() {
        return Ok(Temporal::Utc(ts.to_zoned(TimeZone::UTC).datetime()));
    }

    let parsed = if text.contains(['T', 't', ' ']) {
        text.parse::<civil::DateTime>().map(Temporal::Floating)
    } else {
        text.parse::<civil::Date>().map(Temporal::Date)
    };
    parsed.map_err(|_| {
        format!(
            "Invalid date `{text}`. Expected format: YYYY-MM-DD, YYYY-MM-DDTHH:MM[:SS] or an RFC 3339 timestamp"
        )
        .into()
    })
}

/// Today as a date.
pub fn today() -> Temporal {
    Temporal::Date(jiff::Zoned::now().date())
}

#[cfg(test)]
mod tests {
    use super::*;
    use jiff::civil::{date, datetime};

    #[rustfmt::skip]
    #[test]
    fn parses_command_line_dates() {
        let success_cases = [
            ("2015-11-09",           Temporal::Date(date(2015, 11, 9))),
            ("2015-11-09T10:00",     Temporal::Floating(datetime(2015, 11, 9, 10, 0, 0, 0))),
            ("2015-11-09T10:00:30",  Temporal::Floating(datetime(2015, 11, 9, 10, 0, 30, 0))),
            ("2015-11-09T10:00:00Z", Temporal::Utc(datetime(2015, 11, 9, 10, 0, 0, 0))),
            ("2015-11-09T10:00:00+02:00", Temporal::Utc(datetime(2015, 11, 9, 8, 0, 0, 0))),
        ];
        for (src, expected) in success_cases {
            assert_eq!(parse_temporal(src).unwrap(), expected, "{src}");
        }

        let fail_cases = ["", "tomorrow", "2015-13-01", "10:00"];
        for src in fail_cases {
            assert!(parse_temporal(src).is_err(), "{src:?} should fail");
        }
    }
}
