// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Recurrence set tests, mostly the examples of RFC 5545 Section 3.8.5.3.

use agendum_ical::{Component, Temporal, occurrences, occurrences_between, parse};
use jiff::civil::{DateTime, date, datetime};

/// Parse a single VEVENT from its content lines.
fn event(lines: &str) -> Component {
    let src = format!("BEGIN:VCALENDAR\r\nBEGIN:VEVENT\r\n{lines}END:VEVENT\r\nEND:VCALENDAR\r\n");
    let mut calendars = parse(&src).unwrap();
    let (_, _, mut children) = calendars.remove(0).into_parts();
    children.remove(0)
}

fn civil(items: impl IntoIterator<Item = Temporal>) -> Vec<DateTime> {
    items.into_iter().map(|t| t.civil()).collect()
}

fn start_of(component: &Component) -> Temporal {
    component.temporal("DTSTART").unwrap().clone()
}

#[test]
fn daily_for_ten_occurrences() {
    let event = event(
        "DTSTART;TZID=America/New_York:19970902T090000\r\n\
RRULE:FREQ=DAILY;COUNT=10\r\n",
    );
    let got = civil(occurrences(&event, &start_of(&event)).unwrap());
    let expected: Vec<_> = (2..=11).map(|d| datetime(1997, 9, d, 9, 0, 0, 0)).collect();
    assert_eq!(got, expected);
}

#[test]
fn daily_count_with_exdate() {
    let event = event(
        "DTSTART;VALUE=DATE:20151109\r\n\
RRULE:FREQ=DAILY;COUNT=6\r\n\
EXDATE;VALUE=DATE:20151111\r\n",
    );
    let got: Vec<_> = occurrences(&event, &start_of(&event))
        .unwrap()
        .map(|t| t.civil_date())
        .collect();
    assert_eq!(
        got,
        [
            date(2015, 11, 9),
            date(2015, 11, 10),
            date(2015, 11, 12),
            date(2015, 11, 13),
            date(2015, 11, 14),
        ]
    );
}

#[test]
fn every_other_week_until() {
    let event = event(
        "DTSTART;TZID=America/New_York:19970902T090000\r\n\
RRULE:FREQ=WEEKLY;UNTIL=19971224T000000Z;INTERVAL=2;WKST=SU;BYDAY=MO,WE,FR\r\n",
    );
    let got = civil(occurrences(&event, &start_of(&event)).unwrap());
    assert_eq!(got.len(), 25);
    assert_eq!(
        got[..7],
        [
            datetime(1997, 9, 2, 9, 0, 0, 0),
            datetime(1997, 9, 3, 9, 0, 0, 0),
            datetime(1997, 9, 5, 9, 0, 0, 0),
            datetime(1997, 9, 15, 9, 0, 0, 0),
            datetime(1997, 9, 17, 9, 0, 0, 0),
            datetime(1997, 9, 19, 9, 0, 0, 0),
            datetime(1997, 9, 29, 9, 0, 0, 0),
        ]
    );
    assert_eq!(got.last(), Some(&datetime(1997, 12, 22, 9, 0, 0, 0)));
}

#[test]
fn monthly_on_first_friday() {
    let event = event(
        "DTSTART;TZID=America/New_York:19970905T090000\r\n\
RRULE:FREQ=MONTHLY;COUNT=10;BYDAY=1FR\r\n",
    );
    let got: Vec<_> = occurrences(&event, &start_of(&event))
        .unwrap()
        .map(|t| t.civil_date())
        .collect();
    assert_eq!(
        got,
        [
            date(1997, 9, 5),
            date(1997, 10, 3),
            date(1997, 11, 7),
            date(1997, 12, 5),
            date(1998, 1, 2),
            date(1998, 2, 6),
            date(1998, 3, 6),
            date(1998, 4, 3),
            date(1998, 5, 1),
            date(1998, 6, 5),
        ]
    );
}

#[test]
fn last_work_day_of_month() {
    let event = event(
        "DTSTART;TZID=America/New_York:19970930T090000\r\n\
RRULE:FREQ=MONTHLY;BYDAY=MO,TU,WE,TH,FR;BYSETPOS=-1\r\n",
    );
    let got: Vec<_> = occurrences(&event, &start_of(&event))
        .unwrap()
        .take(7)
        .map(|t| t.civil_date())
        .collect();
    assert_eq!(
        got,
        [
            date(1997, 9, 30),
            date(1997, 10, 31),
            date(1997, 11, 28),
            date(1997, 12, 31),
            date(1998, 1, 30),
            date(1998, 2, 27),
            date(1998, 3, 31),
        ]
    );
}

#[test]
fn monthly_on_two_month_days() {
    let event = event(
        "DTSTART;TZID=America/New_York:19970902T090000\r\n\
RRULE:FREQ=MONTHLY;COUNT=10;BYMONTHDAY=2,15\r\n",
    );
    let got: Vec<_> = occurrences(&event, &start_of(&event))
        .unwrap()
        .map(|t| t.civil_date())
        .collect();
    let expected: Vec<_> = [(1997, 9), (1997, 10), (1997, 11), (1997, 12), (1998, 1)]
        .into_iter()
        .flat_map(|(y, m)| [date(y, m, 2), date(y, m, 15)])
        .collect();
    assert_eq!(got, expected);
}

#[test]
fn every_twentieth_monday() {
    let event = event(
        "DTSTART;TZID=America/New_York:19970519T090000\r\n\
RRULE:FREQ=YEARLY;BYDAY=20MO\r\n",
    );
    let got: Vec<_> = occurrences(&event, &start_of(&event))
        .unwrap()
        .take(3)
        .map(|t| t.civil_date())
        .collect();
    assert_eq!(got, [date(1997, 5, 19), date(1998, 5, 18), date(1999, 5, 17)]);
}

#[test]
fn yearly_in_june_and_july() {
    let event = event(
        "DTSTART;TZID=America/New_York:19970610T090000\r\n\
RRULE:FREQ=YEARLY;COUNT=10;BYMONTH=6,7\r\n",
    );
    let got: Vec<_> = occurrences(&event, &start_of(&event))
        .unwrap()
        .map(|t| t.civil_date())
        .collect();
    let expected: Vec<_> = (1997..=2001)
        .flat_map(|y| [date(y, 6, 10), date(y, 7, 10)])
        .collect();
    assert_eq!(got, expected);
}

#[test]
fn friday_the_thirteenth() {
    let event = event(
        "DTSTART;TZID=America/New_York:19970902T090000\r\n\
EXDATE;TZID=America/New_York:19970902T090000\r\n\
RRULE:FREQ=MONTHLY;BYDAY=FR;BYMONTHDAY=13\r\n",
    );
    let got: Vec<_> = occurrences(&event, &start_of(&event))
        .unwrap()
        .take(5)
        .map(|t| t.civil_date())
        .collect();
    assert_eq!(
        got,
        [
            date(1998, 2, 13),
            date(1998, 3, 13),
            date(1998, 11, 13),
            date(1999, 8, 13),
            date(2000, 10, 13),
        ]
    );
}

#[test]
fn every_three_hours_within_a_day() {
    let event = event(
        "DTSTART;TZID=America/New_York:19970902T090000\r\n\
RRULE:FREQ=HOURLY;INTERVAL=3;UNTIL=19970902T210000Z\r\n",
    );
    let got = civil(occurrences(&event, &start_of(&event)).unwrap());
    assert_eq!(
        got,
        [
            datetime(1997, 9, 2, 9, 0, 0, 0),
            datetime(1997, 9, 2, 12, 0, 0, 0),
            datetime(1997, 9, 2, 15, 0, 0, 0),
        ]
    );
}

#[test]
fn every_day_in_january_for_three_years() {
    let event = event(
        "DTSTART;TZID=America/New_York:19980101T090000\r\n\
RRULE:FREQ=DAILY;UNTIL=20000131T140000Z;BYMONTH=1\r\n",
    );
    let got: Vec<_> = occurrences(&event, &start_of(&event)).unwrap().collect();
    assert_eq!(got.len(), 93);
    assert!(got.iter().all(|t| t.civil().month() == 1));
}

#[test]
fn until_is_compared_as_utc() {
    // 07:00Z bounds a floating 08:00 start regardless of its local kind
    let event = event(
        "DTSTART:20151109T080000\r\n\
RRULE:FREQ=DAILY;UNTIL=20151110T070000Z\r\n",
    );
    let got = civil(occurrences(&event, &start_of(&event)).unwrap());
    assert_eq!(got, [datetime(2015, 11, 9, 8, 0, 0, 0)]);
}

#[test]
fn rdates_merge_without_duplicates() {
    let event = event(
        "DTSTART;VALUE=DATE:20151109\r\n\
RRULE:FREQ=WEEKLY;COUNT=3\r\n\
RDATE;VALUE=DATE:20151116,20151110\r\n\
RDATE;VALUE=DATE:20151201\r\n",
    );
    let got: Vec<_> = occurrences(&event, &start_of(&event))
        .unwrap()
        .map(|t| t.civil_date())
        .collect();
    assert_eq!(
        got,
        [
            date(2015, 11, 9),
            date(2015, 11, 10),
            date(2015, 11, 16),
            date(2015, 11, 23),
            date(2015, 12, 1),
        ]
    );
}

#[test]
fn start_without_rule() {
    let event = event("DTSTART:20151109T080000Z\r\n");
    let start = start_of(&event);
    assert_eq!(occurrences(&event, &start).unwrap().collect::<Vec<_>>(), [start.clone()]);

    let later = Temporal::Utc(datetime(2015, 11, 10, 0, 0, 0, 0));
    assert_eq!(occurrences(&event, &later).unwrap().count(), 0);
}

#[test]
fn from_of_other_kind_is_coerced() {
    let event = event(
        "DTSTART;VALUE=DATE:20151109\r\n\
RRULE:FREQ=DAILY\r\n",
    );
    let from = Temporal::Utc(datetime(2015, 11, 20, 12, 0, 0, 0));
    let first = occurrences(&event, &from).unwrap().next();
    assert_eq!(first, Some(Temporal::Date(date(2015, 11, 20))));
}

#[test]
fn windowed_query_is_half_open() {
    let event = event(
        "DTSTART:20151109T080000Z\r\n\
RRULE:FREQ=DAILY\r\n",
    );
    let start = Temporal::Utc(datetime(2015, 12, 1, 8, 0, 0, 0));
    let end = Temporal::Utc(datetime(2015, 12, 4, 8, 0, 0, 0));
    let got: Vec<_> = occurrences_between(&event, &start, &end)
        .unwrap()
        .map(|t| t.civil_date())
        .collect();
    assert_eq!(got, [date(2015, 12, 1), date(2015, 12, 2), date(2015, 12, 3)]);
}

#[test]
fn cached_queries_match_fresh_expansion() {
    #[rustfmt::skip]
    let rules = [
        "RRULE:FREQ=WEEKLY;BYDAY=MO,WE,FR\r\n",
        "RRULE:FREQ=MONTHLY;BYDAY=-1SU;COUNT=40\r\n",
        "RRULE:FREQ=DAILY;INTERVAL=10\r\n",
        "RRULE:FREQ=YEARLY;BYMONTH=1,7;BYMONTHDAY=31\r\n",
        "RRULE:FREQ=HOURLY;INTERVAL=7;BYHOUR=9,10,11,12,13;COUNT=300\r\n",
    ];
    let probes = [
        datetime(2015, 12, 31, 23, 0, 0, 0),
        datetime(2016, 3, 1, 0, 0, 0, 0),
        datetime(2016, 2, 15, 0, 0, 0, 0),
        datetime(2018, 6, 30, 12, 0, 0, 0),
    ];

    for rule in rules {
        let cached = event(&format!("DTSTART:20151109T090000\r\n{rule}"));
        let start = start_of(&cached);
        let _ = occurrences(&cached, &start).unwrap().take(500).count();

        for probe in probes {
            let from = Temporal::Floating(probe);
            let got: Vec<_> = occurrences(&cached, &from).unwrap().take(50).collect();

            // clones start with an empty cache
            let fresh = cached.clone();
            let expected: Vec<_> = occurrences(&fresh, &start)
                .unwrap()
                .skip_while(|t| *t < from)
                .take(50)
                .collect();
            assert_eq!(got, expected, "{rule} from {probe}");
        }
    }
}
