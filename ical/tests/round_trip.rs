// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Round-trip tests for the iCalendar parser and formatter.
//!
//! These tests verify that parsing, formatting and parsing again produces
//! an equal tree, and that canonical input is reproduced byte for byte.

use agendum_ical::formatter::{FormatOptions, FoldingStyle};
use agendum_ical::{ComponentKind, parse, serialize};

fn assert_round_trip(original: &str) {
    let calendars1 = parse(original).unwrap();
    let formatted = serialize(&calendars1).unwrap();
    let calendars2 = parse(&formatted).unwrap();
    assert_eq!(calendars1, calendars2, "Calendars should be equal after round-trip");
    assert_eq!(formatted, original, "Canonical input should be reproduced");
}

#[test]
fn round_trip_simple_calendar() {
    assert_round_trip(
        "BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
PRODID:-//Example Corp.//Cal Client 1.0//EN\r\n\
BEGIN:VEVENT\r\n\
UID:12345@example.com\r\n\
DTSTAMP:20250110T120000Z\r\n\
DTSTART:20250110T140000Z\r\n\
DTEND:20250110T150000Z\r\n\
SUMMARY:Test Event\r\n\
END:VEVENT\r\n\
END:VCALENDAR\r\n",
    );
}

#[test]
fn round_trip_keeps_property_and_parameter_order() {
    assert_round_trip(
        "BEGIN:VCALENDAR\r\n\
PRODID:-//Example Corp.//Cal Client 1.0//EN\r\n\
X-WR-CALNAME:Team\r\n\
VERSION:2.0\r\n\
BEGIN:VEVENT\r\n\
SUMMARY:Review\\, part 2\\; final\r\n\
DTSTART;TZID=Europe/Berlin:20250110T140000\r\n\
UID:event1@example.com\r\n\
ATTENDEE;RSVP=TRUE;CN=\"Doe, Jane\";ROLE=REQ-PARTICIPANT:mailto:jane@example.\r\n com\r\n\
CATEGORIES:WORK,MEETING\r\n\
X-CUSTOM;X-PARAM=a,b:raw value\r\n\
DTSTAMP:20250110T120000Z\r\n\
COMMENT:first\r\n\
COMMENT:second\r\n\
END:VEVENT\r\n\
END:VCALENDAR\r\n",
    );
}

#[test]
fn round_trip_recurrence_properties() {
    assert_round_trip(
        "BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
PRODID:-//Example Corp.//Cal Client 1.0//EN\r\n\
BEGIN:VEVENT\r\n\
UID:series@example.com\r\n\
DTSTAMP:20250110T120000Z\r\n\
DTSTART;VALUE=DATE:20151109\r\n\
RRULE:FREQ=WEEKLY;INTERVAL=2;BYDAY=MO,FR;WKST=SU\r\n\
RDATE;VALUE=DATE:20151125,20151126\r\n\
EXDATE;VALUE=DATE:20151123\r\n\
DURATION:P1D\r\n\
END:VEVENT\r\n\
BEGIN:VEVENT\r\n\
UID:series@example.com\r\n\
DTSTAMP:20250110T120000Z\r\n\
RECURRENCE-ID;VALUE=DATE:20151109\r\n\
DTSTART;VALUE=DATE:20151110\r\n\
END:VEVENT\r\n\
END:VCALENDAR\r\n",
    );
}

#[test]
fn round_trip_timezone_todo_and_alarm() {
    assert_round_trip(
        "BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
PRODID:-//Example Corp.//Cal Client 1.0//EN\r\n\
BEGIN:VTIMEZONE\r\n\
TZID:Europe/Berlin\r\n\
BEGIN:STANDARD\r\n\
DTSTART:19701025T030000\r\n\
TZOFFSETFROM:+0200\r\n\
TZOFFSETTO:+0100\r\n\
RRULE:FREQ=YEARLY;BYDAY=-1SU;BYMONTH=10\r\n\
TZNAME:CET\r\n\
END:STANDARD\r\n\
BEGIN:DAYLIGHT\r\n\
DTSTART:19700329T020000\r\n\
TZOFFSETFROM:+0100\r\n\
TZOFFSETTO:+0200\r\n\
RRULE:FREQ=YEARLY;BYDAY=-1SU;BYMONTH=3\r\n\
TZNAME:CEST\r\n\
END:DAYLIGHT\r\n\
END:VTIMEZONE\r\n\
BEGIN:VTODO\r\n\
UID:todo@example.com\r\n\
DTSTAMP:20250110T120000Z\r\n\
DUE;TZID=Europe/Berlin:20250115T170000\r\n\
PRIORITY:1\r\n\
PERCENT-COMPLETE:40\r\n\
GEO:37.386013;-122.082932\r\n\
BEGIN:VALARM\r\n\
ACTION:DISPLAY\r\n\
DESCRIPTION:Due soon\r\n\
TRIGGER;RELATED=END:-PT1H30M\r\n\
END:VALARM\r\n\
END:VTODO\r\n\
BEGIN:VFREEBUSY\r\n\
UID:fb@example.com\r\n\
DTSTAMP:20250110T120000Z\r\n\
FREEBUSY;FBTYPE=BUSY:20250110T140000Z/PT1H,20250111T090000Z/20250111T100000\r\n Z\r\n\
END:VFREEBUSY\r\n\
END:VCALENDAR\r\n",
    );
}

#[test]
fn round_trip_folded_lines() {
    let description = "A long description that certainly needs folding because it runs \
                       well past the seventy-five octet limit, with ünïcödé inside.";
    let original = format!(
        "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nBEGIN:VJOURNAL\r\nDESCRIPTION:{description}\r\nEND:VJOURNAL\r\nEND:VCALENDAR\r\n"
    );
    let calendars = parse(&original).unwrap();
    let formatted = serialize(&calendars).unwrap();
    assert!(formatted.split("\r\n").all(|line| line.len() <= 75));
    assert!(formatted.contains("\r\n "));
    assert_eq!(parse(&formatted).unwrap(), calendars);

    let journal = &calendars[0].children()[0];
    assert_eq!(journal.kind(), ComponentKind::VJournal);
    assert_eq!(
        journal.get_one("DESCRIPTION").and_then(|p| p.value().as_text()),
        Some(description)
    );
}

#[test]
fn round_trip_with_tab_folding() {
    let original = "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:-//Example Corp.//Cal Client 1.0//EN\r\nEND:VCALENDAR\r\n";
    let calendars = parse(original).unwrap();
    let options = FormatOptions::default()
        .folding(Some(20))
        .folding_style(FoldingStyle::Tab);
    let formatted = options.write_to_string(&calendars).unwrap();
    assert!(formatted.contains("\r\n\t"));
    assert_eq!(parse(&formatted).unwrap(), calendars);
}
