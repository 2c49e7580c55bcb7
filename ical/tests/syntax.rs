// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Integration tests for the iCalendar syntax layer
//!
//! These tests validate unfolding, content line splitting and block nesting
//! on realistic iCalendar content and edge cases.

use agendum_ical::ParseError;
use agendum_ical::syntax::{RawComponent, SyntaxError, syntax_analysis};

/// Test helper to parse and get the first component
fn parse_first_component(src: &str) -> RawComponent {
    let components = syntax_analysis(src).unwrap();
    components.into_iter().next().unwrap()
}

#[test]
fn syntax_empty_component() {
    let src = "\
BEGIN:VCALENDAR\r
END:VCALENDAR\r
";
    let components = syntax_analysis(src).unwrap();
    assert_eq!(components.len(), 1);
    assert_eq!(components[0].name, "VCALENDAR");
    assert!(components[0].properties.is_empty());
    assert!(components[0].children.is_empty());
}

#[test]
fn syntax_multiple_properties() {
    let src = "\
BEGIN:VCALENDAR\r
VERSION:2.0\r
PRODID:-//Example Corp.//CalDAV Client//EN\r
CALSCALE:GREGORIAN\r
END:VCALENDAR\r
";
    let comp = parse_first_component(src);
    let names: Vec<_> = comp.properties.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, ["VERSION", "PRODID", "CALSCALE"]);
    assert_eq!(comp.properties[1].value, "-//Example Corp.//CalDAV Client//EN");
}

#[test]
fn syntax_parameters_and_quoting() {
    let src = "\
BEGIN:VEVENT\r
ATTENDEE;ROLE=REQ-PARTICIPANT;DELEGATED-FROM=\"mailto:a@example.com\",\"mailto:b@example.com\";CN=\"Doe; Jane\":mailto:jane@example.com\r
END:VEVENT\r
";
    let comp = parse_first_component(src);
    let attendee = &comp.properties[0];
    assert_eq!(attendee.name, "ATTENDEE");
    assert_eq!(attendee.parameters.len(), 3);

    let delegated = &attendee.parameters[1];
    assert_eq!(delegated.name, "DELEGATED-FROM");
    let values: Vec<_> = delegated.values.iter().map(|v| v.value.as_str()).collect();
    assert_eq!(values, ["mailto:a@example.com", "mailto:b@example.com"]);
    assert!(delegated.values.iter().all(|v| v.quoted));

    assert_eq!(attendee.parameters[2].values[0].value, "Doe; Jane");
    assert_eq!(attendee.value, "mailto:jane@example.com");
}

#[test]
fn syntax_unfolds_continuation_lines() {
    let src = "\
BEGIN:VEVENT\r
DESCRIPTION:This is a lo\r
 ng description\r
\tthat spans lines\r
SUMM\r
 ARY:Folded name\r
END:VEVENT\r
";
    let comp = parse_first_component(src);
    assert_eq!(comp.properties[0].value, "This is a long descriptionthat spans lines");
    assert_eq!(comp.properties[1].name, "SUMMARY");
    assert_eq!(comp.properties[1].value, "Folded name");
}

#[test]
fn syntax_value_keeps_colons_and_semicolons() {
    let src = "\
BEGIN:VEVENT\r
URL:https://example.com/a;b?c=d:e\r
END:VEVENT\r
";
    let comp = parse_first_component(src);
    assert_eq!(comp.properties[0].value, "https://example.com/a;b?c=d:e");
}

#[test]
fn syntax_nested_components() {
    let src = "\
BEGIN:VCALENDAR\r
BEGIN:VTIMEZONE\r
TZID:Europe/Berlin\r
BEGIN:STANDARD\r
TZOFFSETFROM:+0200\r
END:STANDARD\r
BEGIN:DAYLIGHT\r
TZOFFSETFROM:+0100\r
END:DAYLIGHT\r
END:VTIMEZONE\r
BEGIN:VEVENT\r
END:VEVENT\r
END:VCALENDAR\r
";
    let comp = parse_first_component(src);
    let children: Vec<_> = comp.children.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(children, ["VTIMEZONE", "VEVENT"]);
    let observances: Vec<_> = comp.children[0]
        .children
        .iter()
        .map(|c| c.name.as_str())
        .collect();
    assert_eq!(observances, ["STANDARD", "DAYLIGHT"]);
}

#[test]
fn syntax_rejects_bare_line_feeds() {
    let src = "BEGIN:VCALENDAR\nVERSION:2.0\nEND:VCALENDAR\n";
    let err = syntax_analysis(src).unwrap_err();
    assert!(
        matches!(err, ParseError::Syntax(SyntaxError::InvalidCharacter { .. })),
        "{err:?}"
    );
}

#[test]
fn syntax_rejects_malformed_lines() {
    let src = "BEGIN:VCALENDAR\r\nVERSION 2.0\r\nEND:VCALENDAR\r\n";
    let err = syntax_analysis(src).unwrap_err();
    assert!(
        matches!(err, ParseError::Syntax(SyntaxError::MissingColon { .. })),
        "{err:?}"
    );

    let src = "BEGIN:VCALENDAR\r\n;X=1:2.0\r\nEND:VCALENDAR\r\n";
    let err = syntax_analysis(src).unwrap_err();
    assert!(
        matches!(err, ParseError::Syntax(SyntaxError::MissingName { .. })),
        "{err:?}"
    );
}

#[test]
fn syntax_rejects_unbalanced_blocks() {
    #[rustfmt::skip]
    let fail_cases = [
        "BEGIN:VCALENDAR\r\nBEGIN:VEVENT\r\nEND:VCALENDAR\r\n",
        "BEGIN:VCALENDAR\r\n",
        "END:VCALENDAR\r\n",
        "BEGIN:VCALENDAR\r\nEND:VCALENDAR\r\nEND:VCALENDAR\r\n",
    ];
    for src in fail_cases {
        let err = syntax_analysis(src).unwrap_err();
        assert!(
            matches!(err, ParseError::UnbalancedComponent { .. }),
            "{src:?}: {err:?}"
        );
    }
}
