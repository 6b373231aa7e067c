use time::macros::datetime;

use super::*;
use crate::store::tests::{registration, speaker};

#[test]
fn escape_leaves_plain_values() {
    assert_eq!(escape("Ada Lovelace"), "Ada Lovelace");
    assert!(matches!(escape("plain"), Cow::Borrowed(_)));
}

#[test]
fn escape_quotes_separators_and_doubles_quotes() {
    assert_eq!(escape("Doe, Jane"), "\"Doe, Jane\"");
    assert_eq!(escape("say \"hi\""), "\"say \"\"hi\"\"\"");
    assert_eq!(escape("two\nlines"), "\"two\nlines\"");
    assert_eq!(escape("cr\rhere"), "\"cr\rhere\"");
}

#[test]
fn header_line() {
    insta::assert_snapshot!(
        export(&[]),
        @"Name,Email,Phone,Organization,Role,Event,Talk Title,Bio,Email Sent,Registered At"
    );
}

#[test]
fn rows_follow_header() {
    let mut jane = registration("Doe, Jane", "jane@example.com", Some(EventSlug::ThroughHerLens), 0);
    jane.organization = Some("Lens Co".to_owned());
    jane.email_sent = true;
    let mut old = speaker("Old Timer", "old@example.com", None, 5);
    old.phone_number = "0800".to_owned();

    let csv = export(&[jane, old]);
    let lines: Vec<_> = csv.split('\n').collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(
        lines[1],
        "\"Doe, Jane\",jane@example.com,+2348000000000,Lens Co,attendee,through-her-lens,,,Yes,2026-03-01T09:00:00Z"
    );
    assert_eq!(
        lines[2],
        "Old Timer,old@example.com,0800,,speaker,,Framing Light,Photographer,No,2026-03-01T09:05:00Z"
    );
}

#[test]
fn filename_names_event_and_timestamp() {
    let at = datetime!(2026-03-30 10:15:30 UTC);
    assert_eq!(
        filename(Some(EventSlug::ThisIsLagos), at),
        "registrations-this-is-lagos-2026-03-30T10-15-30Z.csv"
    );
    assert!(filename(None, at).starts_with("registrations-all-"));
}
