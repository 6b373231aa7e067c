//! CSV export of registrations.

use std::borrow::Cow;

use eventcard_core::EventSlug;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::store::Registration;

pub const HEADERS: [&str; 10] = [
    "Name",
    "Email",
    "Phone",
    "Organization",
    "Role",
    "Event",
    "Talk Title",
    "Bio",
    "Email Sent",
    "Registered At",
];

/// Quote `value` if it contains a comma, quote, CR or LF. Inner quotes are doubled.
pub fn escape(value: &str) -> Cow<'_, str> {
    if value.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(value)
    }
}

fn row(record: &Registration) -> String {
    let registered_at = record.created_at.format(&Rfc3339).unwrap_or_default();
    let fields = [
        escape(&record.name),
        escape(&record.email),
        escape(&record.phone_number),
        escape(record.organization.as_deref().unwrap_or_default()),
        escape(record.role().as_str()),
        escape(record.event.map(EventSlug::as_str).unwrap_or_default()),
        escape(record.role.talk_title().unwrap_or_default()),
        escape(record.role.bio().unwrap_or_default()),
        Cow::Borrowed(if record.email_sent { "Yes" } else { "No" }),
        escape(&registered_at),
    ];
    fields.join(",")
}

/// Header line plus one line per record, joined with `\n`.
pub fn export(records: &[Registration]) -> String {
    std::iter::once(HEADERS.join(","))
        .chain(records.iter().map(row))
        .collect::<Vec<_>>()
        .join("\n")
}

/// `registrations-{event|all}-{timestamp}.csv`, with `:` and `.` in the timestamp replaced.
pub fn filename(event: Option<EventSlug>, at: OffsetDateTime) -> String {
    let timestamp = at.format(&Rfc3339).unwrap_or_default().replace([':', '.'], "-");
    let event = event.map_or("all", EventSlug::as_str);
    format!("registrations-{event}-{timestamp}.csv")
}

#[cfg(test)]
#[path = "csv_test.rs"]
mod tests;
