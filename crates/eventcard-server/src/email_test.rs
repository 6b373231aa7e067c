use eventcard_core::RoleDetails;

use super::*;
use crate::store::tests::{registration, speaker};

fn lens_email(registration: &Registration) -> ConfirmationEmail<'_> {
    ConfirmationEmail::for_registration(registration, EventSlug::ThroughHerLens, "https://blkat.io", 2026)
}

#[test]
fn renders_attendee_email() {
    let record = registration("Ada Lovelace", "ada@example.com", Some(EventSlug::ThroughHerLens), 0);
    let html = render_confirmation_email(&lens_email(&record));

    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains("Hi Ada Lovelace,"));
    assert!(html.contains("ATTENDEE"));
    assert!(!html.contains("Your Talk"));
    assert!(html.contains("Your Social Card"));
    assert!(html.contains("March 30, 2026"));
    assert!(html.contains("href=\"https://blkat.io/events/through-her-lens\""));
    assert!(html.contains("&copy; 2026 BLK@ Events"));
    assert!(!html.contains("{{"));
}

#[test]
fn renders_speaker_talk_section() {
    let record = speaker("Grace", "grace@example.com", Some(EventSlug::ThroughHerLens), 0);
    let html = render_confirmation_email(&lens_email(&record));
    assert!(html.contains("SPEAKER"));
    assert!(html.contains("Your Talk"));
    assert!(html.contains("Framing Light"));
}

#[test]
fn escapes_interpolated_values() {
    let mut record = registration("<b>Eve</b> & {{YEAR}}", "eve@example.com", None, 0);
    record.role = RoleDetails::Speaker { talk_title: "\"Quotes\" & <tags>".into(), bio: "x".into() };
    let html = render_confirmation_email(&lens_email(&record));

    assert!(html.contains("Hi &lt;b&gt;Eve&lt;/b&gt; &amp; {{YEAR}},"));
    assert!(html.contains("&quot;Quotes&quot; &amp; &lt;tags&gt;"));
    assert!(!html.contains("<b>Eve</b>"));
}

#[test]
fn omits_card_section_without_url() {
    let mut record = registration("Ada", "ada@example.com", None, 0);
    record.social_card.clear();
    let html = render_confirmation_email(&lens_email(&record));
    assert!(!html.contains("Your Social Card"));
}

#[test]
fn lockup_tail_row_only_when_present() {
    let record = registration("Tolu", "tolu@example.com", None, 0);
    let lagos = ConfirmationEmail::for_registration(&record, EventSlug::ThisIsLagos, "https://blkat.io", 2026);
    let html = render_confirmation_email(&lagos);
    assert!(html.contains(">Lagos</p>"));
    assert!(!html.contains("font-style: italic"));
    assert_eq!(lagos.subject(), "Registration Confirmed - This Is Lagos");

    let lens = render_confirmation_email(&lens_email(&record));
    assert!(lens.contains(">Lens</p>"));
}

#[test]
fn fill_keeps_unknown_and_unterminated_placeholders() {
    let out = fill("a {{X}} b {{Y}} c {{open", |key| (key == "X").then(|| "1".to_owned()));
    assert_eq!(out, "a 1 b {{Y}} c {{open");
}

#[tokio::test]
async fn disabled_mailer_reports_disabled() {
    let email = OutgoingEmail { to: "a@example.com".into(), subject: "s".into(), html: "h".into() };
    assert!(matches!(DisabledMailer.send(&email).await, Err(EmailError::Disabled)));
}
