//! Registration confirmation emails.
//!
//! The HTML body is a static template with `{{KEY}}` placeholders filled in
//! a single pass, so registrant text can never inject another placeholder.
//! Every interpolated value is HTML-escaped.

use eventcard_core::config::EventConfig;
use eventcard_core::{EventSlug, Role};
use resend_rs::Resend;
use resend_rs::types::CreateEmailBaseOptions;

use crate::store::Registration;

const CONFIRMATION_TEMPLATE: &str = include_str!("../templates/registration_confirmation.html");

#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    #[error("email sending is not configured")]
    Disabled,
    #[error("email delivery failed: {0}")]
    Delivery(String),
}

/// Everything the confirmation template needs.
#[derive(Debug, Clone)]
pub struct ConfirmationEmail<'a> {
    pub name: &'a str,
    pub role: Role,
    pub event: &'static EventConfig,
    pub talk_title: Option<&'a str>,
    pub social_card_url: Option<&'a str>,
    pub event_url: String,
    pub year: i32,
}

impl<'a> ConfirmationEmail<'a> {
    pub fn for_registration(registration: &'a Registration, event: EventSlug, public_event_url: &str, year: i32) -> Self {
        let config = event.config();
        Self {
            name: &registration.name,
            role: registration.role(),
            event: config,
            talk_title: registration.role.talk_title(),
            social_card_url: Some(registration.social_card.as_str()).filter(|url| !url.is_empty()),
            event_url: format!("{public_event_url}{}", config.page_path),
            year,
        }
    }

    pub fn subject(&self) -> String {
        format!("Registration Confirmed - {}", self.event.name)
    }
}

/// Escape text for HTML element content and attribute values.
pub fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn role_badge(role: Role) -> String {
    let label = role.badge_label();
    match role {
        Role::Speaker => format!(
            r#"<span style="display: inline-block; background-color: #dc2626; color: #ffffff; font-size: 12px; font-weight: 700; padding: 6px 24px; border-radius: 9999px; letter-spacing: 1px;">{label}</span>"#
        ),
        Role::Attendee => format!(
            r#"<span style="display: inline-block; color: #dc2626; font-size: 12px; font-weight: 700; padding: 4px 22px; border-radius: 9999px; letter-spacing: 1px; border: 2px solid #dc2626;">{label}</span>"#
        ),
    }
}

fn talk_section(title: &str) -> String {
    format!(
        r##"<tr>
                        <td style="padding: 10px 30px 20px 30px;">
                            <table width="100%" cellpadding="0" cellspacing="0" border="0" style="border-radius: 8px; border: 1px solid #333333; border-left: 4px solid #dc2626;" bgcolor="#1a1a1a">
                                <tr>
                                    <td style="padding: 18px 20px;">
                                        <p style="margin: 0 0 6px 0; font-size: 12px; color: #888888; text-transform: uppercase; letter-spacing: 1px;">Your Talk</p>
                                        <p style="margin: 0; font-size: 16px; color: #ffffff; font-weight: 600;">{}</p>
                                    </td>
                                </tr>
                            </table>
                        </td>
                    </tr>"##,
        escape_html(title)
    )
}

fn card_section(url: &str) -> String {
    format!(
        r#"<tr>
                        <td align="center" style="padding: 10px 30px 20px 30px;">
                            <p style="margin: 0 0 10px 0; font-size: 12px; color: #888888; text-transform: uppercase; letter-spacing: 2px;">Your Social Card</p>
                            <img src="{}" alt="Your Social Card" width="300" style="width: 100%; max-width: 300px; height: auto; display: block; border-radius: 8px; border: 0;" />
                        </td>
                    </tr>"#,
        escape_html(url)
    )
}

/// Replace every `{{KEY}}` in `template` in one pass. Unknown keys are kept.
fn fill(template: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            rest = &rest[start..];
            break;
        };
        let key = &after[..end];
        match lookup(key) {
            Some(value) => out.push_str(&value),
            None => {
                out.push_str("{{");
                out.push_str(key);
                out.push_str("}}");
            }
        }
        rest = &after[end + 2..];
    }
    out.push_str(rest);
    out
}

#[must_use]
pub fn render_confirmation_email(params: &ConfirmationEmail<'_>) -> String {
    let lockup = &params.event.lockup;
    fill(CONFIRMATION_TEMPLATE, |key| {
        let value = match key {
            "EVENT_NAME" => escape_html(params.event.name),
            "LOCKUP_LEAD" => escape_html(lockup.lead),
            "LOCKUP_ACCENT" => escape_html(lockup.accent),
            "LOCKUP_TAIL" if lockup.tail.is_empty() => String::new(),
            "LOCKUP_TAIL" => format!(
                r#"<p style="margin: 0; font-size: 24px; font-style: italic; color: #cccccc; font-family: Georgia, 'Times New Roman', serif;">{}</p>"#,
                escape_html(lockup.tail)
            ),
            "NAME" => escape_html(params.name),
            "ROLE_BADGE" => role_badge(params.role),
            "DATE" => escape_html(params.event.date),
            "TIME" => escape_html(params.event.time),
            "VENUE" => escape_html(params.event.venue),
            "TALK_SECTION" => match (params.role, params.talk_title) {
                (Role::Speaker, Some(title)) => talk_section(title),
                _ => String::new(),
            },
            "CARD_SECTION" => params.social_card_url.map(card_section).unwrap_or_default(),
            "EVENT_URL" => escape_html(&params.event_url),
            "YEAR" => params.year.to_string(),
            _ => return None,
        };
        Some(value)
    })
    .trim()
    .to_owned()
}

// =============================================================================
// MAILER
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub html: String,
}

/// Async seam over email delivery. Enables fakes in handler tests.
#[async_trait::async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), EmailError>;
}

/// Delivers through the Resend API.
pub struct ResendMailer {
    client: Resend,
    from: String,
}

impl ResendMailer {
    pub fn new(api_key: &str, from: impl Into<String>) -> Self {
        Self { client: Resend::new(api_key), from: from.into() }
    }
}

#[async_trait::async_trait]
impl Mailer for ResendMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), EmailError> {
        let to = [email.to.as_str()];
        let options = CreateEmailBaseOptions::new(self.from.as_str(), to, email.subject.as_str()).with_html(&email.html);
        self.client
            .emails
            .send(options)
            .await
            .map_err(|e| EmailError::Delivery(e.to_string()))?;
        Ok(())
    }
}

/// Used when no API key is configured; every send reports [`EmailError::Disabled`].
pub struct DisabledMailer;

#[async_trait::async_trait]
impl Mailer for DisabledMailer {
    async fn send(&self, _email: &OutgoingEmail) -> Result<(), EmailError> {
        Err(EmailError::Disabled)
    }
}

#[cfg(test)]
#[path = "email_test.rs"]
mod tests;
