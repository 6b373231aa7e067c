//! Registration submission and existing-registration lookup.

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use eventcard_core::{EventSlug, RoleDetails};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::email::{ConfirmationEmail, EmailError, Mailer, OutgoingEmail, render_confirmation_email};
use crate::error::ApiError;
use crate::state::AppState;
use crate::store::{Registration, RegistrationStore, StoreError};

pub const ALREADY_REGISTERED: &str = "Already registered for this event";
pub const REGISTRATION_FAILED: &str = "Error processing registration";

// =============================================================================
// LOOKUP
// =============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct LookupParams {
    pub email: Option<String>,
    pub event: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupResponse {
    pub registered: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub social_card: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl LookupResponse {
    fn not_registered() -> Self {
        Self { registered: false, social_card: None, name: None }
    }
}

/// `GET /api/register?email=&event=`: whether `email` already registered for `event`.
///
/// Missing parameters, unknown events and store errors all answer `registered: false`.
pub async fn lookup(State(state): State<AppState>, Query(params): Query<LookupParams>) -> Json<LookupResponse> {
    let (Some(email), Some(event)) = (params.email, params.event) else {
        return Json(LookupResponse::not_registered());
    };
    let Ok(event) = event.parse::<EventSlug>() else {
        return Json(LookupResponse::not_registered());
    };

    match state.store.find(&email, event).await {
        Ok(Some(existing)) => Json(LookupResponse {
            registered: true,
            social_card: Some(existing.social_card),
            name: Some(existing.name),
        }),
        Ok(None) => Json(LookupResponse::not_registered()),
        Err(e) => {
            tracing::error!(error = %e, "registration lookup failed");
            Json(LookupResponse::not_registered())
        }
    }
}

// =============================================================================
// SUBMIT
// =============================================================================

/// Registration form body. Fields are loosely typed so validation can answer
/// with specific messages.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RegisterRequest {
    pub event: String,
    pub role: String,
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub organization: Option<String>,
    pub talk_title: Option<String>,
    pub bio: Option<String>,
    pub profile_photo: String,
    pub social_card: String,
}

impl RegisterRequest {
    /// Validate the form and build the record to store.
    pub fn into_registration(self, now: OffsetDateTime) -> Result<Registration, ApiError> {
        let event: EventSlug = self.event.parse().map_err(|_| ApiError::validation("Invalid event"))?;
        let role = RoleDetails::from_parts(&self.role, self.talk_title.as_deref(), self.bio.as_deref())?;
        if matches!(role, RoleDetails::Speaker { .. }) && !event.config().speakers_enabled {
            return Err(ApiError::validation("Speakers are not enabled for this event"));
        }
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ApiError::validation("Name is required"));
        }
        let social_card = self.social_card.trim();
        if social_card.is_empty() {
            return Err(ApiError::validation("Social card is required"));
        }

        Ok(Registration {
            id: Uuid::new_v4(),
            event: Some(event),
            name: name.to_owned(),
            email: self.email.trim().to_owned(),
            phone_number: self.phone_number.trim().to_owned(),
            organization: self
                .organization
                .map(|o| o.trim().to_owned())
                .filter(|o| !o.is_empty()),
            role,
            profile_photo: self.profile_photo.trim().to_owned(),
            social_card: social_card.to_owned(),
            email_sent: false,
            created_at: now,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub success: bool,
    pub registration_id: Uuid,
    pub email_sent: bool,
}

/// Render and send the confirmation email. Failures are logged, never fatal.
async fn send_confirmation(state: &AppState, registration: &Registration, event: EventSlug) -> bool {
    let now = OffsetDateTime::now_utc();
    let params = ConfirmationEmail::for_registration(registration, event, &state.public_event_url, now.year());
    let email = OutgoingEmail {
        to: registration.email.clone(),
        subject: params.subject(),
        html: render_confirmation_email(&params),
    };

    match state.mailer.send(&email).await {
        Ok(()) => true,
        Err(EmailError::Disabled) => {
            tracing::info!("confirmation email skipped: email not configured");
            false
        }
        Err(e) => {
            tracing::warn!(error = %e, id = %registration.id, "confirmation email failed");
            false
        }
    }
}

/// `POST /api/register`: validate, store, then send the confirmation email.
pub async fn submit(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    let registration = body.into_registration(OffsetDateTime::now_utc())?;
    let id = registration.id;
    let event = registration.event.unwrap_or(EventSlug::LEGACY);

    match state.store.insert(registration.clone()).await {
        Ok(()) => {}
        Err(StoreError::Duplicate) => return Err(ApiError::Conflict(ALREADY_REGISTERED.to_owned())),
        Err(e) => return Err(ApiError::persistence(REGISTRATION_FAILED)(e)),
    }
    tracing::info!(%id, %event, role = %registration.role(), "registration stored");

    let email_sent = send_confirmation(&state, &registration, event).await;
    if email_sent {
        if let Err(e) = state.store.mark_email_sent(id).await {
            tracing::warn!(error = %e, %id, "could not record sent email");
        }
    }

    Ok((StatusCode::CREATED, Json(RegisterResponse { success: true, registration_id: id, email_sent })))
}

#[cfg(test)]
#[path = "register_test.rs"]
mod tests;
