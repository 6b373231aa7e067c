use axum::response::IntoResponse;

use super::*;
use crate::cards::tests::FakeHost;
use crate::routes::test_support::{FakeMailer, body_json, test_app, test_app_with};
use crate::store::{MemoryStore, RegistrationFilter, RegistrationStore};

fn attendee_form() -> RegisterRequest {
    RegisterRequest {
        event: "through-her-lens".into(),
        role: "attendee".into(),
        name: "Ada Lovelace".into(),
        email: "ada@example.com".into(),
        phone_number: "+2348000000000".into(),
        organization: Some("  ".into()),
        talk_title: None,
        bio: None,
        profile_photo: "https://cdn.example.com/p.jpg".into(),
        social_card: "https://cdn.example.com/c.png".into(),
    }
}

async fn submit_err(state: &AppState, form: RegisterRequest) -> (StatusCode, serde_json::Value) {
    let err = submit(State(state.clone()), Json(form)).await.unwrap_err();
    let response = err.into_response();
    (response.status(), body_json(response).await)
}

#[tokio::test]
async fn submit_creates_registration_and_sends_email() {
    let app = test_app();
    let (status, Json(body)) = submit(State(app.state.clone()), Json(attendee_form())).await.unwrap();

    assert_eq!(status, StatusCode::CREATED);
    assert!(body.success);
    assert!(body.email_sent);

    let sent = app.mailer.sent.lock().unwrap().clone();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "ada@example.com");
    assert_eq!(sent[0].subject, "Registration Confirmed - Through Her Lens");

    let stored = app.store.find("ada@example.com", EventSlug::ThroughHerLens).await.unwrap().unwrap();
    assert_eq!(stored.id, body.registration_id);
    assert!(stored.email_sent);
    assert_eq!(stored.organization, None);
}

#[tokio::test]
async fn duplicate_submission_is_conflict() {
    let app = test_app();
    let (status, _) = submit(State(app.state.clone()), Json(attendee_form())).await.unwrap();
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = submit_err(&app.state, attendee_form()).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], ALREADY_REGISTERED);
    assert_eq!(body["success"], false);

    let all = app.store.export(&RegistrationFilter::default()).await.unwrap();
    assert_eq!(all.len(), 1);
}

#[tokio::test]
async fn email_failure_is_not_fatal() {
    let app = test_app_with(MemoryStore::new(), FakeMailer::failing(), FakeHost::default());
    let (status, Json(body)) = submit(State(app.state.clone()), Json(attendee_form())).await.unwrap();
    assert_eq!(status, StatusCode::CREATED);
    assert!(!body.email_sent);

    let stored = app.store.find("ada@example.com", EventSlug::ThroughHerLens).await.unwrap().unwrap();
    assert!(!stored.email_sent);
}

#[tokio::test]
async fn validation_messages() {
    let app = test_app();
    let cases = [
        (RegisterRequest { event: "moonbase".into(), ..attendee_form() }, "Invalid event"),
        (
            RegisterRequest { role: "host".into(), ..attendee_form() },
            "Invalid role. Must be \"attendee\" or \"speaker\"",
        ),
        (
            RegisterRequest { role: "speaker".into(), talk_title: Some("Light".into()), ..attendee_form() },
            "Speakers must provide a talk title and bio",
        ),
        (
            RegisterRequest {
                event: "this-is-lagos".into(),
                role: "speaker".into(),
                talk_title: Some("Light".into()),
                bio: Some("Bio".into()),
                ..attendee_form()
            },
            "Speakers are not enabled for this event",
        ),
        (RegisterRequest { name: "   ".into(), ..attendee_form() }, "Name is required"),
        (RegisterRequest { social_card: String::new(), ..attendee_form() }, "Social card is required"),
    ];

    for (form, message) in cases {
        let (status, body) = submit_err(&app.state, form).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{message}");
        assert_eq!(body["message"], message);
    }
    assert!(app.store.export(&RegistrationFilter::default()).await.unwrap().is_empty());
}

#[tokio::test]
async fn speaker_registration_keeps_talk_details() {
    let app = test_app();
    let form = RegisterRequest {
        role: "speaker".into(),
        talk_title: Some("Framing Light".into()),
        bio: Some("Photographer".into()),
        ..attendee_form()
    };
    submit(State(app.state.clone()), Json(form)).await.unwrap();

    let stored = app.store.find("ada@example.com", EventSlug::ThroughHerLens).await.unwrap().unwrap();
    assert_eq!(stored.role.talk_title(), Some("Framing Light"));
    let sent = app.mailer.sent.lock().unwrap();
    assert!(sent[0].html.contains("Your Talk"));
}

#[test]
fn request_accepts_camel_case_body() {
    let form: RegisterRequest = serde_json::from_str(
        r#"{"event":"through-her-lens","role":"speaker","name":"Grace","email":"g@example.com",
            "phoneNumber":"0800","talkTitle":"T","bio":"B","profilePhoto":"p","socialCard":"c"}"#,
    )
    .unwrap();
    assert_eq!(form.phone_number, "0800");
    assert_eq!(form.talk_title.as_deref(), Some("T"));
}

#[tokio::test]
async fn lookup_reports_existing_registration() {
    let app = test_app();
    submit(State(app.state.clone()), Json(attendee_form())).await.unwrap();

    let params = LookupParams { email: Some("ada@example.com".into()), event: Some("through-her-lens".into()) };
    let Json(found) = lookup(State(app.state.clone()), Query(params)).await;
    assert_eq!(
        found,
        LookupResponse {
            registered: true,
            social_card: Some("https://cdn.example.com/c.png".into()),
            name: Some("Ada Lovelace".into()),
        }
    );
}

#[tokio::test]
async fn lookup_without_match_or_params_is_not_registered() {
    let app = test_app();
    let cases = [
        LookupParams::default(),
        LookupParams { email: Some("ada@example.com".into()), event: None },
        LookupParams { email: Some("ada@example.com".into()), event: Some("moonbase".into()) },
        LookupParams { email: Some("ada@example.com".into()), event: Some("through-her-lens".into()) },
    ];
    for params in cases {
        let Json(response) = lookup(State(app.state.clone()), Query(params)).await;
        assert_eq!(response, LookupResponse::not_registered());
        assert_eq!(serde_json::to_value(&response).unwrap(), serde_json::json!({ "registered": false }));
    }
}
