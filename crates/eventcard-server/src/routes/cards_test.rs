use std::io::Cursor;

use axum::http::StatusCode;
use eventcard_core::RegistrantInput;

use super::*;
use crate::cards::tests::{FakeHost, lens_request};
use crate::routes::test_support::{FakeMailer, body_bytes, body_json, test_app, test_app_with};
use crate::store::MemoryStore;

fn png_photo() -> Vec<u8> {
    let image = ::image::DynamicImage::ImageRgb8(::image::RgbImage::from_pixel(4, 4, ::image::Rgb([10, 20, 30])));
    let mut bytes = Vec::new();
    image.write_to(&mut Cursor::new(&mut bytes), ::image::ImageFormat::Png).unwrap();
    bytes
}

#[tokio::test]
async fn social_card_returns_uploaded_url() {
    let app = test_app();
    let Json(body) = social_card(State(app.state.clone()), Json(lens_request(RegistrantInput::attendee("Ada"))))
        .await
        .unwrap();
    assert!(body.url.starts_with("https://cdn.example.com/upload/c_limit,g_center,w_1080,h_1080,q_100/"));
    assert_eq!(app.host.upload_count(), 1);
}

#[tokio::test]
async fn social_card_upload_failure_is_bad_gateway() {
    let app = test_app_with(MemoryStore::new(), FakeMailer::default(), FakeHost::failing());
    let err = social_card(State(app.state.clone()), Json(lens_request(RegistrantInput::attendee("Ada"))))
        .await
        .unwrap_err();
    let response = err.into_response();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], crate::error::UPLOAD_FAILED);
}

#[tokio::test]
async fn social_card_rejects_blank_name() {
    let app = test_app();
    let err = social_card(State(app.state.clone()), Json(lens_request(RegistrantInput::attendee(""))))
        .await
        .unwrap_err();
    assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    assert_eq!(app.host.upload_count(), 0);
}

#[tokio::test]
async fn preview_svg_is_not_uploaded() {
    let app = test_app();
    let response = preview(
        State(app.state.clone()),
        Query(PreviewParams { format: Some("svg".into()) }),
        Json(lens_request(RegistrantInput::speaker("Grace", "Framing Light", "Photographer"))),
    )
    .await
    .unwrap();

    assert_eq!(response.headers()[header::CONTENT_TYPE], "image/svg+xml");
    let svg = String::from_utf8(body_bytes(response).await).unwrap();
    assert!(svg.contains("<svg"));
    assert!(svg.contains("SPEAKING ON"));
    assert_eq!(app.host.upload_count(), 0);
}

#[tokio::test]
async fn preview_defaults_to_png() {
    let app = test_app();
    let response = preview(
        State(app.state.clone()),
        Query(PreviewParams::default()),
        Json(lens_request(RegistrantInput::attendee("Ada"))),
    )
    .await
    .unwrap();
    assert_eq!(response.headers()[header::CONTENT_TYPE], "image/png");
    assert_eq!(&body_bytes(response).await[1..4], b"PNG");
}

#[tokio::test]
async fn preview_rejects_unknown_format() {
    let app = test_app();
    let err = preview(
        State(app.state.clone()),
        Query(PreviewParams { format: Some("bmp".into()) }),
        Json(lens_request(RegistrantInput::attendee("Ada"))),
    )
    .await
    .unwrap_err();
    assert_eq!(err.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn photo_upload_uses_profile_transform() {
    let app = test_app();
    let Json(body) = upload_photo(State(app.state.clone()), Bytes::from(png_photo())).await.unwrap();
    assert!(body.url.contains("c_fill,g_face,w_500,h_500,q_100/"));

    let uploads = app.host.uploads.lock().unwrap();
    assert_eq!(uploads[0].0.mime, "image/png");
    assert_eq!((uploads[0].0.width, uploads[0].0.height), (4, 4));
}

#[tokio::test]
async fn photo_upload_rejects_non_images() {
    let app = test_app();
    let err = upload_photo(State(app.state.clone()), Bytes::from_static(b"not an image")).await.unwrap_err();
    assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    assert_eq!(app.host.upload_count(), 0);
}
