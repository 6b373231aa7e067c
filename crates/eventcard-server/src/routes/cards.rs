//! Card generation, preview and photo upload endpoints.

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use eventcard_core::{DecodedPhoto, EncodedImage, ExportFormat};
use serde::{Deserialize, Serialize};

use crate::cards::CardRequest;
use crate::error::ApiError;
use crate::state::AppState;
use crate::upload::{ImageHost, UploadTransform};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UrlResponse {
    pub url: String,
}

/// `POST /api/social-card`: render the export card, upload it, return its URL.
///
/// The registration must only be submitted once this succeeds.
pub async fn social_card(
    State(state): State<AppState>,
    Json(request): Json<CardRequest>,
) -> Result<Json<UrlResponse>, ApiError> {
    let url = state.cards.generate(&request).await?;
    Ok(Json(UrlResponse { url }))
}

#[derive(Debug, Default, Deserialize)]
pub struct PreviewParams {
    /// `png` (default), `jpeg` or `svg`.
    pub format: Option<String>,
}

/// `POST /api/cards/preview`: render and return the image without uploading.
pub async fn preview(
    State(state): State<AppState>,
    Query(params): Query<PreviewParams>,
    Json(request): Json<CardRequest>,
) -> Result<Response, ApiError> {
    let format = match params.format.as_deref() {
        None => ExportFormat::Png,
        Some(name) => ExportFormat::from_name(name)
            .ok_or_else(|| ApiError::validation(format!("Unsupported format: {name}")))?,
    };
    let card = state.cards.render(&request).await?;
    let image = state.cards.encode(card, format).await?;
    Ok(([(header::CONTENT_TYPE, image.mime)], image.bytes).into_response())
}

/// `POST /api/photos`: upload a raw profile photo with the profile transform.
pub async fn upload_photo(State(state): State<AppState>, body: Bytes) -> Result<Json<UrlResponse>, ApiError> {
    let photo = DecodedPhoto::from_bytes(body.to_vec()).map_err(|e| ApiError::validation(format!("Invalid image: {e}")))?;
    let image = EncodedImage {
        bytes: photo.bytes().to_vec(),
        mime: photo.mime(),
        width: photo.width,
        height: photo.height,
    };
    let url = state.cards.host().upload(image, &UploadTransform::PROFILE_PHOTO).await?;
    Ok(Json(UrlResponse { url }))
}

#[cfg(test)]
#[path = "cards_test.rs"]
mod tests;
