//! API error type and its HTTP mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use eventcard_core::{InputError, RenderError};
use serde_json::json;

use crate::cards::CardError;
use crate::store::StoreError;
use crate::upload::UploadError;

pub const RENDER_FAILED: &str = "Error generating social card";
pub const UPLOAD_FAILED: &str = "Error uploading image, please try again";
pub const SUPERSEDED: &str = "A newer card was requested";

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Conflict(String),

    /// `context` is the message shown to the client.
    #[error("{context}: {source}")]
    Persistence {
        context: &'static str,
        #[source]
        source: StoreError,
    },

    #[error(transparent)]
    Render(RenderError),

    #[error(transparent)]
    Upload(#[from] UploadError),
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Closure for `map_err` that wraps a store error with a client message.
    pub fn persistence(context: &'static str) -> impl FnOnce(StoreError) -> Self {
        move |source| Self::Persistence { context, source }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Conflict(_) | Self::Render(RenderError::Superseded) => StatusCode::CONFLICT,
            Self::Persistence { .. } | Self::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Upload(_) => StatusCode::BAD_GATEWAY,
        }
    }

    /// Message returned to the client. Internal details stay in the logs.
    pub fn message(&self) -> String {
        match self {
            Self::Validation(message) | Self::Conflict(message) => message.clone(),
            Self::Persistence { context, .. } => (*context).to_owned(),
            Self::Render(RenderError::Superseded) => SUPERSEDED.to_owned(),
            Self::Render(_) => RENDER_FAILED.to_owned(),
            Self::Upload(_) => UPLOAD_FAILED.to_owned(),
        }
    }
}

impl From<InputError> for ApiError {
    fn from(err: InputError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<RenderError> for ApiError {
    fn from(err: RenderError) -> Self {
        match err {
            RenderError::Input(input) => input.into(),
            other => Self::Render(other),
        }
    }
}

impl From<CardError> for ApiError {
    fn from(err: CardError) -> Self {
        match err {
            CardError::Render(render) => render.into(),
            CardError::Upload(upload) => upload.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            Self::Persistence { .. } => tracing::error!(error = %self, "store failure"),
            Self::Render(RenderError::Superseded) => tracing::debug!(error = %self, "stale render"),
            Self::Render(_) => tracing::error!(error = %self, "card render failed"),
            Self::Upload(_) => tracing::warn!(error = %self, "upload failed"),
            Self::Validation(_) | Self::Conflict(_) => {}
        }
        (status, Json(json!({ "success": false, "message": self.message() }))).into_response()
    }
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;
