//! Image host uploads.
//!
//! DESIGN
//! ======
//! `ImageHost` is the seam between card generation and the CDN. The
//! Cloudinary implementation posts an unsigned multipart upload and returns
//! the `secure_url` with a delivery transformation inserted after `/upload/`,
//! so the stored URL already serves the resized variant.

use std::time::Duration;

use eventcard_core::EncodedImage;
use reqwest::multipart::{Form, Part};

use crate::config::CloudinaryConfig;

pub const CLOUDINARY_API_BASE: &str = "https://api.cloudinary.com";

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("image host credentials are not configured")]
    MissingCredentials,
    #[error("upload request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("upload timed out after {0:?}")]
    Timeout(Duration),
    #[error("image host rejected the upload ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("unexpected image host response: {0}")]
    MalformedResponse(String),
}

/// Delivery transformation applied to an uploaded image's URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadTransform {
    pub width: u32,
    pub height: u32,
    pub crop: &'static str,
    pub gravity: &'static str,
    pub quality: u8,
}

impl UploadTransform {
    pub const PROFILE_PHOTO: Self = Self { width: 500, height: 500, crop: "fill", gravity: "face", quality: 100 };
    pub const SOCIAL_CARD: Self = Self { width: 1080, height: 1080, crop: "limit", gravity: "center", quality: 100 };

    /// Path segment such as `c_fill,g_face,w_500,h_500,q_100/`.
    pub fn segment(&self) -> String {
        format!(
            "c_{},g_{},w_{},h_{},q_{}/",
            self.crop, self.gravity, self.width, self.height, self.quality
        )
    }

    /// Insert the transformation right after `/upload/` in `secure_url`.
    pub fn apply(&self, secure_url: &str) -> Result<String, UploadError> {
        let (base, file) = secure_url
            .split_once("/upload/")
            .ok_or_else(|| UploadError::MalformedResponse(format!("no /upload/ in {secure_url}")))?;
        Ok(format!("{base}/upload/{}{file}", self.segment()))
    }
}

/// Provider-neutral async trait for image uploads.
#[async_trait::async_trait]
pub trait ImageHost: Send + Sync {
    /// Upload `image` and return its public URL with `transform` applied.
    async fn upload(&self, image: EncodedImage, transform: &UploadTransform) -> Result<String, UploadError>;
}

pub struct CloudinaryHost {
    client: reqwest::Client,
    config: Option<CloudinaryConfig>,
    timeout: Duration,
    api_base: String,
}

impl CloudinaryHost {
    pub fn new(config: Option<CloudinaryConfig>, timeout: Duration) -> Self {
        Self::with_api_base(config, timeout, CLOUDINARY_API_BASE)
    }

    pub fn with_api_base(config: Option<CloudinaryConfig>, timeout: Duration, api_base: impl Into<String>) -> Self {
        Self { client: reqwest::Client::new(), config, timeout, api_base: api_base.into() }
    }

    fn endpoint(&self, config: &CloudinaryConfig) -> String {
        format!("{}/v1_1/{}/image/upload", self.api_base, config.cloud_name)
    }
}

fn extension(mime: &str) -> &'static str {
    match mime {
        "image/png" => "png",
        "image/jpeg" => "jpg",
        "image/gif" => "gif",
        "image/webp" => "webp",
        "image/svg+xml" => "svg",
        _ => "bin",
    }
}

/// Pull the provider's error message out of a failed upload response.
fn rejection_message(body: &serde_json::Value) -> String {
    body.pointer("/error/message")
        .or_else(|| body.get("message"))
        .and_then(serde_json::Value::as_str)
        .unwrap_or("upload failed")
        .to_owned()
}

#[async_trait::async_trait]
impl ImageHost for CloudinaryHost {
    async fn upload(&self, image: EncodedImage, transform: &UploadTransform) -> Result<String, UploadError> {
        let config = self.config.as_ref().ok_or(UploadError::MissingCredentials)?;

        let file = Part::bytes(image.bytes)
            .file_name(format!("card.{}", extension(image.mime)))
            .mime_str(image.mime)?;
        let form = Form::new()
            .part("file", file)
            .text("upload_preset", config.upload_preset.clone());

        let request = async {
            let response = self.client.post(self.endpoint(config)).multipart(form).send().await?;
            let status = response.status();
            let body: serde_json::Value = response.json().await?;
            Ok::<_, reqwest::Error>((status, body))
        };
        let (status, body) = tokio::time::timeout(self.timeout, request)
            .await
            .map_err(|_| UploadError::Timeout(self.timeout))??;

        if !status.is_success() {
            return Err(UploadError::Rejected { status: status.as_u16(), message: rejection_message(&body) });
        }

        let secure_url = body
            .get("secure_url")
            .and_then(serde_json::Value::as_str)
            .ok_or_else(|| UploadError::MalformedResponse("missing secure_url".to_owned()))?;

        let url = transform.apply(secure_url)?;
        tracing::info!(%url, "image uploaded");
        Ok(url)
    }
}

#[cfg(test)]
#[path = "upload_test.rs"]
mod tests;
