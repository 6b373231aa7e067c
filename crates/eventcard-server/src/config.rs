//! Server configuration parsed from environment variables.

use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_UPLOAD_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_PHOTO_FETCH_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_EMAIL_FROM: &str = "Blkat Events <events@blkat.io>";
pub const DEFAULT_PUBLIC_EVENT_URL: &str = "https://blkat.io";
pub const CLOUDINARY_DELIVERY_BASE: &str = "https://res.cloudinary.com";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid {var}: {value:?}")]
    Invalid { var: &'static str, value: String },
}

/// Unsigned upload credentials for the image host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub upload_preset: String,
}

impl CloudinaryConfig {
    /// Where this cloud serves uploaded images from.
    pub fn delivery_base(&self) -> String {
        format!("{CLOUDINARY_DELIVERY_BASE}/{}/", self.cloud_name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
    /// Directory of `.ttf`/`.otf` files used for measuring and rasterizing.
    pub font_dir: Option<PathBuf>,
    /// Background image of template cards.
    pub template_path: Option<PathBuf>,
    /// `None` when either credential is missing; uploads then fail at call time.
    pub cloudinary: Option<CloudinaryConfig>,
    pub upload_timeout: Duration,
    pub photo_fetch_timeout: Duration,
    /// `None` disables confirmation emails.
    pub resend_api_key: Option<String>,
    pub email_from: String,
    /// Site origin that event page paths are appended to in emails.
    pub public_event_url: String,
}

impl ServerConfig {
    /// Build typed server config from environment variables.
    ///
    /// Optional:
    /// - `PORT`: default 3000
    /// - `FONT_DIR`, `CARD_TEMPLATE_PATH`
    /// - `CLOUDINARY_CLOUD_NAME` + `CLOUDINARY_UPLOAD_PRESET`
    /// - `UPLOAD_TIMEOUT_SECS`: default 30
    /// - `PHOTO_FETCH_TIMEOUT_SECS`: default 10
    /// - `RESEND_API_KEY`, `EMAIL_FROM`
    /// - `PUBLIC_EVENT_URL`: default `https://blkat.io`
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build config from an arbitrary variable lookup. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| lookup(name).map(|v| v.trim().to_owned()).filter(|v| !v.is_empty());

        let port = parse_or("PORT", var("PORT"), DEFAULT_PORT)?;
        let upload_timeout = parse_or("UPLOAD_TIMEOUT_SECS", var("UPLOAD_TIMEOUT_SECS"), DEFAULT_UPLOAD_TIMEOUT_SECS)?;
        let photo_fetch_timeout = parse_or(
            "PHOTO_FETCH_TIMEOUT_SECS",
            var("PHOTO_FETCH_TIMEOUT_SECS"),
            DEFAULT_PHOTO_FETCH_TIMEOUT_SECS,
        )?;

        let cloudinary = match (var("CLOUDINARY_CLOUD_NAME"), var("CLOUDINARY_UPLOAD_PRESET")) {
            (Some(cloud_name), Some(upload_preset)) => Some(CloudinaryConfig { cloud_name, upload_preset }),
            _ => None,
        };

        Ok(Self {
            port,
            font_dir: var("FONT_DIR").map(PathBuf::from),
            template_path: var("CARD_TEMPLATE_PATH").map(PathBuf::from),
            cloudinary,
            upload_timeout: Duration::from_secs(upload_timeout),
            photo_fetch_timeout: Duration::from_secs(photo_fetch_timeout),
            resend_api_key: var("RESEND_API_KEY"),
            email_from: var("EMAIL_FROM").unwrap_or_else(|| DEFAULT_EMAIL_FROM.to_owned()),
            public_event_url: var("PUBLIC_EVENT_URL")
                .map(|url| url.trim_end_matches('/').to_owned())
                .unwrap_or_else(|| DEFAULT_PUBLIC_EVENT_URL.to_owned()),
        })
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            font_dir: None,
            template_path: None,
            cloudinary: None,
            upload_timeout: Duration::from_secs(DEFAULT_UPLOAD_TIMEOUT_SECS),
            photo_fetch_timeout: Duration::from_secs(DEFAULT_PHOTO_FETCH_TIMEOUT_SECS),
            resend_api_key: None,
            email_from: DEFAULT_EMAIL_FROM.to_owned(),
            public_event_url: DEFAULT_PUBLIC_EVENT_URL.to_owned(),
        }
    }
}

fn parse_or<T: std::str::FromStr>(var: &'static str, value: Option<String>, default: T) -> Result<T, ConfigError> {
    match value {
        None => Ok(default),
        Some(value) => value.parse().map_err(|_| ConfigError::Invalid { var, value }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
