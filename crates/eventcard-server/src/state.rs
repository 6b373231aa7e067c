//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor.
//! Every backend sits behind a trait object so tests can swap in fakes.

use std::sync::Arc;

use crate::cards::{CardService, CardSettings, MAX_PHOTO_BYTES};
use crate::config::ServerConfig;
use crate::email::{DisabledMailer, Mailer, ResendMailer};
use crate::store::{MemoryStore, RegistrationStore};
use crate::upload::CloudinaryHost;

/// Clone is required by Axum; all fields are Arc-wrapped.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RegistrationStore>,
    pub mailer: Arc<dyn Mailer>,
    pub cards: Arc<CardService>,
    /// Site origin used for links in emails.
    pub public_event_url: Arc<str>,
}

impl AppState {
    #[must_use]
    pub fn new(
        store: Arc<dyn RegistrationStore>,
        mailer: Arc<dyn Mailer>,
        cards: Arc<CardService>,
        public_event_url: &str,
    ) -> Self {
        Self { store, mailer, cards, public_event_url: public_event_url.into() }
    }

    /// Production wiring: memory store, Cloudinary uploads, Resend emails when configured.
    #[must_use]
    pub fn from_config(config: &ServerConfig) -> Self {
        let mailer: Arc<dyn Mailer> = match &config.resend_api_key {
            Some(key) => Arc::new(ResendMailer::new(key, config.email_from.clone())),
            None => Arc::new(DisabledMailer),
        };
        let host = Arc::new(CloudinaryHost::new(config.cloudinary.clone(), config.upload_timeout));
        let cards = CardService::new(
            host,
            CardSettings {
                font_dir: config.font_dir.clone(),
                template_path: config.template_path.clone(),
                photo_fetch_timeout: config.photo_fetch_timeout,
                photo_base: config
                    .cloudinary
                    .as_ref()
                    .and_then(|cloudinary| reqwest::Url::parse(&cloudinary.delivery_base()).ok()),
                max_photo_bytes: MAX_PHOTO_BYTES,
            },
        );
        Self::new(Arc::new(MemoryStore::new()), mailer, Arc::new(cards), &config.public_event_url)
    }
}
