//! Server-side card generation.
//!
//! DESIGN
//! ======
//! Rendering itself is synchronous; the async boundaries are font loading,
//! photo fetching, rasterization (on the blocking pool) and the upload.
//! Fonts load once behind a `OnceCell`, and the Parley measurer built over
//! them is shared by every render, so measuring and rasterizing always see
//! the same faces (the system fonts when no font directory is configured).
//! Each request takes a generation ticket keyed by registrant; if a newer
//! request for the same registrant arrives while the photo is still being
//! fetched, the older render is discarded as superseded.
//!
//! Photos are only fetched from the image host's delivery origin, and never
//! buffered past `max_photo_bytes`.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use eventcard_core::{
    CanvasGeometry, DecodedPhoto, EncodedImage, EventSlug, ExportFormat, FontBook, FontsReady, ParleyMeasure,
    RasterOptions, RegistrantInput, RenderError, RenderedCard, Theme, render_event_card,
};
use reqwest::Url;
use serde::Deserialize;
use tokio::sync::OnceCell;

use crate::upload::{ImageHost, UploadError, UploadTransform};

/// Largest photo body read from the image host.
pub const MAX_PHOTO_BYTES: usize = 10 * 1024 * 1024;

// =============================================================================
// GENERATIONS
// =============================================================================

/// Ticket for one render request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationTicket {
    key: String,
    generation: u64,
}

#[derive(Debug, Default)]
struct Generations {
    /// Shared across keys so a forgotten key never reissues an old number.
    next: u64,
    latest: HashMap<String, u64>,
}

/// Latest generation per registrant key. Keys are forgotten once their
/// latest ticket finishes.
#[derive(Debug, Default)]
pub struct GenerationCounter {
    inner: Mutex<Generations>,
}

impl GenerationCounter {
    pub fn issue(&self, key: &str) -> GenerationTicket {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        inner.next += 1;
        let generation = inner.next;
        inner.latest.insert(key.to_owned(), generation);
        GenerationTicket { key: key.to_owned(), generation }
    }

    /// Whether no newer ticket was issued for the ticket's key.
    pub fn is_current(&self, ticket: &GenerationTicket) -> bool {
        let inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        inner.latest.get(&ticket.key) == Some(&ticket.generation)
    }

    /// Retire a ticket whose work is done. Returns whether it was current.
    pub fn finish(&self, ticket: &GenerationTicket) -> bool {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        if inner.latest.get(&ticket.key) == Some(&ticket.generation) {
            inner.latest.remove(&ticket.key);
            true
        } else {
            false
        }
    }

    /// Keys with a render in flight.
    pub fn pending(&self) -> usize {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner).latest.len()
    }
}

// =============================================================================
// REQUESTS
// =============================================================================

/// A card render request as posted by the registration page.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardRequest {
    pub event: EventSlug,
    /// Defaults to the event's theme.
    #[serde(default)]
    pub theme: Option<Theme>,
    pub registrant: RegistrantInput,
}

impl CardRequest {
    /// Renders for the same registrant and event supersede each other.
    fn generation_key(&self) -> String {
        let who = if self.registrant.email.trim().is_empty() {
            self.registrant.name.trim().to_lowercase()
        } else {
            self.registrant.email.trim().to_lowercase()
        };
        format!("{}:{who}", self.event)
    }
}

#[derive(Debug, thiserror::Error)]
pub(crate) enum PhotoFetchError {
    #[error("photo is not served by the image host")]
    ForeignOrigin,
    #[error("photo is larger than {limit} bytes")]
    TooLarge { limit: usize },
    #[error("photo fetch timed out after {0:?}")]
    Timeout(Duration),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum CardError {
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Upload(#[from] UploadError),
}

// =============================================================================
// SERVICE
// =============================================================================

#[derive(Debug, Clone)]
pub struct CardSettings {
    pub font_dir: Option<PathBuf>,
    pub template_path: Option<PathBuf>,
    pub photo_fetch_timeout: Duration,
    /// Registrant photos must live under this URL. `None` fetches nothing.
    pub photo_base: Option<Url>,
    pub max_photo_bytes: usize,
}

impl CardSettings {
    fn allows_photo(&self, url: &str) -> bool {
        let (Some(base), Ok(url)) = (&self.photo_base, Url::parse(url)) else {
            return false;
        };
        url.scheme() == base.scheme()
            && url.host_str() == base.host_str()
            && url.port_or_known_default() == base.port_or_known_default()
            && url.path().starts_with(base.path())
    }
}

/// What a render needs besides the request itself.
struct RenderInputs<'a> {
    measure: &'a Mutex<ParleyMeasure>,
    photo: Option<DecodedPhoto>,
    template: Option<&'a DecodedPhoto>,
}

pub struct CardService {
    host: Arc<dyn ImageHost>,
    settings: CardSettings,
    http: reqwest::Client,
    fonts: OnceCell<FontsReady>,
    measure: OnceCell<Mutex<ParleyMeasure>>,
    template: OnceCell<Option<DecodedPhoto>>,
    generations: GenerationCounter,
}

impl CardService {
    pub fn new(host: Arc<dyn ImageHost>, settings: CardSettings) -> Self {
        Self {
            host,
            settings,
            http: reqwest::Client::new(),
            fonts: OnceCell::new(),
            measure: OnceCell::new(),
            template: OnceCell::new(),
            generations: GenerationCounter::default(),
        }
    }

    pub fn host(&self) -> &Arc<dyn ImageHost> {
        &self.host
    }

    pub fn generations(&self) -> &GenerationCounter {
        &self.generations
    }

    /// Resolve once the font directory has been loaded.
    ///
    /// Without a font directory the set is empty and both measuring and
    /// rasterizing use the system fonts.
    pub async fn fonts(&self) -> Result<&FontsReady, RenderError> {
        self.fonts
            .get_or_try_init(|| async {
                let Some(dir) = self.settings.font_dir.clone() else {
                    return Ok(FontBook::new().ready());
                };
                let loaded = tokio::task::spawn_blocking(move || {
                    let mut book = FontBook::new();
                    let count = book.load_dir(&dir)?;
                    Ok::<_, eventcard_core::FontError>((count, book.ready()))
                })
                .await;
                match loaded {
                    Ok(Ok((count, fonts))) => {
                        tracing::info!(count, "fonts loaded");
                        Ok(fonts)
                    }
                    Ok(Err(e)) => {
                        tracing::error!(error = %e, "font loading failed");
                        Err(RenderError::FontsNotReady)
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "font loading task failed");
                        Err(RenderError::FontsNotReady)
                    }
                }
            })
            .await
    }

    async fn template(&self) -> Option<&DecodedPhoto> {
        self.template
            .get_or_init(|| async {
                let path = self.settings.template_path.as_ref()?;
                let decoded = tokio::fs::read(path)
                    .await
                    .map_err(|e| e.to_string())
                    .and_then(|bytes| DecodedPhoto::from_bytes(bytes).map_err(|e| e.to_string()));
                match decoded {
                    Ok(template) => Some(template),
                    Err(error) => {
                        tracing::warn!(path = %path.display(), %error, "card template unavailable");
                        None
                    }
                }
            })
            .await
            .as_ref()
    }

    /// The measurer over the loaded fonts, built once and shared by renders.
    pub async fn measurer(&self) -> Result<&Mutex<ParleyMeasure>, RenderError> {
        let fonts = self.fonts().await?;
        Ok(self
            .measure
            .get_or_init(|| async { Mutex::new(ParleyMeasure::new(fonts)) })
            .await)
    }

    /// Download a photo from the image host, capped at `max_photo_bytes`.
    pub(crate) async fn download_photo(&self, url: &str) -> Result<Vec<u8>, PhotoFetchError> {
        if !self.settings.allows_photo(url) {
            return Err(PhotoFetchError::ForeignOrigin);
        }
        let limit = self.settings.max_photo_bytes;
        let fetch = async {
            let mut response = self.http.get(url).send().await?.error_for_status()?;
            if response.content_length().is_some_and(|len| len > limit as u64) {
                return Err(PhotoFetchError::TooLarge { limit });
            }
            let mut body = Vec::new();
            while let Some(chunk) = response.chunk().await? {
                if body.len() + chunk.len() > limit {
                    return Err(PhotoFetchError::TooLarge { limit });
                }
                body.extend_from_slice(&chunk);
            }
            Ok::<_, PhotoFetchError>(body)
        };
        let timeout = self.settings.photo_fetch_timeout;
        tokio::time::timeout(timeout, fetch)
            .await
            .map_err(|_| PhotoFetchError::Timeout(timeout))?
    }

    /// Fetch and decode the registrant's photo. Any failure yields `None` and
    /// the card is drawn without a photo.
    async fn fetch_photo(&self, url: &str) -> Option<DecodedPhoto> {
        let bytes = self
            .download_photo(url)
            .await
            .inspect_err(|error| tracing::warn!(%url, %error, "photo fetch failed"))
            .ok()?;
        DecodedPhoto::from_bytes(bytes)
            .inspect_err(|error| tracing::warn!(%url, %error, "photo could not be decoded"))
            .ok()
    }

    async fn inputs(&self, request: &CardRequest) -> Result<RenderInputs<'_>, RenderError> {
        let measure = self.measurer().await?;
        let photo = match request.registrant.photo.as_deref() {
            Some(url) => self.fetch_photo(url).await,
            None => None,
        };
        let template = self.template().await;
        Ok(RenderInputs { measure, photo, template })
    }

    /// Render the export-size card for `request`.
    pub async fn render(&self, request: &CardRequest) -> Result<RenderedCard, RenderError> {
        request.registrant.validate()?;
        let ticket = self.generations.issue(&request.generation_key());
        let inputs = self.inputs(request).await;
        let current = self.generations.finish(&ticket);
        let inputs = inputs?;

        if !current {
            tracing::debug!(key = %ticket.key, "render superseded");
            return Err(RenderError::Superseded);
        }

        let mut measure = inputs.measure.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(render_now(request, &mut *measure, inputs.photo.as_ref(), inputs.template))
    }

    /// Encode on the blocking pool; rasterization is CPU bound.
    pub async fn encode(&self, card: RenderedCard, format: ExportFormat) -> Result<EncodedImage, RenderError> {
        let options = RasterOptions { fonts: Some(self.fonts().await?.clone()) };
        tokio::task::spawn_blocking(move || eventcard_core::encode(&card, format, &options))
            .await
            .map_err(|e| RenderError::Task(e.to_string()))?
            .map_err(RenderError::from)
    }

    /// Render, encode in the card's preferred format, and upload.
    /// Returns the public URL of the card.
    pub async fn generate(&self, request: &CardRequest) -> Result<String, CardError> {
        let card = self.render(request).await?;
        let format = ExportFormat::preferred(card.kind());
        let image = self.encode(card, format).await?;
        let url = self.host.upload(image, &UploadTransform::SOCIAL_CARD).await?;
        tracing::info!(event = %request.event, %url, "social card generated");
        Ok(url)
    }
}

fn render_now(
    request: &CardRequest,
    measure: &mut ParleyMeasure,
    photo: Option<&DecodedPhoto>,
    template: Option<&DecodedPhoto>,
) -> RenderedCard {
    let config = request.event.config();
    let geometry = CanvasGeometry::export(config.card);
    let theme = request.theme.unwrap_or(config.default_theme);
    render_event_card(request.event, theme, &geometry, &request.registrant, photo, template, measure)
}

#[cfg(test)]
#[path = "cards_test.rs"]
pub(crate) mod tests;
