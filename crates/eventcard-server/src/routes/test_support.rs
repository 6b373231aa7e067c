//! Fakes and helpers shared by handler tests.

use std::sync::{Arc, Mutex};

use axum::response::Response;

use crate::cards::tests::{FakeHost, service};
use crate::email::{EmailError, Mailer, OutgoingEmail};
use crate::state::AppState;
use crate::store::MemoryStore;

/// Mailer fake that records sent emails, or fails every send.
#[derive(Default)]
pub(crate) struct FakeMailer {
    pub fail: bool,
    pub sent: Mutex<Vec<OutgoingEmail>>,
}

impl FakeMailer {
    pub fn failing() -> Self {
        Self { fail: true, ..Self::default() }
    }
}

#[async_trait::async_trait]
impl Mailer for FakeMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), EmailError> {
        if self.fail {
            return Err(EmailError::Delivery("smtp down".into()));
        }
        self.sent.lock().unwrap().push(email.clone());
        Ok(())
    }
}

pub(crate) struct TestApp {
    pub state: AppState,
    pub store: Arc<MemoryStore>,
    pub mailer: Arc<FakeMailer>,
    pub host: Arc<FakeHost>,
}

pub(crate) fn test_app_with(store: MemoryStore, mailer: FakeMailer, host: FakeHost) -> TestApp {
    let store = Arc::new(store);
    let mailer = Arc::new(mailer);
    let host = Arc::new(host);
    let state = AppState::new(
        store.clone(),
        mailer.clone(),
        Arc::new(service(host.clone())),
        "https://blkat.io",
    );
    TestApp { state, store, mailer, host }
}

pub(crate) fn test_app() -> TestApp {
    test_app_with(MemoryStore::new(), FakeMailer::default(), FakeHost::default())
}

pub(crate) async fn body_bytes(response: Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap().to_vec()
}

pub(crate) async fn body_json(response: Response) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}
