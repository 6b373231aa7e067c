//! Registration records and the store they live in.
//!
//! DESIGN
//! ======
//! The store is a trait so handlers never depend on a concrete backend.
//! `MemoryStore` keeps records in a `RwLock<Vec<_>>` in insertion order;
//! listings sort newest first. Duplicate detection happens inside `insert`
//! under the write lock, so two concurrent submissions for the same
//! (email, event) cannot both succeed.

use eventcard_core::{EventSlug, Role, RoleDetails};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

// =============================================================================
// RECORDS
// =============================================================================

/// A stored registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub id: Uuid,
    /// `None` only for records imported from before events existed.
    #[serde(default)]
    pub event: Option<EventSlug>,
    pub name: String,
    pub email: String,
    pub phone_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
    #[serde(flatten)]
    pub role: RoleDetails,
    pub profile_photo: String,
    pub social_card: String,
    pub email_sent: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Registration {
    pub fn role(&self) -> Role {
        self.role.role()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("already registered for this event")]
    Duplicate,
    #[error("registration not found: {0}")]
    NotFound(Uuid),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

// =============================================================================
// QUERIES
// =============================================================================

/// Listing filter. Every present field must match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrationFilter {
    pub event: Option<EventSlug>,
    pub role: Option<Role>,
    /// Lowercased, trimmed substring matched against name or email.
    pub search: Option<String>,
}

impl RegistrationFilter {
    /// Build a filter from raw query values. Unknown events and roles are ignored.
    pub fn from_params(event: Option<&str>, role: Option<&str>, search: Option<&str>) -> Self {
        Self {
            event: event.and_then(|e| e.parse().ok()),
            role: role.and_then(|r| r.parse().ok()),
            search: search
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_lowercase),
        }
    }

    pub fn matches(&self, record: &Registration) -> bool {
        let event_ok = match self.event {
            None => true,
            // Records without an event predate the second event.
            Some(EventSlug::LEGACY) => record.event.is_none_or(|e| e == EventSlug::LEGACY),
            Some(event) => record.event == Some(event),
        };
        let role_ok = self.role.is_none_or(|role| record.role() == role);
        let search_ok = self.search.as_deref().is_none_or(|needle| {
            record.name.to_lowercase().contains(needle) || record.email.to_lowercase().contains(needle)
        });
        event_ok && role_ok && search_ok
    }
}

/// One-based page request with a clamped page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub number: usize,
    pub limit: usize,
}

impl Page {
    pub const DEFAULT_LIMIT: usize = 20;
    pub const MAX_LIMIT: usize = 100;

    pub fn new(number: Option<i64>, limit: Option<i64>) -> Self {
        let number = number.unwrap_or(1).max(1);
        let limit = limit
            .unwrap_or(Self::DEFAULT_LIMIT as i64)
            .clamp(1, Self::MAX_LIMIT as i64);
        Self { number: number as usize, limit: limit as usize }
    }

    fn offset(self) -> usize {
        (self.number - 1).saturating_mul(self.limit)
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(None, None)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationStats {
    pub total: usize,
    pub speakers: usize,
    pub attendees: usize,
    pub emails_sent: usize,
}

impl RegistrationStats {
    pub fn tally<'a>(records: impl IntoIterator<Item = &'a Registration>) -> Self {
        records.into_iter().fold(Self::default(), |mut stats, record| {
            stats.total += 1;
            match record.role() {
                Role::Speaker => stats.speakers += 1,
                Role::Attendee => stats.attendees += 1,
            }
            if record.email_sent {
                stats.emails_sent += 1;
            }
            stats
        })
    }
}

/// A page of filtered registrations plus stats over the whole filtered set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationPage {
    pub data: Vec<Registration>,
    pub total: usize,
    pub page: usize,
    pub total_pages: usize,
    pub stats: RegistrationStats,
}

// =============================================================================
// STORE TRAIT
// =============================================================================

#[async_trait::async_trait]
pub trait RegistrationStore: Send + Sync {
    /// Find the registration of `email` for `event`.
    async fn find(&self, email: &str, event: EventSlug) -> Result<Option<Registration>, StoreError>;

    /// Insert a new registration.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Duplicate`] if the (email, event) pair is taken.
    async fn insert(&self, registration: Registration) -> Result<(), StoreError>;

    async fn mark_email_sent(&self, id: Uuid) -> Result<(), StoreError>;

    /// Newest-first page of matching registrations.
    async fn list(&self, filter: &RegistrationFilter, page: Page) -> Result<RegistrationPage, StoreError>;

    /// Every matching registration, newest first.
    async fn export(&self, filter: &RegistrationFilter) -> Result<Vec<Registration>, StoreError>;
}

// =============================================================================
// MEMORY STORE
// =============================================================================

#[derive(Default)]
pub struct MemoryStore {
    records: RwLock<Vec<Registration>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store, e.g. with imported records.
    #[must_use]
    pub fn with_records(records: Vec<Registration>) -> Self {
        Self { records: RwLock::new(records) }
    }
}

fn same_registrant(record: &Registration, email: &str, event: EventSlug) -> bool {
    record.event == Some(event) && record.email.eq_ignore_ascii_case(email.trim())
}

fn newest_first<'a>(records: &'a [Registration], filter: &RegistrationFilter) -> Vec<&'a Registration> {
    // Reverse first so the stable sort keeps later inserts ahead on equal timestamps.
    let mut matching: Vec<_> = records.iter().rev().filter(|r| filter.matches(r)).collect();
    matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    matching
}

#[async_trait::async_trait]
impl RegistrationStore for MemoryStore {
    async fn find(&self, email: &str, event: EventSlug) -> Result<Option<Registration>, StoreError> {
        let records = self.records.read().await;
        Ok(records.iter().find(|r| same_registrant(r, email, event)).cloned())
    }

    async fn insert(&self, registration: Registration) -> Result<(), StoreError> {
        let mut records = self.records.write().await;
        if let Some(event) = registration.event {
            if records.iter().any(|r| same_registrant(r, &registration.email, event)) {
                return Err(StoreError::Duplicate);
            }
        }
        records.push(registration);
        Ok(())
    }

    async fn mark_email_sent(&self, id: Uuid) -> Result<(), StoreError> {
        let mut records = self.records.write().await;
        let record = records.iter_mut().find(|r| r.id == id).ok_or(StoreError::NotFound(id))?;
        record.email_sent = true;
        Ok(())
    }

    async fn list(&self, filter: &RegistrationFilter, page: Page) -> Result<RegistrationPage, StoreError> {
        let records = self.records.read().await;
        let matching = newest_first(&records, filter);
        let total = matching.len();
        Ok(RegistrationPage {
            stats: RegistrationStats::tally(matching.iter().copied()),
            data: matching
                .into_iter()
                .skip(page.offset())
                .take(page.limit)
                .cloned()
                .collect(),
            total,
            page: page.number,
            total_pages: total.div_ceil(page.limit),
        })
    }

    async fn export(&self, filter: &RegistrationFilter) -> Result<Vec<Registration>, StoreError> {
        let records = self.records.read().await;
        Ok(newest_first(&records, filter).into_iter().cloned().collect())
    }
}

#[cfg(test)]
#[path = "store_test.rs"]
pub(crate) mod tests;
