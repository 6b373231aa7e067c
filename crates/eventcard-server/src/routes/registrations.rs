//! Admin listing and CSV export.

use axum::Json;
use axum::extract::{Query, State};
use axum::http::header;
use axum::response::IntoResponse;
use serde::Deserialize;
use time::OffsetDateTime;

use crate::csv;
use crate::error::ApiError;
use crate::state::AppState;
use crate::store::{Page, RegistrationFilter, RegistrationPage, RegistrationStore};

pub const LIST_FAILED: &str = "Failed to fetch registrations";
pub const EXPORT_FAILED: &str = "Failed to export registrations";

/// Query parameters shared by listing and export. Numbers stay strings so a
/// malformed value falls back to its default instead of rejecting the request.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub event: Option<String>,
    pub role: Option<String>,
    pub search: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

impl ListParams {
    fn filter(&self) -> RegistrationFilter {
        RegistrationFilter::from_params(self.event.as_deref(), self.role.as_deref(), self.search.as_deref())
    }

    fn page(&self) -> Page {
        let number = |value: &Option<String>| value.as_deref().and_then(|v| v.trim().parse::<i64>().ok());
        Page::new(number(&self.page), number(&self.limit))
    }
}

/// `GET /api/registrations`: filtered, paginated, newest first, with stats.
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<RegistrationPage>, ApiError> {
    let page = state
        .store
        .list(&params.filter(), params.page())
        .await
        .map_err(ApiError::persistence(LIST_FAILED))?;
    Ok(Json(page))
}

/// `GET /api/registrations/export`: every matching registration as a CSV attachment.
pub async fn export(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, ApiError> {
    let filter = params.filter();
    let records = state.store.export(&filter).await.map_err(ApiError::persistence(EXPORT_FAILED))?;
    let filename = csv::filename(filter.event, OffsetDateTime::now_utc());
    tracing::info!(rows = records.len(), %filename, "registrations exported");

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv".to_owned()),
            (header::CONTENT_DISPOSITION, format!("attachment; filename={filename}")),
        ],
        csv::export(&records),
    ))
}

#[cfg(test)]
#[path = "registrations_test.rs"]
mod tests;
