use crate::error::HttpAppError;
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use khmedia_core::{AppError, MediaCategory, MediaKind};
use khmedia_services::MediaFilter;
use serde::Deserialize;
use std::str::FromStr;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct ListMediaQuery {
    pub kind: Option<String>,
    pub parent_id: Option<Uuid>,
    pub featured: Option<bool>,
    /// `all` or empty means no filter.
    pub category: Option<String>,
    pub limit: Option<usize>,
}

/// One record with the URL it displays.
#[tracing::instrument(skip(state))]
pub async fn get_media(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    let media = state.media.get(id).await?;
    Ok(Json(media))
}

/// Public listing in display order. Inactive records are never listed.
#[tracing::instrument(skip(state))]
pub async fn list_media(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListMediaQuery>,
) -> Result<impl IntoResponse, HttpAppError> {
    let kind = query
        .kind
        .as_deref()
        .filter(|k| !k.trim().is_empty())
        .map(MediaKind::from_str)
        .transpose()
        .map_err(|e| AppError::InvalidInput(e.to_string()))?;

    let category = query
        .category
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty() && !c.eq_ignore_ascii_case("all"))
        .map(MediaCategory::from_str)
        .transpose()
        .map_err(|e| AppError::InvalidInput(e.to_string()))?;

    let filter = MediaFilter {
        kind,
        parent_id: query.parent_id,
        active: Some(true),
        featured: query.featured,
        category,
    };
    let items = state.media.list(&filter, query.limit).await;
    Ok(Json(items))
}
