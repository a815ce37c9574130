use crate::error::HttpAppError;
use crate::state::AppState;
use crate::utils::upload::extract_media_form;
use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use khmedia_core::AppError;
use khmedia_services::{NewMedia, ResolvedMedia, SaveOutcome};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct MediaSaveResponse {
    pub media: ResolvedMedia,
    /// Non-blocking storage problem to show the admin.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

async fn save_response(
    state: &AppState,
    outcome: SaveOutcome,
) -> Result<MediaSaveResponse, HttpAppError> {
    let media = state.media.get(outcome.record.id).await?;
    Ok(MediaSaveResponse {
        media,
        warning: outcome.warning,
    })
}

/// Create a media record from a multipart form.
#[tracing::instrument(skip(state, multipart))]
pub async fn create_media(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<impl IntoResponse, HttpAppError> {
    let start = Instant::now();
    let form = extract_media_form(multipart).await?;

    let input = NewMedia {
        kind: form.kind()?,
        parent_id: form.parent_id()?,
        title: form.title(),
        caption: form.caption(),
        order: form.order()?,
        active: form.flag("active", true)?,
        featured: form.flag("featured", false)?,
        category: form.category()?,
        date: form.date()?,
    };

    let outcome = state.media.create(input, form.file).await?;
    tracing::info!(
        media_id = %outcome.record.id,
        warning = outcome.warning.is_some(),
        duration_ms = start.elapsed().as_secs_f64() * 1000.0,
        "Media created via admin API"
    );

    let body = save_response(&state, outcome).await?;
    Ok((StatusCode::CREATED, Json(body)))
}

/// Replace the image of an existing record.
#[tracing::instrument(skip(state, multipart))]
pub async fn replace_media_image(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<impl IntoResponse, HttpAppError> {
    let start = Instant::now();
    let form = extract_media_form(multipart).await?;
    let file = form
        .file
        .ok_or_else(|| AppError::InvalidInput("No file provided".to_string()))?;

    let outcome = state.media.replace_image(id, file).await?;
    tracing::info!(
        media_id = %id,
        warning = outcome.warning.is_some(),
        duration_ms = start.elapsed().as_secs_f64() * 1000.0,
        "Media image replaced via admin API"
    );

    let body = save_response(&state, outcome).await?;
    Ok(Json(body))
}
