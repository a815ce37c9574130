use crate::error::HttpAppError;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct DeleteMediaResponse {
    pub removed: Vec<Uuid>,
    pub local_deleted: usize,
    pub remote_deleted: usize,
}

/// Delete a record (children first for collections) and its stored images.
#[tracing::instrument(skip(state))]
pub async fn delete_media(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    let outcome = state.media.delete(id).await?;

    Ok(Json(DeleteMediaResponse {
        local_deleted: outcome.cleanup.iter().filter(|r| r.local_deleted).count(),
        remote_deleted: outcome.cleanup.iter().filter(|r| r.remote_deleted).count(),
        removed: outcome.removed,
    }))
}
