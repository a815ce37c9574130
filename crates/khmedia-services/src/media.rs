//! Media record lifecycle: create, replace image, delete, and resolved reads.
//!
//! Keeps handler logic thin and allows unit testing without HTTP. Mutations
//! run one at a time so every stored asset is cleaned up exactly once.

use crate::cleanup::{CleanupReport, MediaCleanup};
use crate::repository::{MediaFilter, MediaRepository};
use crate::resolution::StorageResolver;
use crate::upload::{MediaUploadService, UploadedFile};
use chrono::{DateTime, Utc};
use khmedia_core::{AppError, MediaCategory, MediaKind, MediaOwner};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Fields of a record being created.
#[derive(Debug, Clone)]
pub struct NewMedia {
    pub kind: MediaKind,
    pub parent_id: Option<Uuid>,
    pub title: String,
    pub caption: Option<String>,
    pub order: i32,
    pub active: bool,
    pub featured: bool,
    /// Collections only; defaults per kind when unset.
    pub category: Option<MediaCategory>,
    /// Collections only; defaults to now.
    pub date: Option<DateTime<Utc>>,
}

impl NewMedia {
    pub fn new(kind: MediaKind, title: impl Into<String>) -> Self {
        Self {
            kind,
            parent_id: None,
            title: title.into(),
            caption: None,
            order: 0,
            active: true,
            featured: false,
            category: None,
            date: None,
        }
    }
}

/// A record together with the URL it currently displays.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ResolvedMedia {
    pub id: Uuid,
    pub kind: MediaKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<Uuid>,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    pub order: i32,
    pub uploaded_at: DateTime<Utc>,
    pub active: bool,
    pub featured: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<MediaCategory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<DateTime<Utc>>,
    /// Photos in a celebration or images in a gallery.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_count: Option<usize>,
    pub url: Option<String>,
}

impl ResolvedMedia {
    fn new(owner: &MediaOwner, url: Option<String>, item_count: Option<usize>) -> Self {
        Self {
            id: owner.id,
            kind: owner.kind,
            parent_id: owner.parent_id,
            title: owner.title.clone(),
            caption: owner.caption.clone(),
            order: owner.order,
            uploaded_at: owner.uploaded_at,
            active: owner.active,
            featured: owner.featured,
            category: owner.category,
            date: owner.date,
            item_count,
            url,
        }
    }
}

/// Result of a create or image replacement.
#[derive(Debug, Clone)]
pub struct SaveOutcome {
    pub record: MediaOwner,
    pub warning: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct DeleteOutcome {
    /// Ids removed, children before their parent.
    pub removed: Vec<Uuid>,
    pub cleanup: Vec<CleanupReport>,
}

#[derive(Clone)]
pub struct MediaService {
    repository: Arc<MediaRepository>,
    uploader: MediaUploadService,
    cleanup: MediaCleanup,
    resolver: StorageResolver,
    mutations: Arc<Mutex<()>>,
}

impl MediaService {
    pub fn new(
        repository: Arc<MediaRepository>,
        uploader: MediaUploadService,
        cleanup: MediaCleanup,
        resolver: StorageResolver,
    ) -> Self {
        Self {
            repository,
            uploader,
            cleanup,
            resolver,
            mutations: Arc::new(Mutex::new(())),
        }
    }

    pub fn repository(&self) -> &Arc<MediaRepository> {
        &self.repository
    }

    /// Create a record, storing its image first when one is given.
    pub async fn create(
        &self,
        input: NewMedia,
        file: Option<UploadedFile>,
    ) -> Result<SaveOutcome, AppError> {
        if input.title.trim().is_empty() {
            return Err(AppError::InvalidInput("Title is required".to_string()));
        }
        if !input.kind.is_collection()
            && (input.featured || input.category.is_some() || input.date.is_some())
        {
            return Err(AppError::InvalidInput(format!(
                "featured, category and date only apply to celebrations and galleries, not {}",
                input.kind
            )));
        }

        let mut owner = MediaOwner::new(input.kind, input.title.trim())
            .with_order(input.order)
            .with_active(input.active)
            .with_featured(input.featured);
        owner.parent_id = input.parent_id;
        owner.caption = input.caption.filter(|c| !c.trim().is_empty());
        if let Some(category) = input.category {
            owner.category = Some(category);
        }
        if let Some(date) = input.date {
            owner.date = Some(date);
        }

        let _mutation = self.mutations.lock().await;

        // Reject bad parents before anything is written to storage
        self.repository.validate(&owner).await?;

        let mut warning = None;
        if let Some(file) = file {
            let outcome = self.uploader.store(owner.kind, file).await?;
            owner.set_reference(outcome.reference);
            warning = outcome.warning;
        }

        let record = match self.repository.insert(owner.clone()).await {
            Ok(record) => record,
            Err(e) => {
                self.discard_new_asset(&owner).await;
                return Err(e);
            }
        };
        tracing::info!(
            media_id = %record.id,
            kind = %record.kind,
            has_image = record.has_image(),
            "Media record created"
        );

        Ok(SaveOutcome { record, warning })
    }

    /// Store a new image for an existing record, then clean up the previous one.
    ///
    /// When the new image cannot be stored the record keeps its old image.
    pub async fn replace_image(&self, id: Uuid, file: UploadedFile) -> Result<SaveOutcome, AppError> {
        let _mutation = self.mutations.lock().await;

        let existing = self
            .repository
            .get(id)
            .await
            .ok_or_else(|| AppError::NotFound(format!("Media {} not found", id)))?;

        let outcome = self.uploader.store(existing.kind, file).await?;
        if !outcome.reference.is_set() {
            return Ok(SaveOutcome {
                record: existing,
                warning: outcome.warning,
            });
        }

        let bucket = existing.bucket();
        let previous = existing.populated_references();
        let mut updated = existing;
        updated.set_reference(outcome.reference.clone());
        updated.uploaded_at = Utc::now();
        let record = match self.repository.update(updated).await {
            Ok(record) => record,
            Err(e) => {
                self.cleanup
                    .cleanup_reference(bucket, &outcome.reference)
                    .await;
                return Err(e);
            }
        };

        let current = record.populated_references();
        for old in previous.iter().filter(|r| !current.contains(r)) {
            self.cleanup.cleanup_reference(bucket, old).await;
        }

        tracing::info!(media_id = %record.id, kind = %record.kind, "Media image replaced");
        Ok(SaveOutcome {
            record,
            warning: outcome.warning,
        })
    }

    /// Delete a record and its stored assets. Collections remove their
    /// children first.
    pub async fn delete(&self, id: Uuid) -> Result<DeleteOutcome, AppError> {
        let _mutation = self.mutations.lock().await;

        let owner = self
            .repository
            .get(id)
            .await
            .ok_or_else(|| AppError::NotFound(format!("Media {} not found", id)))?;

        let mut outcome = DeleteOutcome::default();

        if owner.kind.is_collection() {
            for child in self.repository.children(owner.id).await {
                outcome.cleanup.push(self.cleanup.cleanup(&child).await);
                if self.repository.remove(child.id).await.is_some() {
                    outcome.removed.push(child.id);
                }
            }
        }

        outcome.cleanup.push(self.cleanup.cleanup(&owner).await);
        if self.repository.remove(owner.id).await.is_some() {
            outcome.removed.push(owner.id);
        }

        tracing::info!(
            media_id = %owner.id,
            kind = %owner.kind,
            removed = outcome.removed.len(),
            "Media record deleted"
        );
        Ok(outcome)
    }

    /// One record with its displayed URL.
    pub async fn get(&self, id: Uuid) -> Result<ResolvedMedia, AppError> {
        let owner = self
            .repository
            .get(id)
            .await
            .ok_or_else(|| AppError::NotFound(format!("Media {} not found", id)))?;
        Ok(self.resolve(&owner).await)
    }

    /// Records matching `filter` in display order, each with its URL.
    /// `limit` caps the result after ordering.
    pub async fn list(&self, filter: &MediaFilter, limit: Option<usize>) -> Vec<ResolvedMedia> {
        let mut owners = self.repository.list(filter).await;
        if let Some(limit) = limit {
            owners.truncate(limit);
        }
        let mut resolved = Vec::with_capacity(owners.len());
        for owner in &owners {
            resolved.push(self.resolve(owner).await);
        }
        resolved
    }

    async fn resolve(&self, owner: &MediaOwner) -> ResolvedMedia {
        if owner.kind.is_collection() {
            let children = self.repository.children(owner.id).await;
            let url = self.resolver.resolve_with_children(owner, &children).await;
            ResolvedMedia::new(owner, url, Some(children.len()))
        } else {
            let url = self.resolver.resolve(owner).await;
            ResolvedMedia::new(owner, url, None)
        }
    }

    /// Remove an asset stored for a record that never made it into the
    /// repository.
    async fn discard_new_asset(&self, owner: &MediaOwner) {
        for reference in owner.populated_references() {
            tracing::warn!(kind = %owner.kind, "Discarding asset of unsaved record");
            self.cleanup.cleanup_reference(owner.bucket(), &reference).await;
        }
    }
}
