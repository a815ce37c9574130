//! In-memory record repository.

use khmedia_core::models::display_order;
use khmedia_core::{AppError, MediaCategory, MediaKind, MediaOwner};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Listing filter. Unset fields match everything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MediaFilter {
    pub kind: Option<MediaKind>,
    pub parent_id: Option<Uuid>,
    pub active: Option<bool>,
    pub featured: Option<bool>,
    pub category: Option<MediaCategory>,
}

impl MediaFilter {
    pub fn kind(kind: MediaKind) -> Self {
        Self {
            kind: Some(kind),
            ..Self::default()
        }
    }

    pub fn children_of(parent_id: Uuid) -> Self {
        Self {
            parent_id: Some(parent_id),
            ..Self::default()
        }
    }

    pub fn matches(&self, owner: &MediaOwner) -> bool {
        self.kind.map_or(true, |k| owner.kind == k)
            && self.parent_id.map_or(true, |p| owner.parent_id == Some(p))
            && self.active.map_or(true, |a| owner.active == a)
            && self.featured.map_or(true, |f| owner.featured == f)
            && self.category.map_or(true, |c| owner.category == Some(c))
    }
}

/// Media owners keyed by id, with the parent/child rules of collections
/// enforced on insert.
#[derive(Debug, Default)]
pub struct MediaRepository {
    records: RwLock<HashMap<Uuid, MediaOwner>>,
}

impl MediaRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check that `owner` has a parent exactly when its kind requires one,
    /// and that the parent has the matching collection kind.
    fn check_parent(
        records: &HashMap<Uuid, MediaOwner>,
        owner: &MediaOwner,
    ) -> Result<(), AppError> {
        match (owner.kind.parent_kind(), owner.parent_id) {
            (None, None) => Ok(()),
            (None, Some(_)) => Err(AppError::InvalidInput(format!(
                "{} records cannot have a parent",
                owner.kind
            ))),
            (Some(expected), None) => Err(AppError::InvalidInput(format!(
                "{} records require a parent {}",
                owner.kind, expected
            ))),
            (Some(expected), Some(parent_id)) => match records.get(&parent_id) {
                Some(parent) if parent.kind == expected => Ok(()),
                Some(parent) => Err(AppError::InvalidInput(format!(
                    "Parent {} is a {}, expected {}",
                    parent_id, parent.kind, expected
                ))),
                None => Err(AppError::NotFound(format!("Parent {} not found", parent_id))),
            },
        }
    }

    pub async fn validate(&self, owner: &MediaOwner) -> Result<(), AppError> {
        let records = self.records.read().await;
        Self::check_parent(&records, owner)
    }

    pub async fn insert(&self, owner: MediaOwner) -> Result<MediaOwner, AppError> {
        let mut records = self.records.write().await;
        Self::check_parent(&records, &owner)?;
        records.insert(owner.id, owner.clone());
        Ok(owner)
    }

    /// Replace an existing record.
    pub async fn update(&self, owner: MediaOwner) -> Result<MediaOwner, AppError> {
        let mut records = self.records.write().await;
        if !records.contains_key(&owner.id) {
            return Err(AppError::NotFound(format!("Media {} not found", owner.id)));
        }
        Self::check_parent(&records, &owner)?;
        records.insert(owner.id, owner.clone());
        Ok(owner)
    }

    pub async fn get(&self, id: Uuid) -> Option<MediaOwner> {
        self.records.read().await.get(&id).cloned()
    }

    /// Children of a collection in display order.
    pub async fn children(&self, parent_id: Uuid) -> Vec<MediaOwner> {
        self.list(&MediaFilter::children_of(parent_id)).await
    }

    /// Records matching `filter`, in display order.
    pub async fn list(&self, filter: &MediaFilter) -> Vec<MediaOwner> {
        let records = self.records.read().await;
        let mut items: Vec<MediaOwner> = records
            .values()
            .filter(|o| filter.matches(o))
            .cloned()
            .collect();
        items.sort_by(display_order);
        items
    }

    pub async fn remove(&self, id: Uuid) -> Option<MediaOwner> {
        self.records.write().await.remove(&id)
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}
