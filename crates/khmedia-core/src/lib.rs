//! khmedia Core Library
//!
//! This crate provides the domain models, error types and configuration shared by
//! every khmedia component: media owners and their buckets, the storage priority
//! used when resolving images, and the admin guard settings.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod storage_types;

// Re-export commonly used types
pub use config::{AdminGuardConfig, BaseConfig, Config, MediaStorageConfig, RemoteStorageConfig};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{Bucket, ImageDimensions, MediaCategory, MediaKind, MediaOwner, MediaReference};
pub use storage_types::{StoragePriority, StorageSource};
