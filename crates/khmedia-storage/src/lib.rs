//! khmedia Storage Library
//!
//! Two places an image can live: a directory on the local disk (the media root)
//! and a bucket-based remote object store reached over its REST API.
//!
//! # Object path format
//!
//! Uploaded files are renamed to `{slug}-{8 hex chars}{.ext}` and stored as
//! `{folder}/{filename}` (or just `{filename}` without a folder). The remote
//! store exposes them at `{base}/storage/v1/object/public/{bucket}/{path}`.
//!
//! Paths must not contain `..` or a leading `/`. Name generation is centralized
//! in the `keys` module so both stores stay consistent.

pub mod factory;
pub mod keys;
pub mod local;
pub mod remote;
pub mod traits;

// Re-export commonly used types
pub use factory::{create_local_storage, create_remote_store};
pub use keys::{extract_object_location, generate_unique_filename, object_path};
pub use local::LocalStorage;
pub use remote::SupabaseStorage;
pub use traits::{RemoteStore, StorageError, StorageResult};
