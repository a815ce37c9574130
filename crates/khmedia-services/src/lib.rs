//! khmedia Services Layer
//!
//! Business services on top of storage and processing: resolving which image
//! an owner displays, storing uploads, cleaning up assets on delete, and the
//! in-memory record repository. Also re-exports the storage and processing
//! types the API needs so it depends on a single facade.

pub mod cleanup;
pub mod media;
pub mod repository;
pub mod resolution;
#[cfg(any(test, feature = "test-utils"))]
pub mod testing;
pub mod upload;

pub use cleanup::{CleanupReport, MediaCleanup};
pub use khmedia_processing::{ImageOptimizer, MediaValidator, OptimizedImage};
pub use khmedia_storage::{
    create_local_storage, create_remote_store, LocalStorage, RemoteStore, StorageError,
    StorageResult,
};
pub use media::{DeleteOutcome, MediaService, NewMedia, ResolvedMedia, SaveOutcome};
pub use repository::{MediaFilter, MediaRepository};
pub use resolution::StorageResolver;
pub use upload::{MediaUploadService, UploadOutcome, UploadedFile};
