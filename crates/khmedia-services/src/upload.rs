//! Storing uploaded images.
//!
//! Every upload is optimized for its bucket first. When a remote store is
//! configured the image goes there, otherwise it is written under the local
//! media root. A failed write is not an error: the caller gets an unset
//! reference and a warning to show the admin.

use bytes::Bytes;
use khmedia_core::{AppError, MediaKind, MediaReference};
use khmedia_processing::{ImageOptimizer, MediaValidator, ValidationError};
use khmedia_storage::{LocalStorage, RemoteStore};
use std::sync::Arc;

/// A file received from the admin.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub content_type: Option<String>,
    pub data: Bytes,
}

impl UploadedFile {
    pub fn new(filename: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            filename: filename.into(),
            content_type: None,
            data: data.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UploadOutcome {
    pub reference: MediaReference,
    /// Set when the image could not be stored.
    pub warning: Option<String>,
}

#[derive(Clone)]
pub struct MediaUploadService {
    validator: Arc<MediaValidator>,
    local: LocalStorage,
    remote: Option<Arc<dyn RemoteStore>>,
}

impl MediaUploadService {
    pub fn new(
        max_upload_size_bytes: usize,
        local: LocalStorage,
        remote: Option<Arc<dyn RemoteStore>>,
    ) -> Self {
        Self {
            validator: Arc::new(MediaValidator::for_images(max_upload_size_bytes)),
            local,
            remote,
        }
    }

    pub fn remote_enabled(&self) -> bool {
        self.remote.is_some()
    }

    /// Validate, optimize and store an image for an owner of `kind`.
    ///
    /// Only validation problems are errors; storage failures come back as a
    /// warning with [`MediaReference::Unset`].
    pub async fn store(&self, kind: MediaKind, file: UploadedFile) -> Result<UploadOutcome, AppError> {
        self.validator
            .validate(&file.filename, file.data.len())
            .map_err(|e| match e {
                ValidationError::FileTooLarge { .. } => AppError::PayloadTooLarge(e.to_string()),
                other => AppError::InvalidInput(other.to_string()),
            })?;

        let bucket = kind.bucket();
        let optimized = ImageOptimizer::optimize(file.data, bucket.name());

        match &self.remote {
            Some(remote) => {
                let url = remote
                    .upload(
                        optimized.data,
                        &file.filename,
                        &optimized.content_type,
                        bucket.name(),
                        None,
                    )
                    .await;
                Ok(match url {
                    Some(url) => UploadOutcome {
                        reference: MediaReference::RemoteUrl(url),
                        warning: None,
                    },
                    None => {
                        tracing::warn!(
                            kind = %kind,
                            bucket = %bucket,
                            filename = %file.filename,
                            "Remote upload failed, saving record without image"
                        );
                        UploadOutcome {
                            reference: MediaReference::Unset,
                            warning: Some(format!(
                                "Image upload to bucket {} failed; the record was saved without an image",
                                bucket
                            )),
                        }
                    }
                })
            }
            None => match self
                .local
                .save(kind.local_folder(), &file.filename, &optimized.data)
                .await
            {
                Ok(path) => Ok(UploadOutcome {
                    reference: MediaReference::LocalPath(path),
                    warning: None,
                }),
                Err(e) => {
                    tracing::error!(
                        error = %e,
                        kind = %kind,
                        filename = %file.filename,
                        "Local save failed, saving record without image"
                    );
                    Ok(UploadOutcome {
                        reference: MediaReference::Unset,
                        warning: Some(
                            "Image could not be saved; the record was saved without an image"
                                .to_string(),
                        ),
                    })
                }
            },
        }
    }
}
