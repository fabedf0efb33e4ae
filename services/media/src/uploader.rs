//! Batch image processing: validate each image, store the accepted ones and
//! aggregate the outcome

use std::sync::Arc;

use tracing::{info, warn};

use crate::error::{MediaError, MediaResult};
use crate::models::{
    BatchKind, ImageLimits, IncomingFile, RejectReason, Rejection, UploadSummary, join_rejections,
};
use crate::storage::ObjectStore;
use crate::validator::{ValidatedImage, decode_data_url, is_inline_image, object_name, validate_file};

#[derive(Clone)]
pub struct ImageUploader {
    store: Arc<dyn ObjectStore>,
    limits: ImageLimits,
}

impl ImageUploader {
    pub fn new(store: Arc<dyn ObjectStore>, limits: ImageLimits) -> Self {
        Self { store, limits }
    }

    pub fn limits(&self) -> &ImageLimits {
        &self.limits
    }

    /// Reject a batch that is empty or over the count limit
    pub fn check_count(&self, count: usize, kind: BatchKind) -> MediaResult<()> {
        if count > self.limits.max_images {
            return Err(MediaError::TooManyImages {
                max: self.limits.max_images,
                kind,
            });
        }
        if count == 0 && kind == BatchKind::Upload {
            return Err(MediaError::NoImages);
        }
        Ok(())
    }

    async fn store(&self, image: ValidatedImage) -> Result<String, RejectReason> {
        let name = object_name(image.kind);
        self.store
            .put(&name, image.bytes, image.kind.content_type())
            .await
            .map_err(|e| RejectReason::UploadFailed(e.to_string()))
    }

    /// Validate and store multipart files
    pub async fn process_files(&self, files: Vec<IncomingFile>) -> MediaResult<UploadSummary> {
        self.check_count(files.len(), BatchKind::Upload)?;

        let mut urls = Vec::new();
        let mut rejected = Vec::new();

        for file in files {
            let outcome = match validate_file(&file, &self.limits) {
                Ok(image) => self.store(image).await,
                Err(reason) => Err(reason),
            };
            match outcome {
                Ok(url) => urls.push(url),
                Err(reason) => {
                    warn!("Rejected upload {}: {}", file.filename, reason);
                    rejected.push(Rejection {
                        label: file.filename,
                        reason,
                    });
                }
            }
        }

        finish(urls, rejected, BatchKind::Upload)
    }

    /// Store inline `data:image/...` entries; other entries are kept as they are
    pub async fn process_inline(&self, images: Vec<String>) -> MediaResult<UploadSummary> {
        self.check_count(images.len(), BatchKind::Conversion)?;

        let mut urls = Vec::new();
        let mut rejected = Vec::new();

        for (index, entry) in images.into_iter().enumerate() {
            if !is_inline_image(&entry) {
                urls.push(entry);
                continue;
            }

            let outcome = match decode_data_url(&entry, &self.limits) {
                Ok(image) => self.store(image).await,
                Err(reason) => Err(reason),
            };
            match outcome {
                Ok(url) => urls.push(url),
                Err(reason) => {
                    warn!("Rejected inline image {}: {}", index, reason);
                    rejected.push(Rejection {
                        label: format!("image {}", index),
                        reason,
                    });
                }
            }
        }

        finish(urls, rejected, BatchKind::Conversion)
    }
}

fn finish(urls: Vec<String>, rejected: Vec<Rejection>, kind: BatchKind) -> MediaResult<UploadSummary> {
    if urls.is_empty() {
        if rejected.is_empty() {
            return Err(MediaError::NothingStored { kind });
        }
        return Err(MediaError::AllRejected(join_rejections(&rejected)));
    }

    info!(
        "Stored {} images ({} rejected) via {}",
        urls.len(),
        rejected.len(),
        kind.noun()
    );
    Ok(UploadSummary {
        urls,
        rejected,
        kind,
    })
}
