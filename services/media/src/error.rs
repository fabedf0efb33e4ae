//! Errors raised while validating and storing images

use thiserror::Error;

use crate::models::BatchKind;

#[derive(Error, Debug)]
pub enum MediaError {
    #[error("No images provided")]
    NoImages,

    #[error("Maximum {max} images allowed per {}", .kind.noun())]
    TooManyImages { max: usize, kind: BatchKind },

    /// Every image in the batch was rejected; carries the joined reasons
    #[error("All images rejected: {0}")]
    AllRejected(String),

    #[error("Failed to {} any images", .kind.verb())]
    NothingStored { kind: BatchKind },

    #[error("storage error: {0}")]
    Storage(String),

    #[error("storage configuration error: {0}")]
    Configuration(String),
}

pub type MediaResult<T> = Result<T, MediaError>;
