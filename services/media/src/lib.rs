//! Listing image handling for the PesXChange backend
//!
//! Uploaded images are identified by their leading bytes, checked against
//! size and count limits, renamed and stored in the S3-compatible bucket of
//! the hosted storage service.

pub mod error;
pub mod models;
pub mod sniff;
pub mod storage;
pub mod uploader;
pub mod validator;

pub use error::{MediaError, MediaResult};
pub use models::{BatchKind, ImageKind, ImageLimits, IncomingFile, UploadSummary};
pub use storage::{ObjectStore, S3ObjectStore, StorageConfig};
pub use uploader::ImageUploader;
