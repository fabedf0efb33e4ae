//! Per-image validation
//!
//! The true type of an image is always taken from its leading bytes; client
//! supplied names, extensions and MIME types are never trusted.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use bytes::Bytes;
use chrono::Utc;
use uuid::Uuid;

use crate::models::{ImageKind, ImageLimits, IncomingFile, RejectReason};
use crate::sniff::detect_content_type;

/// An image that passed validation
#[derive(Debug, Clone)]
pub struct ValidatedImage {
    pub kind: ImageKind,
    pub bytes: Bytes,
}

/// Validate one multipart file
pub fn validate_file(file: &IncomingFile, limits: &ImageLimits) -> Result<ValidatedImage, RejectReason> {
    if file.declared_size.is_some_and(|size| size > limits.max_file_size) {
        return Err(RejectReason::ExceedsLimit(limits.size_label()));
    }

    let detected = detect_content_type(&file.bytes);
    let kind = ImageKind::from_content_type(detected)
        .ok_or_else(|| RejectReason::UnsupportedType(detected.to_string()))?;

    if file.bytes.len() as u64 > limits.max_file_size {
        return Err(RejectReason::TooLarge);
    }

    Ok(ValidatedImage {
        kind,
        bytes: file.bytes.clone(),
    })
}

/// Whether an image list entry is an inline `data:image/...` payload
pub fn is_inline_image(entry: &str) -> bool {
    entry.starts_with("data:image/")
}

/// Decode and validate a `data:image/<type>;base64,<data>` entry
pub fn decode_data_url(entry: &str, limits: &ImageLimits) -> Result<ValidatedImage, RejectReason> {
    let mut parts = entry.split(',');
    let payload = match (parts.next(), parts.next(), parts.next()) {
        (Some(_), Some(payload), None) => payload,
        _ => return Err(RejectReason::InvalidFormat),
    };

    if payload.len() > limits.max_base64_len {
        return Err(RejectReason::EncodedTooLarge);
    }

    let decoded = STANDARD
        .decode(payload)
        .map_err(|_| RejectReason::DecodeFailed)?;

    if decoded.len() as u64 > limits.max_file_size {
        return Err(RejectReason::DecodedTooLarge(limits.size_label()));
    }

    let kind = ImageKind::from_content_type(detect_content_type(&decoded))
        .ok_or(RejectReason::InvalidType)?;

    Ok(ValidatedImage {
        kind,
        bytes: Bytes::from(decoded),
    })
}

/// Collision resistant object name: `{uuid-v4}_{unix-seconds}{ext}`
pub fn object_name(kind: ImageKind) -> String {
    format!(
        "{}_{}{}",
        Uuid::new_v4(),
        Utc::now().timestamp(),
        kind.extension()
    )
}
