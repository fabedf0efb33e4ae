use std::fmt;

use bytes::Bytes;
use serde::Serialize;

const MIB: u64 = 1024 * 1024;

/// Image formats accepted for listings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Jpeg,
    Png,
    Webp,
}

impl ImageKind {
    /// Map a sniffed MIME type onto an accepted kind
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        match content_type {
            "image/jpeg" => Some(ImageKind::Jpeg),
            "image/png" => Some(ImageKind::Png),
            "image/webp" => Some(ImageKind::Webp),
            _ => None,
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ImageKind::Jpeg => "image/jpeg",
            ImageKind::Png => "image/png",
            ImageKind::Webp => "image/webp",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ImageKind::Jpeg => ".jpg",
            ImageKind::Png => ".png",
            ImageKind::Webp => ".webp",
        }
    }
}

/// Size and count limits applied to every batch
#[derive(Debug, Clone)]
pub struct ImageLimits {
    /// Largest accepted image in bytes (default: 5 MiB)
    pub max_file_size: u64,
    /// Most images accepted in one request (default: 5)
    pub max_images: usize,
    /// Longest accepted base64 payload of an inline image
    pub max_base64_len: usize,
}

impl Default for ImageLimits {
    fn default() -> Self {
        Self {
            max_file_size: 5 * MIB,
            max_images: 5,
            max_base64_len: 7_000_000,
        }
    }
}

impl ImageLimits {
    /// The size limit as shown to users, e.g. `5MB`
    pub fn size_label(&self) -> String {
        format!("{}MB", self.max_file_size / MIB)
    }
}

/// One file part of a multipart upload.
///
/// `bytes` holds at most `max_file_size + 1` bytes; the reader stops there so
/// an oversized body is detectable without buffering all of it.
#[derive(Debug, Clone)]
pub struct IncomingFile {
    /// Client supplied name, used only in rejection messages
    pub filename: String,
    /// Size announced by the client, if any
    pub declared_size: Option<u64>,
    pub bytes: Bytes,
}

/// Which endpoint a batch came through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchKind {
    /// Multipart file upload
    Upload,
    /// Inline data URLs converted to stored objects
    Conversion,
}

impl BatchKind {
    pub fn noun(&self) -> &'static str {
        match self {
            BatchKind::Upload => "upload",
            BatchKind::Conversion => "conversion",
        }
    }

    pub fn verb(&self) -> &'static str {
        match self {
            BatchKind::Upload => "upload",
            BatchKind::Conversion => "convert",
        }
    }

    fn past_tense(&self) -> &'static str {
        match self {
            BatchKind::Upload => "Uploaded",
            BatchKind::Conversion => "Converted",
        }
    }
}

/// Why a single image was turned down
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    /// Announced size over the limit; carries the limit label
    ExceedsLimit(String),
    /// Sniffed type is not an accepted image; carries the detected type
    UnsupportedType(String),
    /// Same as `UnsupportedType` on the inline path, which does not echo the type
    InvalidType,
    TooLarge,
    InvalidFormat,
    EncodedTooLarge,
    DecodeFailed,
    /// Decoded inline payload over the limit; carries the limit label
    DecodedTooLarge(String),
    UploadFailed(String),
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::ExceedsLimit(limit) => write!(f, "exceeds {} limit", limit),
            RejectReason::UnsupportedType(detected) => {
                write!(f, "invalid image type: unsupported image type: {}", detected)
            }
            RejectReason::InvalidType => write!(f, "invalid image type"),
            RejectReason::TooLarge => write!(f, "file too large"),
            RejectReason::InvalidFormat => write!(f, "invalid format"),
            RejectReason::EncodedTooLarge => write!(f, "exceeds size limit"),
            RejectReason::DecodeFailed => write!(f, "decode failed"),
            RejectReason::DecodedTooLarge(limit) => write!(f, "decoded size exceeds {}", limit),
            RejectReason::UploadFailed(cause) => write!(f, "upload failed: {}", cause),
        }
    }
}

/// A rejected image: the file name or `image <index>`, and the reason
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub label: String,
    pub reason: RejectReason,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.label, self.reason)
    }
}

/// Outcome of a batch in which at least one image was stored
#[derive(Debug, Clone, Serialize)]
pub struct UploadSummary {
    /// Public URLs, in request order
    pub urls: Vec<String>,
    #[serde(skip)]
    pub rejected: Vec<Rejection>,
    #[serde(skip)]
    pub kind: BatchKind,
}

impl UploadSummary {
    /// Warning shown next to a partial success, `None` when nothing was rejected
    pub fn warning(&self) -> Option<String> {
        if self.rejected.is_empty() {
            return None;
        }
        Some(format!(
            "{} {} images, rejected {}: {}",
            self.kind.past_tense(),
            self.urls.len(),
            self.rejected.len(),
            join_rejections(&self.rejected)
        ))
    }
}

pub(crate) fn join_rejections(rejected: &[Rejection]) -> String {
    rejected
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejection_messages() {
        let limits = ImageLimits::default();
        let rejection = Rejection {
            label: "big.jpg".to_string(),
            reason: RejectReason::ExceedsLimit(limits.size_label()),
        };
        assert_eq!(rejection.to_string(), "big.jpg (exceeds 5MB limit)");

        let rejection = Rejection {
            label: "image 2".to_string(),
            reason: RejectReason::DecodedTooLarge(limits.size_label()),
        };
        assert_eq!(rejection.to_string(), "image 2 (decoded size exceeds 5MB)");
    }

    #[test]
    fn partial_success_warning() {
        let summary = UploadSummary {
            urls: vec!["https://cdn/a.png".to_string()],
            rejected: vec![Rejection {
                label: "notes.pdf".to_string(),
                reason: RejectReason::UnsupportedType("application/pdf".to_string()),
            }],
            kind: BatchKind::Upload,
        };
        assert_eq!(
            summary.warning().unwrap(),
            "Uploaded 1 images, rejected 1: notes.pdf (invalid image type: unsupported image type: application/pdf)"
        );
    }
}
