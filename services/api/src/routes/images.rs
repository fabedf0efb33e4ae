//! Image upload, inline image conversion and per-image access

use axum::{
    Json,
    extract::{Multipart, Path, State, multipart::MultipartError},
    http::header::CONTENT_LENGTH,
    response::{IntoResponse, Redirect, Response},
};
use bytes::BytesMut;
use media::{BatchKind, ImageLimits, IncomingFile, MediaError, UploadSummary};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};

use crate::{
    error::{ApiError, ApiResult, AppJson},
    models::ApiResponse,
    routes::items::{item_not_found, parse_item_id},
    state::AppState,
};

/// Multipart field carrying the files
const IMAGES_FIELD: &str = "images";

/// Body of `POST /api/items/convert-images`
#[derive(Debug, Deserialize)]
pub struct ConvertImagesRequest {
    #[serde(default)]
    pub images: Vec<String>,
}

fn bad_form(err: MultipartError) -> ApiError {
    warn!("Failed to parse multipart form: {}", err);
    ApiError::Validation("Failed to parse multipart form".to_string())
}

/// Collect the `images` parts, keeping at most `max_file_size + 1` bytes of
/// each. The rest of an oversized part is only counted.
///
/// A part beyond `max_images` fails the request before its body is read.
async fn read_images(mut multipart: Multipart, limits: &ImageLimits) -> ApiResult<Vec<IncomingFile>> {
    let max_file_size = limits.max_file_size;
    let keep = (max_file_size + 1) as usize;
    let mut files = Vec::new();

    while let Some(mut field) = multipart.next_field().await.map_err(bad_form)? {
        if field.name() != Some(IMAGES_FIELD) {
            continue;
        }
        if files.len() == limits.max_images {
            warn!("Upload carries more than {} images", limits.max_images);
            return Err(MediaError::TooManyImages {
                max: limits.max_images,
                kind: BatchKind::Upload,
            }
            .into());
        }

        let filename = field.file_name().unwrap_or("image").to_string();
        let announced = field
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok());

        let mut bytes = BytesMut::new();
        let mut received: u64 = 0;
        while let Some(chunk) = field.chunk().await.map_err(bad_form)? {
            received += chunk.len() as u64;
            let room = keep.saturating_sub(bytes.len());
            bytes.extend_from_slice(&chunk[..chunk.len().min(room)]);
        }

        let declared_size = announced.or((received > max_file_size).then_some(received));
        files.push(IncomingFile {
            filename,
            declared_size,
            bytes: bytes.freeze(),
        });
    }

    Ok(files)
}

fn summary_response(summary: UploadSummary) -> Json<ApiResponse<UploadSummary>> {
    let warning = summary.warning();
    let mut response = ApiResponse::ok(summary);
    if let Some(warning) = warning {
        response = response.with_message(warning);
    }
    Json(response)
}

/// Upload listing images to object storage
pub async fn upload_images(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<impl IntoResponse> {
    let files = read_images(multipart, state.uploader.limits()).await?;
    info!("Received {} images for upload", files.len());

    let summary = state.uploader.process_files(files).await?;
    Ok(summary_response(summary))
}

/// Move inline `data:image/...` entries to object storage
pub async fn convert_images(
    State(state): State<AppState>,
    AppJson(payload): AppJson<ConvertImagesRequest>,
) -> ApiResult<impl IntoResponse> {
    let summary = state.uploader.process_inline(payload.images).await?;
    Ok(summary_response(summary))
}

/// Content type named in a data URL header, JPEG when unrecognised
fn inline_content_type(header: &str) -> &'static str {
    if header.contains("image/jpeg") || header.contains("image/jpg") {
        "image/jpeg"
    } else if header.contains("image/png") {
        "image/png"
    } else if header.contains("image/webp") {
        "image/webp"
    } else {
        "image/jpeg"
    }
}

/// Redirect to one image of an item, or describe it when it is stored inline
pub async fn get_item_image(
    State(state): State<AppState>,
    Path((id, index)): Path<(String, String)>,
) -> ApiResult<Response> {
    let index: i64 = index
        .parse()
        .map_err(|_| ApiError::Validation("Invalid image index".to_string()))?;
    let id = parse_item_id(&id)?;

    let item = state
        .items
        .find_by_id(id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get item {}: {}", id, e);
            ApiError::data(e, "Failed to get item")
        })?
        .ok_or_else(item_not_found)?;

    let image = usize::try_from(index)
        .ok()
        .and_then(|index| item.images.get(index))
        .ok_or_else(|| ApiError::NotFound("Image not found".to_string()))?;

    if !image.starts_with("data:image/") {
        return Ok(Redirect::temporary(image).into_response());
    }

    let header = match image.split(',').collect::<Vec<_>>().as_slice() {
        [header, _] => *header,
        _ => return Err(ApiError::Internal("Invalid image format".to_string())),
    };

    Ok(Json(ApiResponse::ok(json!({
        "message": "Image data available but too large for direct serving",
        "item_id": item.id,
        "index": index,
        "type": inline_content_type(header),
        "size": image.len(),
    })))
    .into_response())
}
