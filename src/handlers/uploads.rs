use axum::extract::multipart::{Multipart, MultipartError, MultipartRejection};
use axum::extract::State;
use serde::Serialize;

use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;
use crate::validation::FieldError;

/// Form field carrying the logo file
const LOGO_FIELD: &str = "logo";

/// Accepted image types and the extension stored files get
const IMAGE_TYPES: &[(&str, &str)] = &[
    ("image/png", "png"),
    ("image/jpeg", "jpg"),
    ("image/gif", "gif"),
    ("image/webp", "webp"),
    ("image/bmp", "bmp"),
    ("image/svg+xml", "svg"),
];

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedLogo {
    pub url: String,
    pub filename: String,
    pub size: usize,
    pub mime_type: String,
}

fn logo_error(message: impl Into<String>) -> ApiError {
    ApiError::validation_error(vec![FieldError::new(LOGO_FIELD, message)])
}

fn extension_for(content_type: &str) -> Option<&'static str> {
    let essence = content_type.split(';').next().unwrap_or_default().trim();
    IMAGE_TYPES
        .iter()
        .find(|(mime, _)| mime.eq_ignore_ascii_case(essence))
        .map(|(_, ext)| *ext)
}

fn read_error(err: MultipartError, max: usize) -> ApiError {
    if err.status() == axum::http::StatusCode::PAYLOAD_TOO_LARGE {
        logo_error(format!("Logo must not exceed {} KB", max / 1024))
    } else {
        logo_error(format!("Logo upload could not be read: {}", err.body_text()))
    }
}

/// POST /api/upload/logo
///
/// Multipart form with one `logo` image part. The stored file's URL is what
/// a brand kit's `logoUrl` should point at.
pub async fn logo(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<UploadedLogo> {
    let max = state.config.storage.max_logo_bytes;
    let mut multipart = multipart.map_err(|e| logo_error(format!("Expected a multipart form: {}", e.body_text())))?;

    while let Some(mut field) = multipart.next_field().await.map_err(|e| read_error(e, max))? {
        if field.name() != Some(LOGO_FIELD) {
            continue;
        }

        let mime_type = field.content_type().unwrap_or_default().to_string();
        let extension = extension_for(&mime_type)
            .ok_or_else(|| logo_error("Logo must be an image (png, jpeg, gif, webp, bmp or svg)"))?;

        // read the whole part even when too large, so the client sees the response
        let mut bytes = Vec::new();
        let mut too_large = false;
        while let Some(chunk) = field.chunk().await.map_err(|e| read_error(e, max))? {
            if too_large || bytes.len() + chunk.len() > max {
                too_large = true;
                continue;
            }
            bytes.extend_from_slice(&chunk);
        }
        if too_large {
            return Err(logo_error(format!("Logo must not exceed {} KB", max / 1024)));
        }
        if bytes.is_empty() {
            return Err(logo_error("Logo file is empty"));
        }

        let stored = state
            .storage
            .save("logo", extension, &bytes)
            .await
            .map_err(|e| {
                tracing::error!("Failed to store logo: {}", e);
                ApiError::internal(e.to_string())
            })?;
        tracing::info!("User {} uploaded logo {}", user.id, stored.filename);

        return Ok(ApiResponse::created(UploadedLogo {
            url: stored.url,
            filename: stored.filename,
            size: bytes.len(),
            mime_type,
        }));
    }

    Err(logo_error("Logo file is required"))
}
