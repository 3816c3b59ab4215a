use axum::{
    Json,
    body::Bytes,
    extract::{DefaultBodyLimit, Multipart, State, multipart::Field},
    http::{StatusCode, header},
    response::IntoResponse,
};
use serde_json::json;

use super::AppState;
use crate::{
    auth::AuthUser,
    error::{AppError, AppResult},
    extract::PathParam,
    storage::{ImageStore, MAX_IMAGE_SIZE},
};

/// Room for a full-size image plus the multipart framing.
pub fn body_limit() -> DefaultBodyLimit {
    DefaultBodyLimit::max(MAX_IMAGE_SIZE + 1024 * 1024)
}

/// GET /api/storage/{*path}
pub async fn show(
    State(state): State<AppState>,
    PathParam(path): PathParam<String>,
) -> AppResult<impl IntoResponse> {
    let (bytes, mime) = state.images.read(&path).await?;

    Ok((
        [
            (header::CONTENT_TYPE, mime),
            (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*".to_owned()),
            (header::CACHE_CONTROL, "public, max-age=31536000".to_owned()),
        ],
        bytes,
    ))
}

/// A file part read from a multipart body.
pub struct UploadedImage {
    pub content_type: Option<String>,
    pub file_name: Option<String>,
    pub bytes: Bytes,
}

impl UploadedImage {
    pub async fn read(field: Field<'_>) -> AppResult<Self> {
        let content_type = field.content_type().map(str::to_owned);
        let file_name = field.file_name().map(str::to_owned);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadBody(e.body_text()))?;

        Ok(Self {
            content_type,
            file_name,
            bytes,
        })
    }

    /// Validates and writes the image. Returns its relative path.
    pub async fn store(self, images: &ImageStore) -> AppResult<String> {
        let extension = images.validate(
            self.content_type.as_deref(),
            self.file_name.as_deref(),
            self.bytes.len(),
        )?;

        Ok(images.upload(&self.bytes, &extension).await?)
    }
}

/// POST /api/upload - multipart field `image`
#[tracing::instrument(skip_all, fields(user_id = auth.user.id))]
pub async fn upload(
    State(state): State<AppState>,
    auth: AuthUser,
    mut multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    let mut image = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadBody(e.body_text()))?
    {
        if field.name() == Some("image") {
            image = Some(UploadedImage::read(field).await?);
            break;
        }
    }

    let Some(image) = image else {
        return Err(AppError::invalid("image", "Image file is required."));
    };

    let path = image.store(&state.images).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "url": state.images.url(&path),
            "path": path,
        })),
    ))
}
