use std::path::{Component, Path, PathBuf};

use crate::error::AppError;

pub const IMAGE_DIRECTORY: &str = "recipes";
pub const MAX_IMAGE_SIZE: usize = 5120 * 1024;

const ALLOWED_CONTENT_TYPES: [&str; 4] = ["image/jpeg", "image/png", "image/gif", "image/webp"];
const ALLOWED_EXTENSIONS: [&str; 5] = ["jpeg", "jpg", "png", "gif", "webp"];
const STORAGE_MARKER: &str = "/storage/";

/// Recipe images on the local disk, served back under `/api/storage`.
#[derive(Debug, Clone)]
pub struct ImageStore {
    root: PathBuf,
    public_base: String,
}

impl ImageStore {
    pub fn new(root: impl Into<PathBuf>, base_url: &str) -> Self {
        Self {
            root: root.into(),
            public_base: format!("{}/api/storage", base_url.trim_end_matches('/')),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn extension(file_name: &str) -> Option<String> {
        Path::new(file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase())
    }

    /// Checks an upload before anything touches the disk.
    pub fn validate(
        &self,
        content_type: Option<&str>,
        file_name: Option<&str>,
        size: usize,
    ) -> Result<String, AppError> {
        let Some(file_name) = file_name.filter(|name| !name.is_empty()) else {
            return Err(AppError::invalid("image", "Image file is required."));
        };
        if size == 0 {
            return Err(AppError::invalid("image", "Image file is required."));
        }

        let content_type_ok = content_type
            .map(|ct| ALLOWED_CONTENT_TYPES.contains(&ct.to_lowercase().as_str()))
            .unwrap_or(false);
        let extension = Self::extension(file_name)
            .filter(|ext| ALLOWED_EXTENSIONS.contains(&ext.as_str()));

        let Some(extension) = extension.filter(|_| content_type_ok) else {
            return Err(AppError::invalid(
                "image",
                "Image must be jpeg, png, jpg, gif, or webp.",
            ));
        };

        if size > MAX_IMAGE_SIZE {
            return Err(AppError::invalid("image", "Image must not exceed 5MB."));
        }

        Ok(extension)
    }

    /// Writes the bytes under a fresh name and returns the relative path.
    pub async fn upload(&self, bytes: &[u8], extension: &str) -> anyhow::Result<String> {
        let file_name = format!("{}.{extension}", uuid::Uuid::new_v4());
        let relative = format!("{IMAGE_DIRECTORY}/{file_name}");

        let dir = self.root.join(IMAGE_DIRECTORY);
        tokio::fs::create_dir_all(&dir).await?;
        tokio::fs::write(dir.join(&file_name), bytes).await?;

        tracing::info!(path = %relative, size = bytes.len(), "image stored");

        Ok(relative)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.public_base, path.trim_start_matches('/'))
    }

    pub fn is_external_url(value: &str) -> bool {
        url::Url::parse(value)
            .map(|url| matches!(url.scheme(), "http" | "https"))
            .unwrap_or(false)
    }

    /// The stored relative path behind an image reference, if it is ours.
    pub fn local_path(value: &str) -> Option<String> {
        if value.is_empty() {
            return None;
        }

        if Self::is_external_url(value) {
            return value
                .rfind(STORAGE_MARKER)
                .map(|index| value[index + STORAGE_MARKER.len()..].to_owned())
                .filter(|path| !path.is_empty());
        }

        Some(value.trim_start_matches('/').to_owned())
    }

    /// Public URL of an image reference as rendered in recipe JSON.
    pub fn resolve_image_url(&self, value: Option<&str>) -> Option<String> {
        let value = value.filter(|value| !value.is_empty())?;

        if Self::is_external_url(value) && !value.contains(STORAGE_MARKER) {
            return Some(value.to_owned());
        }

        Self::local_path(value).map(|path| self.url(&path))
    }

    fn safe_path(&self, path: &str) -> Option<PathBuf> {
        if path.is_empty() || path.contains('\\') || path.contains("..") {
            return None;
        }

        let relative = Path::new(path);
        let clean = relative
            .components()
            .all(|component| matches!(component, Component::Normal(_)));
        if !clean {
            return None;
        }

        Some(self.root.join(relative))
    }

    /// Removes a stored image. Missing files and external URLs are ignored.
    pub async fn delete(&self, value: &str) {
        let Some(path) = Self::local_path(value).and_then(|path| self.safe_path(&path)) else {
            return;
        };

        match tokio::fs::remove_file(&path).await {
            Ok(()) => tracing::info!(path = %path.display(), "image deleted"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(path = %path.display(), "failed to delete image: {e}"),
        }
    }

    /// Reads a stored file with its guessed content type.
    pub async fn read(&self, path: &str) -> Result<(Vec<u8>, String), AppError> {
        let Some(full_path) = self.safe_path(path) else {
            return Err(AppError::not_found("Not Found"));
        };

        let bytes = match tokio::fs::read(&full_path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(AppError::not_found("Not Found"));
            }
            Err(e) if e.kind() == std::io::ErrorKind::IsADirectory => {
                return Err(AppError::not_found("Not Found"));
            }
            Err(e) => return Err(anyhow::Error::from(e).into()),
        };

        let mime = mime_guess::from_path(&full_path)
            .first_or_octet_stream()
            .to_string();

        Ok((bytes, mime))
    }
}
