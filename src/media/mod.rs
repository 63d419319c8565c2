use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::MediaConfig;

/// Subdirectory of the media root holding recipe images
const RECIPE_IMAGE_DIR: &str = "uploads/recipe";

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("Not a valid image: {0}")]
    NotAnImage(#[from] image::ImageError),

    #[error("Uploaded file is empty")]
    Empty,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Stores uploaded files on the local filesystem under a media root.
///
/// Stored files are referred to by their public URL path
/// (`<url_prefix>/uploads/recipe/<uuid>.<ext>`), which is what gets persisted
/// on the recipe and what the static file service answers to.
#[derive(Debug, Clone)]
pub struct MediaStorage {
    root: PathBuf,
    url_prefix: String,
}

impl MediaStorage {
    pub fn new(root: impl Into<PathBuf>, url_prefix: &str) -> Self {
        Self {
            root: root.into(),
            url_prefix: url_prefix.trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &MediaConfig) -> Self {
        Self::new(config.root.clone(), &config.url_prefix)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn url_prefix(&self) -> &str {
        &self.url_prefix
    }

    /// Validate `bytes` as an image and write it under a fresh name.
    /// Returns the public reference of the stored file.
    pub async fn save_recipe_image(&self, bytes: &[u8]) -> Result<String, MediaError> {
        if bytes.is_empty() {
            return Err(MediaError::Empty);
        }

        // Sniff the format from content, then make sure it actually decodes
        let format = image::guess_format(bytes)?;
        image::load_from_memory_with_format(bytes, format)?;

        let extension = format.extensions_str().first().copied().unwrap_or("img");
        let filename = format!("{}.{}", Uuid::new_v4(), extension);

        let dir = self.root.join(RECIPE_IMAGE_DIR);
        tokio::fs::create_dir_all(&dir).await?;
        tokio::fs::write(dir.join(&filename), bytes).await?;

        let reference = format!("{}/{}/{}", self.url_prefix, RECIPE_IMAGE_DIR, filename);
        debug!("Stored recipe image {}", reference);
        Ok(reference)
    }

    /// Best-effort removal of a stored file. Missing files and references
    /// outside the media root are ignored.
    pub async fn remove(&self, reference: &str) {
        let Some(path) = self.resolve(reference) else {
            warn!("Refusing to remove media outside root: {}", reference);
            return;
        };

        match tokio::fs::remove_file(&path).await {
            Ok(()) => debug!("Removed media file {}", path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to remove media file {}: {}", path.display(), e),
        }
    }

    /// Map a public reference back to a path under the root
    fn resolve(&self, reference: &str) -> Option<PathBuf> {
        let relative = reference.strip_prefix(&self.url_prefix)?.trim_start_matches('/');
        let relative = Path::new(relative);

        let safe = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        if !safe || relative.as_os_str().is_empty() {
            return None;
        }
        Some(self.root.join(relative))
    }
}
