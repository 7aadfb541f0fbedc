//! Storage for uploaded product images.
//!
//! Files land in a single flat directory as `{unix_millis}_{sanitized_stem}.{ext}`
//! and are addressed by that filename alone.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Image extensions accepted for upload (compared case-insensitively).
pub const ALLOWED_IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif"];

/// Errors that can occur while storing an upload.
#[derive(Debug, Error)]
pub enum UploadError {
    /// File extension is missing or not an accepted image type.
    #[error("file type not allowed: {0}")]
    DisallowedExtension(String),

    /// Writing the file failed.
    #[error("could not store upload: {0}")]
    Io(#[from] std::io::Error),
}

/// Directory-backed store for product images.
#[derive(Debug, Clone)]
pub struct ImageStore {
    dir: PathBuf,
}

impl ImageStore {
    /// Create a store writing into `dir`. The directory is created on first save.
    #[must_use]
    pub const fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// Directory files are written to.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Check that `filename` has an accepted image extension.
    ///
    /// # Errors
    ///
    /// Returns `UploadError::DisallowedExtension` otherwise.
    pub fn check_extension(filename: &str) -> Result<String, UploadError> {
        let ext = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .ok_or_else(|| UploadError::DisallowedExtension(filename.to_owned()))?;

        if ALLOWED_IMAGE_EXTENSIONS.contains(&ext.as_str()) {
            Ok(ext)
        } else {
            Err(UploadError::DisallowedExtension(filename.to_owned()))
        }
    }

    /// Store an uploaded file and return the filename it was saved under.
    ///
    /// # Errors
    ///
    /// Returns `UploadError::DisallowedExtension` for non-image files and
    /// `UploadError::Io` if the directory or file cannot be written.
    pub async fn save(&self, original_name: &str, bytes: &[u8]) -> Result<String, UploadError> {
        let ext = Self::check_extension(original_name)?;
        let stem = sanitize_stem(original_name);
        let millis = chrono::Utc::now().timestamp_millis();

        fs::create_dir_all(&self.dir).await?;

        let filename = format!("{millis}_{stem}.{ext}");
        match self.write_new(&filename, bytes).await {
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                let suffix = uuid::Uuid::new_v4().simple();
                let filename = format!("{millis}_{suffix}_{stem}.{ext}");
                self.write_new(&filename, bytes).await?;
                Ok(filename)
            }
            Err(e) => Err(e.into()),
            Ok(()) => Ok(filename),
        }
    }

    /// Delete a stored file. Missing files are ignored.
    pub async fn remove(&self, filename: &str) {
        let path = self.dir.join(filename);
        if let Err(e) = fs::remove_file(&path).await
            && e.kind() != ErrorKind::NotFound
        {
            tracing::warn!(path = %path.display(), error = %e, "Failed to remove upload");
        }
    }

    async fn write_new(&self, filename: &str, bytes: &[u8]) -> std::io::Result<()> {
        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(self.dir.join(filename))
            .await?;
        file.write_all(bytes).await?;
        file.flush().await
    }
}

/// Reduce the stem of a client-supplied filename to `[A-Za-z0-9._-]`.
///
/// Directory components are dropped and whitespace becomes `_`. Falls back
/// to `image` when nothing usable is left.
fn sanitize_stem(original_name: &str) -> String {
    let base = original_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(original_name);
    let stem = Path::new(base)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("");

    let cleaned: String = stem
        .chars()
        .filter_map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                Some(c)
            } else if c.is_whitespace() {
                Some('_')
            } else {
                None
            }
        })
        .collect();
    let cleaned = cleaned.trim_matches(|c| c == '.' || c == '_');

    if cleaned.is_empty() {
        "image".to_owned()
    } else {
        cleaned.to_owned()
    }
}
