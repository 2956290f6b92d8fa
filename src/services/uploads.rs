use chrono::Utc;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

use crate::config::AppConfig;
use crate::errors::ServiceError;

/// Content types accepted for menu images.
pub const ALLOWED_IMAGE_TYPES: [&str; 5] = [
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/gif",
    "image/webp",
];

/// Validates and stores uploaded menu images.
#[derive(Clone, Debug)]
pub struct UploadService {
    upload_dir: PathBuf,
    max_bytes: usize,
}

impl UploadService {
    pub fn new(upload_dir: impl Into<PathBuf>, max_bytes: usize) -> Self {
        Self {
            upload_dir: upload_dir.into(),
            max_bytes,
        }
    }

    pub fn from_config(cfg: &AppConfig) -> Self {
        Self::new(cfg.upload_dir.clone(), cfg.max_upload_bytes)
    }

    /// Stores an uploaded image after checking its declared content type
    /// against the allow-list and its size against the configured cap.
    /// Returns the stored path, relative to the working directory.
    #[instrument(skip(self, bytes))]
    pub fn store(
        &self,
        bytes: &[u8],
        content_type: &str,
        original_name: &str,
    ) -> Result<String, ServiceError> {
        if !ALLOWED_IMAGE_TYPES.contains(&content_type) {
            return Err(ServiceError::InvalidInput(
                "Invalid file type. Only JPG, PNG, GIF, and WebP are allowed".to_string(),
            ));
        }

        if bytes.len() > self.max_bytes {
            return Err(ServiceError::InvalidInput(format!(
                "File size exceeds {}MB limit",
                self.max_bytes / (1024 * 1024)
            )));
        }

        let filename = format!(
            "{}_{}{}",
            Utc::now().timestamp_millis(),
            random_suffix(),
            file_extension(original_name, content_type)
        );

        fs::create_dir_all(&self.upload_dir)?;
        let filepath = self.upload_dir.join(&filename);
        fs::write(&filepath, bytes)?;

        info!(path = %filepath.display(), "Stored uploaded image");
        Ok(filepath.to_string_lossy().into_owned())
    }
}

/// Extension from the uploaded filename, falling back to one implied by the
/// content type.
fn file_extension(original_name: &str, content_type: &str) -> String {
    let from_name = Path::new(original_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    let ext = from_name.or_else(|| {
        mime_guess::get_mime_extensions_str(content_type)
            .and_then(|exts| exts.first())
            .map(|e| e.to_string())
    });

    ext.map(|e| format!(".{e}")).unwrap_or_default()
}

fn random_suffix() -> String {
    rand::random::<[u8; 3]>()
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}
