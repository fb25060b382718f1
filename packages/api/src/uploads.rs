//! Image upload and best-effort asset cleanup on top of a [`StorageService`].

use crate::error::{Error, Result};
use crate::storage::{key_from_url, StorageService, ASSET_PREFIX};
use crate::types::{ImageType, UploadedFile, MAX_IMAGE_BYTES};
use std::sync::Arc;
use uuid::Uuid;

const FALLBACK_EXTENSION: &str = "bin";
const MAX_EXTENSION_LEN: usize = 10;

/// Outcome of a best-effort asset deletion. Never an error for the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetCleanup {
    Deleted { key: String },
    NothingToDelete,
    Failed { key: String, reason: String },
}

pub struct Uploads {
    storage: Arc<dyn StorageService>,
}

impl Uploads {
    pub fn new(storage: Arc<dyn StorageService>) -> Self {
        Self { storage }
    }

    /// Validate and persist an image, returning its public URL.
    ///
    /// All validation happens before the backend is touched, so a rejected
    /// payload leaves no object behind.
    pub async fn store(&self, file: Option<UploadedFile>) -> Result<String> {
        let (file, image_type) = validate(file)?;

        let name = format!("{}.{}", Uuid::new_v4(), extension_for(&file.original_name));
        let key = format!("{ASSET_PREFIX}/{name}");
        let size = file.bytes.len();

        self.storage
            .upload(&key, file.bytes, image_type.as_mime())
            .await
            .map_err(|e| Error::Storage(format!("upload failed: {e:#}")))?;

        let url = self.storage.public_url(&key);
        tracing::info!("uploads.store: key={} bytes={}", key, size);
        Ok(url)
    }

    /// Remove the asset behind `url`. Failures are logged and reported in the
    /// returned value, never propagated.
    pub async fn delete(&self, url: &str) -> AssetCleanup {
        let Some(key) = key_from_url(url) else {
            tracing::debug!("uploads.delete: nothing to delete for url_len={}", url.len());
            return AssetCleanup::NothingToDelete;
        };

        match self.storage.delete(&key).await {
            Ok(()) => {
                tracing::debug!("uploads.delete: key={}", key);
                AssetCleanup::Deleted { key }
            }
            Err(e) => {
                tracing::warn!("uploads.delete: failed to delete {}: {:#}", key, e);
                AssetCleanup::Failed {
                    key,
                    reason: format!("{e:#}"),
                }
            }
        }
    }
}

fn validate(file: Option<UploadedFile>) -> Result<(UploadedFile, ImageType)> {
    let file = file.ok_or_else(|| Error::validation("no file provided"))?;
    let image_type = ImageType::from_mime(&file.content_type)
        .ok_or_else(|| Error::validation("unsupported media type"))?;
    if file.bytes.len() > MAX_IMAGE_BYTES {
        return Err(Error::validation("file too large"));
    }
    Ok((file, image_type))
}

/// Extension taken from the client's filename, or `bin` when there is no
/// usable one. Only short ASCII alphanumeric extensions are kept.
fn extension_for(original_name: &str) -> String {
    match original_name.rsplit_once('.') {
        Some((_, ext))
            if !ext.is_empty()
                && ext.len() <= MAX_EXTENSION_LEN
                && ext.chars().all(|c| c.is_ascii_alphanumeric()) =>
        {
            ext.to_ascii_lowercase()
        }
        _ => FALLBACK_EXTENSION.to_string(),
    }
}
