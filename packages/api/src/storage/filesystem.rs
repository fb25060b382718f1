use super::StorageService;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::PathBuf;
use tokio::fs;
use uuid::Uuid;

/// Filesystem storage service implementation (local development)
///
/// Objects live at `<base_path>/<key>` and are served at `<serve_url>/<key>`.
pub struct FilesystemStorageService {
    base_path: PathBuf,
    serve_url: String,
}

impl FilesystemStorageService {
    pub fn new(base_path: impl Into<PathBuf>, serve_url: &str) -> Self {
        Self {
            base_path: base_path.into(),
            serve_url: serve_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl StorageService for FilesystemStorageService {
    async fn upload(&self, key: &str, data: Vec<u8>, _content_type: &str) -> Result<()> {
        let file_path = self.base_path.join(key);
        let parent = file_path
            .parent()
            .with_context(|| format!("no parent directory for {}", file_path.display()))?;

        // Create parent directories if they don't exist
        fs::create_dir_all(parent)
            .await
            .with_context(|| format!("creating {}", parent.display()))?;

        // Write next to the target and rename, so readers never see a partial file
        let tmp_path = parent.join(format!(".{}.part", Uuid::new_v4()));
        if let Err(e) = fs::write(&tmp_path, data).await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(e).with_context(|| format!("writing {}", tmp_path.display()));
        }
        if let Err(e) = fs::rename(&tmp_path, &file_path).await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(e).with_context(|| format!("moving into {}", file_path.display()));
        }

        tracing::debug!("Uploaded to {}", file_path.display());
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.serve_url, key)
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let file_path = self.base_path.join(key);

        match fs::remove_file(&file_path).await {
            Ok(()) => {
                tracing::debug!("Deleted {}", file_path.display());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!("File not found (already deleted): {}", file_path.display());
                Ok(())
            }
            Err(e) => Err(e).with_context(|| format!("removing {}", file_path.display())),
        }
    }
}
