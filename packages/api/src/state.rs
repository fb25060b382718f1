use crate::config::{AppConfig, AppMode, StorageConfig};
use crate::products::ProductRegistry;
use crate::storage::{
    filesystem::FilesystemStorageService,
    s3::{S3Settings, S3StorageService},
    StorageService,
};
use crate::uploads::Uploads;
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;

/// Application state containing all service implementations
pub struct AppState {
    pub uploads: Arc<Uploads>,
    pub products: Arc<ProductRegistry>,
    pub config: AppConfig,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// Create AppState from configuration
    ///
    /// The storage backend is chosen here, once; everything downstream only
    /// sees `dyn StorageService`.
    pub async fn from_config(config: AppConfig) -> Result<Self> {
        match config.mode {
            AppMode::Local => tracing::info!("App Mode: LOCAL"),
            AppMode::Production => tracing::info!("App Mode: PRODUCTION"),
        }

        let storage: Arc<dyn StorageService> = match &config.storage {
            StorageConfig::S3 {
                bucket,
                region,
                access_key,
                secret_key,
                endpoint,
                public_url,
                timeout,
            } => {
                tracing::info!("Using S3 storage: bucket={} region={}", bucket, region);
                let settings = S3Settings {
                    bucket: bucket.clone(),
                    region: region.clone(),
                    access_key: access_key.clone(),
                    secret_key: secret_key.clone(),
                    endpoint: endpoint.clone(),
                    public_url: public_url.clone(),
                    timeout: *timeout,
                };
                Arc::new(S3StorageService::connect(settings).await)
            }
            StorageConfig::Filesystem { root, server_url } => {
                let base_path = uploads_dir(root);
                tracing::info!("Using Filesystem storage: {}", base_path.display());

                // Ensure uploads directory exists
                let products_dir = base_path.join(crate::storage::ASSET_PREFIX);
                std::fs::create_dir_all(&products_dir)
                    .with_context(|| format!("creating {}", products_dir.display()))?;

                Arc::new(FilesystemStorageService::new(
                    base_path,
                    &format!("{server_url}/uploads"),
                ))
            }
        };

        Ok(Self::with_storage(config, storage))
    }

    pub fn with_storage(config: AppConfig, storage: Arc<dyn StorageService>) -> Self {
        let uploads = Arc::new(Uploads::new(storage));
        let products = Arc::new(ProductRegistry::new(uploads.clone()));
        Self {
            uploads,
            products,
            config,
        }
    }

    /// Directory served under `/uploads`, when assets are stored locally.
    pub fn local_uploads_dir(&self) -> Option<PathBuf> {
        match &self.config.storage {
            StorageConfig::Filesystem { root, .. } => Some(uploads_dir(root)),
            StorageConfig::S3 { .. } => None,
        }
    }
}

fn uploads_dir(root: &std::path::Path) -> PathBuf {
    root.join("uploads")
}
