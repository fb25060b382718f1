use crate::config::{AppConfig, AppMode, StorageConfig};
use crate::state::AppState;
use crate::storage::filesystem::FilesystemStorageService;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

pub const TEST_SERVER_URL: &str = "http://localhost:3000";

/// A local-mode `AppState` over a throwaway upload root.
///
/// The directory is removed when the context is dropped.
pub struct TestContext {
    pub state: Arc<AppState>,
    root: TempDir,
}

impl TestContext {
    pub fn new() -> Self {
        let root = tempfile::tempdir().expect("Failed to create test upload root");
        let config = AppConfig {
            mode: AppMode::Local,
            ip: "127.0.0.1".to_string(),
            port: 0,
            storage: StorageConfig::Filesystem {
                root: root.path().to_path_buf(),
                server_url: TEST_SERVER_URL.to_string(),
            },
        };
        let storage = Arc::new(FilesystemStorageService::new(
            root.path().join("uploads"),
            &format!("{TEST_SERVER_URL}/uploads"),
        ));

        Self {
            state: Arc::new(AppState::with_storage(config, storage)),
            root,
        }
    }

    pub fn root(&self) -> &Path {
        self.root.path()
    }

    /// On-disk location of the asset an upload URL points at.
    pub fn asset_path(&self, url: &str) -> PathBuf {
        let name = url.rsplit('/').next().unwrap_or_default();
        self.root.path().join("uploads").join("products").join(name)
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}
