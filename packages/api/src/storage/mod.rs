use anyhow::Result;
use async_trait::async_trait;
use url::Url;

pub mod filesystem;
pub mod s3;

/// Namespace every product asset is stored under.
pub const ASSET_PREFIX: &str = "products";

/// Trait for storage service implementations
#[async_trait]
pub trait StorageService: Send + Sync {
    /// Persist `data` under `key`. Either the whole object is stored or an
    /// error is returned.
    async fn upload(&self, key: &str, data: Vec<u8>, content_type: &str) -> Result<()>;

    fn public_url(&self, key: &str) -> String;

    /// Remove the object at `key`. A missing object is not an error.
    async fn delete(&self, key: &str) -> Result<()>;
}

/// Derive the storage key from an asset URL: the final path segment, under
/// [`ASSET_PREFIX`]. Returns `None` when there is nothing to delete.
///
/// Values that do not parse as absolute URLs are treated as bare names.
pub fn key_from_url(url: &str) -> Option<String> {
    let name = match Url::parse(url) {
        Ok(parsed) => parsed
            .path_segments()
            .and_then(|segments| segments.last())
            .unwrap_or_default()
            .to_string(),
        Err(_) => {
            let path = url.split(['?', '#']).next().unwrap_or_default();
            path.rsplit('/').next().unwrap_or_default().to_string()
        }
    };
    let name = name.trim();
    if name.is_empty() || name == "." || name == ".." || name.contains('\\') {
        return None;
    }
    Some(format!("{ASSET_PREFIX}/{name}"))
}
