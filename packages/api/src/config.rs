use anyhow::{bail, Context, Result};
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_SERVER_URL: &str = "http://localhost:3000";
const DEFAULT_STORAGE_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    Local,
    Production,
}

impl AppMode {
    pub fn from_env() -> Self {
        Self::parse(&std::env::var("APP_MODE").unwrap_or_default())
    }

    fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "local" => AppMode::Local,
            _ => AppMode::Production, // Default to production for safety
        }
    }
}

/// Where uploaded assets live.
#[derive(Debug, Clone, PartialEq)]
pub enum StorageConfig {
    /// Files under `<root>/uploads/products`, served by this process.
    Filesystem { root: PathBuf, server_url: String },
    /// S3-compatible bucket.
    S3 {
        bucket: String,
        region: String,
        access_key: String,
        secret_key: String,
        endpoint: Option<String>,
        public_url: Option<String>,
        timeout: Duration,
    },
}

impl StorageConfig {
    pub fn kind(&self) -> &'static str {
        match self {
            StorageConfig::Filesystem { .. } => "filesystem",
            StorageConfig::S3 { .. } => "s3",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub mode: AppMode,
    pub ip: String,
    pub port: u16,
    pub storage: StorageConfig,
}

impl AppConfig {
    /// Load configuration from the process environment.
    ///
    /// Missing object-storage settings in production mode are an error; the
    /// server refuses to start rather than failing per request.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let mode = AppMode::parse(&get("APP_MODE").unwrap_or_default());
        let ip = get("IP").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = match get("PORT") {
            Some(v) => v.parse::<u16>().with_context(|| format!("PORT is not a port: {v}"))?,
            None => 3000,
        };

        let storage = match mode {
            AppMode::Local => StorageConfig::Filesystem {
                root: PathBuf::from(get("UPLOADS_ROOT").unwrap_or_else(|| ".".to_string())),
                server_url: get("SERVER_URL")
                    .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string())
                    .trim_end_matches('/')
                    .to_string(),
            },
            AppMode::Production => {
                let required = [
                    "STORAGE_BUCKET",
                    "STORAGE_REGION",
                    "STORAGE_ACCESS_KEY",
                    "STORAGE_SECRET_KEY",
                ];
                let missing: Vec<&str> = required
                    .iter()
                    .copied()
                    .filter(|key| get(*key).is_none())
                    .collect();
                if !missing.is_empty() {
                    bail!("missing storage configuration: {}", missing.join(", "));
                }

                let timeout = match get("STORAGE_TIMEOUT_SECS") {
                    Some(v) => Duration::from_secs(
                        v.parse::<u64>()
                            .with_context(|| format!("STORAGE_TIMEOUT_SECS is not a number: {v}"))?,
                    ),
                    None => DEFAULT_STORAGE_TIMEOUT,
                };

                StorageConfig::S3 {
                    bucket: get("STORAGE_BUCKET").unwrap_or_default(),
                    region: get("STORAGE_REGION").unwrap_or_default(),
                    access_key: get("STORAGE_ACCESS_KEY").unwrap_or_default(),
                    secret_key: get("STORAGE_SECRET_KEY").unwrap_or_default(),
                    endpoint: get("STORAGE_ENDPOINT").map(|v| v.trim_end_matches('/').to_string()),
                    public_url: get("STORAGE_PUBLIC_URL").map(|v| v.trim_end_matches('/').to_string()),
                    timeout,
                }
            }
        };

        Ok(Self { mode, ip, port, storage })
    }
}

/// Load `.env` if present. Real environment variables win.
pub fn load_dotenv() {
    match dotenvy::dotenv() {
        Ok(path) => tracing::debug!("loaded env from {}", path.display()),
        Err(e) if e.not_found() => {}
        Err(e) => tracing::warn!("failed to load .env: {}", e),
    }
}
