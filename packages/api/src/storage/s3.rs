use super::StorageService;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use aws_config::timeout::TimeoutConfig;
use aws_credential_types::Credentials;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::{config::Builder as S3ConfigBuilder, config::Region};
use std::time::Duration;

/// Connection settings for an S3-compatible bucket.
#[derive(Debug, Clone)]
pub struct S3Settings {
    pub bucket: String,
    pub region: String,
    pub access_key: String,
    pub secret_key: String,
    /// Custom endpoint for non-AWS providers; enables path-style addressing.
    pub endpoint: Option<String>,
    /// Public base URL override, e.g. a bucket website or proxy.
    pub public_url: Option<String>,
    pub timeout: Duration,
}

impl S3Settings {
    /// Base URL objects are publicly reachable under, without trailing slash.
    pub fn public_base_url(&self) -> String {
        if let Some(url) = &self.public_url {
            return url.trim_end_matches('/').to_string();
        }
        match &self.endpoint {
            Some(endpoint) => format!("{}/{}", endpoint.trim_end_matches('/'), self.bucket),
            None => format!("https://{}.s3.{}.amazonaws.com", self.bucket, self.region),
        }
    }
}

/// S3-compatible storage service implementation (production)
pub struct S3StorageService {
    client: aws_sdk_s3::Client,
    bucket: String,
    public_base_url: String,
}

impl S3StorageService {
    pub async fn connect(settings: S3Settings) -> Self {
        let creds = Credentials::new(
            settings.access_key.clone(),
            settings.secret_key.clone(),
            None,
            None,
            "catalog-env",
        );
        let timeouts = TimeoutConfig::builder()
            .operation_timeout(settings.timeout)
            .build();
        let sdk_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(Region::new(settings.region.clone()))
            .credentials_provider(creds)
            .timeout_config(timeouts)
            .load()
            .await;

        let mut s3_config = S3ConfigBuilder::from(&sdk_config);
        if let Some(endpoint) = &settings.endpoint {
            s3_config = s3_config.endpoint_url(endpoint).force_path_style(true);
        }

        Self::with_client(
            aws_sdk_s3::Client::from_conf(s3_config.build()),
            &settings,
        )
    }

    pub fn with_client(client: aws_sdk_s3::Client, settings: &S3Settings) -> Self {
        Self {
            client,
            bucket: settings.bucket.clone(),
            public_base_url: settings.public_base_url(),
        }
    }
}

#[async_trait]
impl StorageService for S3StorageService {
    async fn upload(&self, key: &str, data: Vec<u8>, content_type: &str) -> Result<()> {
        let size = data.len();
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(data))
            .send()
            .await
            .map_err(|e| anyhow!("put_object {}: {}", key, DisplayErrorContext(&e)))?;

        tracing::debug!("Uploaded s3://{}/{} ({} bytes)", self.bucket, key, size);
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_base_url, key)
    }

    async fn delete(&self, key: &str) -> Result<()> {
        // DeleteObject succeeds for keys that do not exist
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| anyhow!("delete_object {}: {}", key, DisplayErrorContext(&e)))?;

        tracing::debug!("Deleted s3://{}/{}", self.bucket, key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::products::ProductRegistry;
    use crate::types::{CreateProduct, UploadedFile};
    use crate::uploads::{AssetCleanup, Uploads};
    use aws_sdk_s3::error::ErrorMetadata;
    use aws_sdk_s3::operation::delete_object::{DeleteObjectError, DeleteObjectOutput};
    use aws_sdk_s3::operation::put_object::PutObjectOutput;
    use aws_smithy_mocks::{mock, mock_client, RuleMode};
    use std::sync::Arc;
    use uuid::Uuid;

    /// `products/<uuid>.<ext>`
    fn is_product_key(key: Option<&str>, ext: &str) -> bool {
        key.and_then(|k| k.strip_prefix("products/"))
            .and_then(|name| name.strip_suffix(ext))
            .and_then(|stem| stem.strip_suffix('.'))
            .is_some_and(|id| Uuid::parse_str(id).is_ok())
    }

    fn delete_denied() -> DeleteObjectError {
        DeleteObjectError::generic(
            ErrorMetadata::builder()
                .code("AccessDenied")
                .message("Access Denied")
                .build(),
        )
    }

    fn lamp(image_url: String) -> CreateProduct {
        CreateProduct {
            name: "Desk lamp".to_string(),
            description: "Brass, dimmable".to_string(),
            price: 49.5,
            category: "Lighting".to_string(),
            image_url: Some(image_url),
            in_stock: None,
        }
    }

    fn settings() -> S3Settings {
        S3Settings {
            bucket: "shop-assets".to_string(),
            region: "eu-west-3".to_string(),
            access_key: "ak".to_string(),
            secret_key: "sk".to_string(),
            endpoint: None,
            public_url: None,
            timeout: Duration::from_secs(30),
        }
    }

    #[test]
    fn aws_virtual_host_url_by_default() {
        assert_eq!(
            settings().public_base_url(),
            "https://shop-assets.s3.eu-west-3.amazonaws.com"
        );
    }

    #[test]
    fn custom_endpoint_uses_path_style() {
        let settings = S3Settings {
            endpoint: Some("https://minio.local:9000/".to_string()),
            ..settings()
        };
        assert_eq!(settings.public_base_url(), "https://minio.local:9000/shop-assets");
    }

    #[test]
    fn explicit_public_url_wins() {
        let settings = S3Settings {
            endpoint: Some("https://minio.local:9000".to_string()),
            public_url: Some("https://cdn.example.com/".to_string()),
            ..settings()
        };
        assert_eq!(settings.public_base_url(), "https://cdn.example.com");
    }

    #[tokio::test]
    async fn object_urls_live_under_products() {
        let storage = S3StorageService::connect(settings()).await;
        assert_eq!(
            storage.public_url("products/abc.png"),
            "https://shop-assets.s3.eu-west-3.amazonaws.com/products/abc.png"
        );
    }

    #[tokio::test]
    async fn upload_puts_object_under_products_with_validated_mime() {
        let put = mock!(aws_sdk_s3::Client::put_object)
            .match_requests(|req| {
                req.bucket() == Some("shop-assets")
                    && req.content_type() == Some("image/jpeg")
                    && is_product_key(req.key(), "jpg")
            })
            .then_output(|| PutObjectOutput::builder().build());
        let client = mock_client!(aws_sdk_s3, [&put]);
        let uploads = Uploads::new(Arc::new(S3StorageService::with_client(client, &settings())));

        let url = uploads
            .store(Some(UploadedFile::new(vec![7; 512], "image/JPG", "Photo.JPG")))
            .await
            .unwrap();

        assert_eq!(put.num_calls(), 1);
        let key = url
            .strip_prefix("https://shop-assets.s3.eu-west-3.amazonaws.com/")
            .unwrap();
        assert!(is_product_key(Some(key), "jpg"), "key={key}");
    }

    #[tokio::test]
    async fn delete_object_failure_is_reported_not_raised() {
        let delete = mock!(aws_sdk_s3::Client::delete_object)
            .match_requests(|req| req.key() == Some("products/abc.png"))
            .then_error(delete_denied);
        let client = mock_client!(aws_sdk_s3, [&delete]);
        let uploads = Uploads::new(Arc::new(S3StorageService::with_client(client, &settings())));

        let cleanup = uploads
            .delete("https://shop-assets.s3.eu-west-3.amazonaws.com/products/abc.png")
            .await;

        match cleanup {
            AssetCleanup::Failed { key, reason } => {
                assert_eq!(key, "products/abc.png");
                assert!(reason.contains("delete_object"), "reason={reason}");
            }
            other => panic!("unexpected cleanup: {other:?}"),
        }
    }

    #[tokio::test]
    async fn delete_object_succeeds_for_known_key() {
        let delete = mock!(aws_sdk_s3::Client::delete_object)
            .match_requests(|req| {
                req.bucket() == Some("shop-assets") && req.key() == Some("products/abc.webp")
            })
            .then_output(|| DeleteObjectOutput::builder().build());
        let client = mock_client!(aws_sdk_s3, [&delete]);
        let storage = S3StorageService::with_client(client, &settings());

        storage.delete("products/abc.webp").await.unwrap();
        assert_eq!(delete.num_calls(), 1);
    }

    #[tokio::test]
    async fn product_delete_survives_failing_delete_object() {
        let put = mock!(aws_sdk_s3::Client::put_object)
            .match_requests(|req| is_product_key(req.key(), "png"))
            .then_output(|| PutObjectOutput::builder().build());
        let delete = mock!(aws_sdk_s3::Client::delete_object)
            .match_requests(|req| is_product_key(req.key(), "png"))
            .then_error(delete_denied);
        let client = mock_client!(aws_sdk_s3, RuleMode::Sequential, [&put, &delete]);
        let uploads = Arc::new(Uploads::new(Arc::new(S3StorageService::with_client(
            client,
            &settings(),
        ))));
        let registry = ProductRegistry::new(uploads.clone());

        let url = uploads
            .store(Some(UploadedFile::new(vec![1; 100 * 1024], "image/png", "a.png")))
            .await
            .unwrap();
        let product = registry.create(lamp(url)).await.unwrap();

        registry.delete(product.id).await.unwrap();

        assert!(delete.num_calls() >= 1);
        assert!(registry.list().await.is_empty());
    }
}
