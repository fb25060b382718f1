use crate::error::{Error, Result};
use crate::types::{CreateProduct, Product, UpdateProduct};
use crate::uploads::Uploads;
use std::collections::HashMap;
use std::sync::Arc;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

const ENTITY: &str = "Product";

/// In-memory product registry. Contents live only as long as the process.
pub struct ProductRegistry {
    products: RwLock<HashMap<Uuid, Product>>,
    uploads: Arc<Uploads>,
}

impl ProductRegistry {
    pub fn new(uploads: Arc<Uploads>) -> Self {
        Self {
            products: RwLock::new(HashMap::new()),
            uploads,
        }
    }

    pub async fn create(&self, input: CreateProduct) -> Result<Product> {
        input.validate()?;

        let product = Product {
            id: Uuid::new_v4(),
            name: input.name,
            description: input.description,
            price: input.price,
            category: input.category,
            image_url: input.image_url,
            in_stock: input.in_stock.unwrap_or(true),
            created_at: OffsetDateTime::now_utc(),
        };

        self.products.write().await.insert(product.id, product.clone());
        tracing::info!("products.create: id={}", product.id);
        Ok(product)
    }

    /// All products, oldest first.
    pub async fn list(&self) -> Vec<Product> {
        self.snapshot(|_| true).await
    }

    pub async fn get(&self, id: Uuid) -> Result<Product> {
        self.products
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::not_found(ENTITY, id))
    }

    /// Merge the provided fields into an existing product.
    ///
    /// A replaced `image_url` is not deleted from storage; the previous asset
    /// stays reachable until the client removes it.
    pub async fn update(&self, id: Uuid, input: UpdateProduct) -> Result<Product> {
        let mut products = self.products.write().await;
        let product = products
            .get_mut(&id)
            .ok_or_else(|| Error::not_found(ENTITY, id))?;
        input.validate()?;

        let replaced_image = match (&product.image_url, &input.image_url) {
            (Some(old), Some(new)) => old != new,
            _ => false,
        };
        input.apply_to(product);

        if replaced_image {
            tracing::debug!("products.update: id={} image replaced, previous asset kept", id);
        }
        tracing::info!("products.update: id={}", id);
        Ok(product.clone())
    }

    /// Remove a product and, best effort, its image.
    ///
    /// The record is removed whatever the outcome of the asset cleanup. No lock
    /// is held while storage is contacted.
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let image_url = self
            .products
            .read()
            .await
            .get(&id)
            .ok_or_else(|| Error::not_found(ENTITY, id))?
            .image_url
            .clone();

        if let Some(url) = image_url {
            let cleanup = self.uploads.delete(&url).await;
            tracing::debug!("products.delete: id={} cleanup={:?}", id, cleanup);
        }

        // A concurrent delete may have removed it already; that is still success.
        if self.products.write().await.remove(&id).is_none() {
            tracing::debug!("products.delete: id={} already removed", id);
        }
        tracing::info!("products.delete: id={}", id);
        Ok(())
    }

    /// Products whose category matches, ignoring case.
    pub async fn by_category(&self, category: &str) -> Vec<Product> {
        let wanted = category.to_lowercase();
        self.snapshot(|p| p.category.to_lowercase() == wanted).await
    }

    pub async fn in_stock(&self) -> Vec<Product> {
        self.snapshot(|p| p.in_stock).await
    }

    async fn snapshot<F>(&self, keep: F) -> Vec<Product>
    where
        F: Fn(&Product) -> bool,
    {
        let mut products: Vec<Product> = self
            .products
            .read()
            .await
            .values()
            .filter(|p| keep(*p))
            .cloned()
            .collect();
        products.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        products
    }
}
