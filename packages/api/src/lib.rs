//! Core of the product catalog backend: asset storage, uploads and the
//! in-memory product registry.

pub mod config;
pub mod error;
pub mod products;
pub mod state;
pub mod storage;
pub mod types;
pub mod uploads;


#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use error::{Error, Result};
pub use products::ProductRegistry;
pub use types::{CreateProduct, Product, UpdateProduct, UploadedFile, MAX_IMAGE_BYTES};
pub use uploads::{AssetCleanup, Uploads};
