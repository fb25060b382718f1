//! Product route handlers.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use api::state::AppState;
use api::{CreateProduct, Product, UpdateProduct};

use crate::error::AppError;

#[derive(Debug, Default, Deserialize)]
pub struct ListProductsParams {
    pub category: Option<String>,
}

fn parse_id(id: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(id).map_err(|_| api::Error::validation("invalid id").into())
}

pub async fn list_products(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListProductsParams>,
) -> Json<Vec<Product>> {
    let products = match params.category.as_deref() {
        Some(category) => state.products.by_category(category).await,
        None => state.products.list().await,
    };
    Json(products)
}

pub async fn list_in_stock(State(state): State<Arc<AppState>>) -> Json<Vec<Product>> {
    Json(state.products.in_stock().await)
}

pub async fn get_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Product>, AppError> {
    let product = state.products.get(parse_id(&id)?).await?;
    Ok(Json(product))
}

pub async fn create_product(
    State(state): State<Arc<AppState>>,
    Json(input): Json<CreateProduct>,
) -> Result<(StatusCode, Json<Product>), AppError> {
    let product = state.products.create(input).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn update_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(input): Json<UpdateProduct>,
) -> Result<Json<Product>, AppError> {
    let product = state.products.update(parse_id(&id)?, input).await?;
    Ok(Json(product))
}

pub async fn delete_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.products.delete(parse_id(&id)?).await?;
    Ok(StatusCode::NO_CONTENT)
}
