use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use api::state::AppState;
use api::MAX_IMAGE_BYTES;

use crate::routes;

/// Room for multipart framing on top of the largest accepted image, so that
/// oversize payloads are rejected by upload validation rather than the
/// transport limit.
const UPLOAD_BODY_LIMIT: usize = MAX_IMAGE_BYTES + 1024 * 1024;

/// Build the complete Axum router.
pub fn build_router(state: Arc<AppState>) -> Router {
    let mut app = Router::new()
        .route("/health", get(routes::health::health_check))
        .route(
            "/upload/image",
            post(routes::upload::upload_image).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .route(
            "/products",
            get(routes::products::list_products).post(routes::products::create_product),
        )
        .route("/products/in-stock", get(routes::products::list_in_stock))
        .route(
            "/products/{id}",
            get(routes::products::get_product)
                .patch(routes::products::update_product)
                .delete(routes::products::delete_product),
        );

    // Locally stored uploads are served by this process.
    if let Some(dir) = state.local_uploads_dir() {
        tracing::info!("Serving uploads from {}", dir.display());
        app = app.nest_service("/uploads", ServeDir::new(dir));
    }

    app.layer(TraceLayer::new_for_http()).with_state(state)
}
