mod health;
/// Image upload handler
pub mod images;

use axum::{
    routing::{get, post},
    Router,
};

/// Creates the router with all handler routes
///
/// `POST /` serves invocations routed straight to the function (Function URLs,
/// API Gateway proxy resources). Any other `POST` path also stores the image,
/// since API Gateway REST stages prefix the path (`/prod/images`).
pub fn handler() -> Router {
    Router::new()
        .route("/", post(images::store_image))
        .route("/images", post(images::store_image))
        .route("/health", get(health::handler))
        .fallback(post(images::store_image))
}
