use std::sync::Arc;

use axum::{body::Bytes, response::Response, Extension};

use crate::upload::ImageUploader;

/// Stores a base64-encoded image and returns its metadata and public link
///
/// The body is read as-is; no `Content-Type` header is required. Responds
/// `201 Created` with `{ requestOutput, link }` or an error envelope.
pub async fn store_image(
    Extension(uploader): Extension<Arc<ImageUploader>>,
    body: Bytes,
) -> Response {
    uploader.handle(&body).await
}
