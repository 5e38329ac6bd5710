//! Image upload pipeline: request body in, stored object and public link out

use std::sync::Arc;

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use mime::Mime;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};
use validator::Validate;

use crate::{
    content_type,
    object_storage::{AccessPolicy, ObjectStorage, PutObjectRequest, StorageMetadata},
    payload::{self, DecodeError},
    types::AppError,
};

/// Inbound upload request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UploadRequest {
    /// Base64-encoded image bytes
    pub image: String,
    /// Object name without extension
    #[validate(length(min = 1))]
    pub image_name: String,
    /// Destination bucket
    #[validate(length(min = 1))]
    pub bucket_name: String,
}

/// Decoded payload with its sniffed media type
#[derive(Debug)]
pub struct DecodedImage {
    /// Raw image bytes
    pub bytes: Vec<u8>,
    /// Media type sniffed from the leading bytes
    pub content_type: Mime,
    /// MIME subtype, used as the key suffix
    pub extension: String,
}

impl DecodedImage {
    /// Decodes and classifies a base64 payload
    ///
    /// # Errors
    ///
    /// Returns `DecodeError` if the payload is not valid base64
    pub fn from_base64(encoded: &str) -> Result<Self, DecodeError> {
        let bytes = payload::decode(encoded)?;
        let (content_type, extension) = content_type::classify(&bytes);

        Ok(Self {
            bytes,
            content_type,
            extension,
        })
    }
}

/// Response body of a successful upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResult {
    /// Metadata returned by the storage service
    pub request_output: StorageMetadata,
    /// Public URL of the object
    pub link: String,
}

/// Storage key for an image: `{image_name}.{extension}`
#[must_use]
pub fn object_key(image_name: &str, extension: &str) -> String {
    format!("{image_name}.{extension}")
}

/// Virtual-hosted-style URL of a public object
///
/// Built from the request and configuration only; it resolves when the bucket
/// lives in `region` and the object is publicly readable.
#[must_use]
pub fn public_url(bucket: &str, region: &str, key: &str) -> String {
    format!("https://{bucket}.s3.{region}.amazonaws.com/{key}")
}

/// Handles upload requests against an object store
pub struct ImageUploader {
    storage: Arc<dyn ObjectStorage>,
    region: String,
    access_policy: AccessPolicy,
}

impl ImageUploader {
    /// Creates a new uploader
    ///
    /// # Arguments
    ///
    /// * `storage` - Object store receiving the images
    /// * `region` - Region substituted into public links
    /// * `access_policy` - ACL applied to every uploaded object
    #[must_use]
    pub fn new(
        storage: Arc<dyn ObjectStorage>,
        region: impl Into<String>,
        access_policy: AccessPolicy,
    ) -> Self {
        Self {
            storage,
            region: region.into(),
            access_policy,
        }
    }

    /// Runs the whole pipeline and renders the HTTP response
    ///
    /// Success is always `201 Created` with the serialized `UploadResult`;
    /// every failure is rendered as an `AppError` envelope.
    pub async fn handle(&self, raw_body: &[u8]) -> Response {
        match self.upload(raw_body).await.and_then(|result| created(&result)) {
            Ok(response) => response,
            Err(err) => err.into_response(),
        }
    }

    /// Parses, decodes, classifies and stores the image from `raw_body`
    ///
    /// # Errors
    ///
    /// - `invalid_json` if the body is not an `UploadRequest`
    /// - `validation_error` if `imageName` or `bucketName` is empty
    /// - `invalid_image` if `image` is not valid base64; storage is not called
    /// - a storage error code if the upload fails
    #[instrument(skip_all, fields(bucket, key))]
    pub async fn upload(&self, raw_body: &[u8]) -> Result<UploadResult, AppError> {
        let request: UploadRequest = serde_json::from_slice(raw_body).map_err(|e| {
            warn!("Rejected upload request body: {e}");
            AppError::invalid_json()
        })?;
        request.validate().map_err(|e| {
            warn!("Upload request failed validation: {e}");
            AppError::validation()
        })?;

        let image = DecodedImage::from_base64(&request.image)?;
        let key = object_key(&request.image_name, &image.extension);

        tracing::Span::current()
            .record("bucket", request.bucket_name.as_str())
            .record("key", key.as_str());
        debug!(
            content_type = %image.content_type,
            size = image.bytes.len(),
            "Decoded image"
        );

        let content_type = image.content_type.to_string();
        let metadata = self
            .storage
            .put_object(PutObjectRequest {
                bucket: &request.bucket_name,
                key: &key,
                content: image.bytes,
                content_type: &content_type,
                access_policy: self.access_policy,
            })
            .await?;

        info!("Stored image {}/{}", request.bucket_name, key);

        Ok(UploadResult {
            request_output: metadata,
            link: public_url(&request.bucket_name, &self.region, &key),
        })
    }
}

fn created(result: &UploadResult) -> Result<Response, AppError> {
    let body = serde_json::to_string(result)?;

    Ok((
        StatusCode::CREATED,
        [(header::CONTENT_TYPE, mime::APPLICATION_JSON.as_ref())],
        body,
    )
        .into_response())
}
