//! Universal error handling for the API

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::{object_storage::StorageError, payload::DecodeError, types::ConfigError};

/// API error response envelope
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorResponse {
    /// Whether the client should retry the request
    pub allow_retry: bool,
    /// Error details
    error: ErrorBody,
}

/// Error body containing code and message
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    /// Machine-readable error code
    pub code: &'static str,
    /// Human-readable error message
    pub message: &'static str,
}

/// Application error type that wraps the API error response
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    inner: ApiErrorResponse,
}

impl AppError {
    /// Create a new application error
    #[must_use]
    pub const fn new(
        status: StatusCode,
        code: &'static str,
        msg: &'static str,
        retry: bool,
    ) -> Self {
        Self {
            status,
            inner: ApiErrorResponse {
                allow_retry: retry,
                error: ErrorBody { code, message: msg },
            },
        }
    }

    /// Request body is not a valid upload request
    #[must_use]
    pub const fn invalid_json() -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            "invalid_json",
            "Invalid JSON payload",
            false,
        )
    }

    /// Request fields failed validation
    #[must_use]
    pub const fn validation() -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            "validation_error",
            "imageName and bucketName must not be empty",
            false,
        )
    }

    /// HTTP status of the response
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Machine-readable error code
    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.inner.error.code
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the error based on status code
        match self.status.as_u16() {
            400..=499 => tracing::warn!(
                "Client error: {} - {}",
                self.inner.error.code,
                self.inner.error.message
            ),
            500..=599 => tracing::error!(
                "Server error: {} - {}",
                self.inner.error.code,
                self.inner.error.message
            ),
            _ => {}
        }

        (self.status, Json(self.inner)).into_response()
    }
}

impl From<DecodeError> for AppError {
    fn from(err: DecodeError) -> Self {
        tracing::warn!("Image decode error: {err}");
        Self::new(
            StatusCode::BAD_REQUEST,
            "invalid_image",
            "Image is not valid base64",
            false,
        )
    }
}

/// Convert storage errors to application errors
impl From<StorageError> for AppError {
    #[allow(clippy::cognitive_complexity)]
    fn from(err: StorageError) -> Self {
        use StorageError::{AccessDenied, BucketNotFound, InvalidInput, S3Error, UpstreamError};

        match &err {
            BucketNotFound(msg) => {
                tracing::error!("S3 bucket not found: {msg}");
                Self::new(
                    StatusCode::BAD_GATEWAY,
                    "bucket_not_found",
                    "Destination bucket does not exist",
                    false,
                )
            }
            AccessDenied(msg) => {
                tracing::error!("S3 access denied: {msg}");
                Self::new(
                    StatusCode::BAD_GATEWAY,
                    "access_denied",
                    "Not allowed to write to the destination bucket",
                    false,
                )
            }
            UpstreamError(msg) => {
                tracing::error!("S3 upstream error: {msg}");
                Self::new(
                    StatusCode::SERVICE_UNAVAILABLE,
                    "upstream_error",
                    "S3 service temporarily unavailable",
                    true,
                )
            }
            S3Error(msg) => {
                tracing::error!("S3 error: {msg}");
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "storage_error",
                    "Upload to storage failed",
                    true,
                )
            }
            InvalidInput(msg) => {
                tracing::warn!("Invalid input: {msg}");
                Self::new(
                    StatusCode::BAD_REQUEST,
                    "invalid_input",
                    "Invalid input provided",
                    false,
                )
            }
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        tracing::error!("Configuration error: {err}");
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "config_error",
            "Internal server error",
            false,
        )
    }
}

/// Response body could not be serialized
impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        tracing::error!("Serialization error: {err}");
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "serialization_error",
            "Internal server error",
            false,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_error_mapping() {
        let cases = [
            (
                StorageError::BucketNotFound(String::new()),
                StatusCode::BAD_GATEWAY,
                "bucket_not_found",
            ),
            (
                StorageError::AccessDenied(String::new()),
                StatusCode::BAD_GATEWAY,
                "access_denied",
            ),
            (
                StorageError::UpstreamError(String::new()),
                StatusCode::SERVICE_UNAVAILABLE,
                "upstream_error",
            ),
            (
                StorageError::S3Error(String::new()),
                StatusCode::INTERNAL_SERVER_ERROR,
                "storage_error",
            ),
            (
                StorageError::InvalidInput(String::new()),
                StatusCode::BAD_REQUEST,
                "invalid_input",
            ),
        ];

        for (err, status, code) in cases {
            let app_error = AppError::from(err);
            assert_eq!(app_error.status(), status);
            assert_eq!(app_error.code(), code);
        }
    }

    #[test]
    fn test_config_error_mapping() {
        let app_error = AppError::from(ConfigError::MissingRegion);
        assert_eq!(app_error.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(app_error.code(), "config_error");
    }

    #[test]
    fn test_envelope_shape() {
        let app_error = AppError::from(StorageError::UpstreamError("boom".to_string()));
        let json = serde_json::to_value(&app_error.inner).unwrap();
        assert_eq!(json["allowRetry"], true);
        assert_eq!(json["error"]["code"], "upstream_error");
        assert_eq!(json["error"]["message"], "S3 service temporarily unavailable");
    }
}
