//! Error types for object storage operations

use aws_sdk_s3::{
    error::{DisplayErrorContext, ProvideErrorMetadata, SdkError},
    operation::put_object::PutObjectError,
};
use thiserror::Error;

/// Result type for object storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur while writing objects
#[derive(Error, Debug)]
pub enum StorageError {
    /// Target bucket does not exist
    #[error("Bucket not found: {0}")]
    BucketNotFound(String),

    /// Credentials lack permission for the bucket or ACL
    #[error("Access denied: {0}")]
    AccessDenied(String),

    /// Upstream service error (5xx from S3, timeouts, network failures)
    #[error("Upstream service error: {0}")]
    UpstreamError(String),

    /// Any other S3 service error
    #[error("S3 service error: {0}")]
    S3Error(String),

    /// Invalid input provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<SdkError<PutObjectError>> for StorageError {
    fn from(error: SdkError<PutObjectError>) -> Self {
        let message = DisplayErrorContext(&error).to_string();

        match &error {
            SdkError::ServiceError(service_err) => {
                let status = service_err.raw().status().as_u16();
                match service_err.err().code() {
                    Some("NoSuchBucket") => Self::BucketNotFound(message),
                    Some("AccessDenied" | "AllAccessDisabled" | "AccessControlListNotSupported") => {
                        Self::AccessDenied(message)
                    }
                    _ if status == 403 => Self::AccessDenied(message),
                    _ if status >= 500 => Self::UpstreamError(message),
                    _ => Self::S3Error(message),
                }
            }
            SdkError::TimeoutError(_) | SdkError::DispatchFailure(_) | SdkError::ResponseError(_) => {
                Self::UpstreamError(message)
            }
            _ => Self::S3Error(message),
        }
    }
}
