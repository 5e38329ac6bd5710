//! S3-based object storage operations
mod error;

use std::{fmt, str::FromStr, sync::Arc};

use async_trait::async_trait;
use aws_sdk_s3::{
    operation::put_object::PutObjectOutput, primitives::ByteStream, types::ObjectCannedAcl,
    Client as S3Client,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error};

pub use error::{StorageError, StorageResult};

/// Access control applied to a newly written object
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AccessPolicy {
    /// Anonymous read access through the object URL
    #[default]
    PublicRead,
    /// Owner-only access
    Private,
    /// No ACL header; the bucket's own settings apply
    BucketDefault,
}

impl AccessPolicy {
    /// Canned ACL sent with the upload, if any
    #[must_use]
    pub const fn canned_acl(self) -> Option<ObjectCannedAcl> {
        match self {
            Self::PublicRead => Some(ObjectCannedAcl::PublicRead),
            Self::Private => Some(ObjectCannedAcl::Private),
            Self::BucketDefault => None,
        }
    }

    const fn as_str(self) -> &'static str {
        match self {
            Self::PublicRead => "public-read",
            Self::Private => "private",
            Self::BucketDefault => "bucket-default",
        }
    }
}

impl fmt::Display for AccessPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown access policy name
#[derive(Error, Debug, PartialEq, Eq)]
#[error("Invalid access policy: {0} (expected public-read, private or bucket-default)")]
pub struct ParseAccessPolicyError(String);

impl FromStr for AccessPolicy {
    type Err = ParseAccessPolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "public-read" => Ok(Self::PublicRead),
            "private" => Ok(Self::Private),
            "bucket-default" => Ok(Self::BucketDefault),
            other => Err(ParseAccessPolicyError(other.to_string())),
        }
    }
}

/// A single object write
#[derive(Debug)]
pub struct PutObjectRequest<'a> {
    /// Destination bucket
    pub bucket: &'a str,
    /// Object key within the bucket
    pub key: &'a str,
    /// Object body, may be empty
    pub content: Vec<u8>,
    /// Value of the `Content-Type` header stored with the object
    pub content_type: &'a str,
    /// ACL applied to the object
    pub access_policy: AccessPolicy,
}

/// Metadata returned by the storage service for a completed write
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StorageMetadata {
    /// Entity tag of the stored object
    #[serde(rename = "ETag", skip_serializing_if = "Option::is_none")]
    pub e_tag: Option<String>,
    /// Version id, when bucket versioning is enabled
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version_id: Option<String>,
    /// Lifecycle expiration rule matching the object
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration: Option<String>,
    /// Server-side encryption algorithm applied
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_side_encryption: Option<String>,
    /// KMS key used for encryption, if any
    #[serde(rename = "SSEKMSKeyId", skip_serializing_if = "Option::is_none")]
    pub sse_kms_key_id: Option<String>,
    /// Whether an S3 Bucket Key was used with KMS
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bucket_key_enabled: Option<bool>,
    /// Base64 CRC32 checksum
    #[serde(rename = "ChecksumCRC32", skip_serializing_if = "Option::is_none")]
    pub checksum_crc32: Option<String>,
    /// Base64 CRC32C checksum
    #[serde(rename = "ChecksumCRC32C", skip_serializing_if = "Option::is_none")]
    pub checksum_crc32c: Option<String>,
    /// Base64 SHA-1 checksum
    #[serde(rename = "ChecksumSHA1", skip_serializing_if = "Option::is_none")]
    pub checksum_sha1: Option<String>,
    /// Base64 SHA-256 checksum
    #[serde(rename = "ChecksumSHA256", skip_serializing_if = "Option::is_none")]
    pub checksum_sha256: Option<String>,
    /// Set when the requester was charged
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_charged: Option<String>,
}

impl From<PutObjectOutput> for StorageMetadata {
    fn from(output: PutObjectOutput) -> Self {
        Self {
            e_tag: output.e_tag().map(ToString::to_string),
            version_id: output.version_id().map(ToString::to_string),
            expiration: output.expiration().map(ToString::to_string),
            server_side_encryption: output
                .server_side_encryption()
                .map(|sse| sse.as_str().to_string()),
            sse_kms_key_id: output.ssekms_key_id().map(ToString::to_string),
            bucket_key_enabled: output.bucket_key_enabled(),
            checksum_crc32: output.checksum_crc32().map(ToString::to_string),
            checksum_crc32c: output.checksum_crc32_c().map(ToString::to_string),
            checksum_sha1: output.checksum_sha1().map(ToString::to_string),
            checksum_sha256: output.checksum_sha256().map(ToString::to_string),
            request_charged: output.request_charged().map(|rc| rc.as_str().to_string()),
        }
    }
}

/// Write access to a bucket-style object store
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Creates or overwrites one object
    ///
    /// # Errors
    ///
    /// Returns a `StorageError` when the write is rejected or the service is unreachable
    async fn put_object(&self, request: PutObjectRequest<'_>) -> StorageResult<StorageMetadata>;
}

/// Object storage client backed by S3
pub struct S3ObjectStorage {
    s3_client: Arc<S3Client>,
}

impl S3ObjectStorage {
    /// Creates a new S3 object storage client
    ///
    /// # Arguments
    ///
    /// * `s3_client` - Pre-configured S3 client
    #[must_use]
    pub const fn new(s3_client: Arc<S3Client>) -> Self {
        Self { s3_client }
    }
}

#[async_trait]
impl ObjectStorage for S3ObjectStorage {
    /// Uploads the object with `PutObject`
    ///
    /// # Errors
    ///
    /// Returns `StorageError::InvalidInput` for an empty bucket or key
    /// Returns `StorageError::BucketNotFound` if the bucket does not exist
    /// Returns `StorageError::AccessDenied` for authorization failures
    /// Returns `StorageError::UpstreamError` for 5xx, timeout and network errors
    /// Returns `StorageError::S3Error` for any other service error
    async fn put_object(&self, request: PutObjectRequest<'_>) -> StorageResult<StorageMetadata> {
        if request.bucket.is_empty() {
            return Err(StorageError::InvalidInput("bucket must not be empty".to_string()));
        }
        if request.key.is_empty() {
            return Err(StorageError::InvalidInput("key must not be empty".to_string()));
        }

        debug!(
            bucket = request.bucket,
            key = request.key,
            content_type = request.content_type,
            content_length = request.content.len(),
            acl = %request.access_policy,
            "Putting object"
        );

        let output = self
            .s3_client
            .put_object()
            .bucket(request.bucket)
            .key(request.key)
            .content_type(request.content_type)
            .set_acl(request.access_policy.canned_acl())
            .body(ByteStream::from(request.content))
            .send()
            .await
            .map_err(|e| {
                let err = StorageError::from(e);
                error!(
                    "Failed to put object {}/{}: {}",
                    request.bucket, request.key, err
                );
                err
            })?;

        Ok(StorageMetadata::from(output))
    }
}
