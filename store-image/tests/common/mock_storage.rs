use std::sync::Mutex;

use async_trait::async_trait;
use store_image::object_storage::{
    AccessPolicy, ObjectStorage, PutObjectRequest, StorageError, StorageMetadata, StorageResult,
};

/// A `put_object` call as seen by the storage layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedPut {
    pub bucket: String,
    pub key: String,
    pub content: Vec<u8>,
    pub content_type: String,
    pub access_policy: AccessPolicy,
}

/// In-memory object storage that records every write
pub struct MockStorage {
    calls: Mutex<Vec<RecordedPut>>,
    failure: Option<fn() -> StorageError>,
}

impl MockStorage {
    /// Storage that accepts every write
    pub fn succeeding() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            failure: None,
        }
    }

    /// Storage that records the write, then fails with the given error
    pub fn failing(failure: fn() -> StorageError) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            failure: Some(failure),
        }
    }

    pub fn calls(&self) -> Vec<RecordedPut> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ObjectStorage for MockStorage {
    async fn put_object(&self, request: PutObjectRequest<'_>) -> StorageResult<StorageMetadata> {
        let call_number = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(RecordedPut {
                bucket: request.bucket.to_string(),
                key: request.key.to_string(),
                content: request.content,
                content_type: request.content_type.to_string(),
                access_policy: request.access_policy,
            });
            calls.len()
        };

        if let Some(failure) = self.failure {
            return Err(failure());
        }

        Ok(StorageMetadata {
            e_tag: Some(format!("\"etag-{call_number}\"")),
            server_side_encryption: Some("AES256".to_string()),
            ..StorageMetadata::default()
        })
    }
}
