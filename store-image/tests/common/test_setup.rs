use std::sync::Arc;

use axum::{body::Body, http::Request, response::Response, Router};
use store_image::{object_storage::AccessPolicy, server, upload::ImageUploader};
use tower::ServiceExt;

use super::MockStorage;

pub const TEST_REGION: &str = "us-east-1";

/// Setup test environment variables with all the required configuration
pub fn setup_test_env() {
    // Initialize tracing for tests
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init()
        .ok();
}

/// Router wired to a recording storage backend
pub struct TestContext {
    pub router: Router,
    pub storage: Arc<MockStorage>,
}

impl TestContext {
    pub fn new(storage: MockStorage) -> Self {
        setup_test_env();

        let storage = Arc::new(storage);
        let uploader = Arc::new(ImageUploader::new(
            storage.clone(),
            TEST_REGION,
            AccessPolicy::PublicRead,
        ));

        Self {
            router: server::router(uploader),
            storage,
        }
    }

    pub async fn send_post_request(
        &self,
        route: &str,
        payload: serde_json::Value,
    ) -> Result<Response, Box<dyn std::error::Error>> {
        let request = Request::builder()
            .uri(route)
            .method("POST")
            .header("Content-Type", "application/json")
            .body(Body::from(payload.to_string()))?;

        let response = self.router.clone().oneshot(request).await?;
        Ok(response)
    }

    /// Sends the body untouched and without a `Content-Type` header
    pub async fn send_raw_post_request(
        &self,
        route: &str,
        body: impl Into<Body>,
    ) -> Result<Response, Box<dyn std::error::Error>> {
        let request = Request::builder()
            .uri(route)
            .method("POST")
            .body(body.into())?;

        let response = self.router.clone().oneshot(request).await?;
        Ok(response)
    }

    pub async fn send_get_request(
        &self,
        route: &str,
    ) -> Result<Response, Box<dyn std::error::Error>> {
        let request = Request::builder()
            .uri(route)
            .method("GET")
            .body(Body::empty())?;
        let response = self.router.clone().oneshot(request).await?;
        Ok(response)
    }
}
