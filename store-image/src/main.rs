use std::sync::Arc;

use aws_sdk_s3::Client as S3Client;
use store_image::{
    object_storage::S3ObjectStorage,
    server,
    types::{AwsSettings, Environment},
    upload::ImageUploader,
};
use tracing_subscriber::{filter::LevelFilter, fmt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let environment = Environment::from_env()?;

    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(environment.tracing_level()).into())
        .from_env_lossy();

    // JSON for staging/production log ingestion, regular format for development
    if environment.json_logs() {
        fmt().json().with_env_filter(filter).init();
    } else {
        fmt().with_env_filter(filter).init();
    }

    let settings = AwsSettings::from_env()?;
    let aws = settings.resolve(&environment).await.inspect_err(|e| {
        tracing::error!("Failed to resolve AWS configuration: {e}");
    })?;

    let s3_client = Arc::new(S3Client::from_conf(aws.s3_client_config()));
    let uploader = Arc::new(ImageUploader::new(
        Arc::new(S3ObjectStorage::new(s3_client)),
        aws.region(),
        settings.access_policy,
    ));

    server::start(uploader).await
}
