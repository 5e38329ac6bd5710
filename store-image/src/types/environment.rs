//! Environment configuration for different deployment stages

use std::env;
use std::time::Duration;

use aws_config::{
    retry::RetryConfig, timeout::TimeoutConfig, BehaviorVersion, Region, SdkConfig,
};
use aws_credential_types::provider::ProvideCredentials;
use thiserror::Error;
use tracing::{info, Level};

use crate::object_storage::{AccessPolicy, ParseAccessPolicyError};

/// Set by the Lambda execution environment
pub const LAMBDA_RUNTIME_API: &str = "AWS_LAMBDA_RUNTIME_API";

const LOCALSTACK_ENDPOINT: &str = "http://localhost:4566";
const OPERATION_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors raised while resolving process configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// `APP_ENV` holds an unknown stage
    #[error("Invalid environment: {0}")]
    InvalidEnvironment(String),

    /// No region in the environment, profile or instance metadata
    #[error("Error retrieving AWS region: no region configured")]
    MissingRegion,

    /// Credentials provider missing or failing
    #[error("Error retrieving AWS credentials: {0}")]
    Credentials(String),

    /// `OBJECT_ACL` holds an unknown policy
    #[error(transparent)]
    InvalidAccessPolicy(#[from] ParseAccessPolicyError),
}

/// Application environment configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    /// Production environment
    Production,
    /// Staging environment
    Staging,
    /// Development environment (uses `LocalStack`)
    Development {
        /// Optional override for the `LocalStack` endpoint
        endpoint_override: Option<String>,
    },
}

impl Environment {
    /// Creates an Environment from the `APP_ENV` environment variable
    ///
    /// An unset `APP_ENV` means `production` inside Lambda and `development`
    /// everywhere else.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvironment` if `APP_ENV` contains an invalid value
    pub fn from_env() -> Result<Self, ConfigError> {
        let env = non_empty_var("APP_ENV")
            .unwrap_or_else(|| {
                if running_on_lambda() {
                    "production"
                } else {
                    "development"
                }
                .to_string()
            })
            .to_lowercase();

        match env.as_str() {
            "production" => Ok(Self::Production),
            "staging" => Ok(Self::Staging),
            "development" => Ok(Self::Development {
                endpoint_override: non_empty_var("AWS_ENDPOINT_URL"),
            }),
            _ => Err(ConfigError::InvalidEnvironment(env)),
        }
    }

    /// Returns the endpoint URL to use for AWS services
    #[must_use]
    pub fn override_aws_endpoint_url(&self) -> Option<&str> {
        match self {
            Self::Production | Self::Staging => None,
            Self::Development { endpoint_override } => {
                Some(endpoint_override.as_deref().unwrap_or(LOCALSTACK_ENDPOINT))
            }
        }
    }

    /// Whether S3 requests use path-style addressing
    #[must_use]
    pub const fn force_path_style(&self) -> bool {
        matches!(self, Self::Development { .. })
    }

    /// Whether logs are emitted as JSON
    #[must_use]
    pub const fn json_logs(&self) -> bool {
        matches!(self, Self::Production | Self::Staging)
    }

    /// Default log level, overridable with `TRACING_LEVEL`
    #[must_use]
    pub fn tracing_level(&self) -> Level {
        env::var("TRACING_LEVEL")
            .ok()
            .and_then(|val| val.parse::<Level>().ok())
            .unwrap_or(match self {
                Self::Production | Self::Staging => Level::INFO,
                Self::Development { .. } => Level::DEBUG,
            })
    }
}

/// AWS settings read from the process environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AwsSettings {
    /// Region from `AWS_REGION` or `AWS_DEFAULT_REGION`
    pub region: Option<String>,
    /// Shared config profile from `AWS_PROFILE`
    pub profile: Option<String>,
    /// ACL applied to uploaded objects, from `OBJECT_ACL`
    pub access_policy: AccessPolicy,
}

impl AwsSettings {
    /// Reads the AWS settings from the environment
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidAccessPolicy` if `OBJECT_ACL` is not a known policy
    pub fn from_env() -> Result<Self, ConfigError> {
        let access_policy = match non_empty_var("OBJECT_ACL") {
            Some(value) => value.parse()?,
            None => AccessPolicy::default(),
        };

        Ok(Self {
            region: non_empty_var("AWS_REGION").or_else(|| non_empty_var("AWS_DEFAULT_REGION")),
            profile: non_empty_var("AWS_PROFILE"),
            access_policy,
        })
    }

    /// Loads the shared SDK configuration and checks that it is usable
    ///
    /// Uploads are attempted once; the SDK retry policy is capped at a single attempt.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingRegion` if no region can be resolved
    /// Returns `ConfigError::Credentials` if credentials cannot be loaded
    pub async fn resolve(&self, environment: &Environment) -> Result<ResolvedAws, ConfigError> {
        let timeout_config = TimeoutConfig::builder()
            .operation_timeout(OPERATION_TIMEOUT)
            .build();

        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .retry_config(RetryConfig::standard().with_max_attempts(1))
            .timeout_config(timeout_config);

        if let Some(region) = &self.region {
            loader = loader.region(Region::new(region.clone()));
        }
        if let Some(profile) = &self.profile {
            loader = loader.profile_name(profile);
        }
        if let Some(endpoint_url) = environment.override_aws_endpoint_url() {
            loader = loader.endpoint_url(endpoint_url);
        }

        let sdk_config = loader.load().await;

        let region = sdk_config
            .region()
            .map(ToString::to_string)
            .ok_or(ConfigError::MissingRegion)?;

        let provider = sdk_config.credentials_provider().ok_or_else(|| {
            ConfigError::Credentials("no credentials provider configured".to_string())
        })?;
        provider
            .provide_credentials()
            .await
            .map_err(|e| ConfigError::Credentials(e.to_string()))?;

        info!(
            region = %region,
            profile = self.profile.as_deref().unwrap_or("default"),
            access_policy = %self.access_policy,
            "Resolved AWS configuration"
        );

        Ok(ResolvedAws {
            sdk_config,
            region,
            force_path_style: environment.force_path_style(),
        })
    }
}

/// Resolved, read-only AWS configuration shared by every request
#[derive(Debug, Clone)]
pub struct ResolvedAws {
    sdk_config: SdkConfig,
    region: String,
    force_path_style: bool,
}

impl ResolvedAws {
    /// Region used for uploads and public links
    #[must_use]
    pub fn region(&self) -> &str {
        &self.region
    }

    /// AWS S3 service configuration
    #[must_use]
    pub fn s3_client_config(&self) -> aws_sdk_s3::Config {
        let s3_config: aws_sdk_s3::Config = (&self.sdk_config).into();
        let mut builder = s3_config.to_builder();

        // LocalStack only serves path-style bucket addressing
        if self.force_path_style {
            builder.set_force_path_style(Some(true));
        }

        builder.build()
    }
}

/// Whether the process runs inside the Lambda execution environment
#[must_use]
pub fn running_on_lambda() -> bool {
    env::var_os(LAMBDA_RUNTIME_API).is_some()
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|val| val.trim().to_string())
        .filter(|val| !val.is_empty())
}
