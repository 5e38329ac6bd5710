/// Deployment stage and AWS settings
pub mod environment;
mod error;

pub use environment::{AwsSettings, ConfigError, Environment, ResolvedAws};
pub use error::{ApiErrorResponse, AppError};
