//! Serverless image upload endpoint: base64 image in, public S3 object out

#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    dead_code
)]
#![allow(clippy::module_name_repetitions)]

/// Content sniffing
pub mod content_type;

/// S3 object storage operations
pub mod object_storage;

/// Base64 payload decoding
pub mod payload;

/// HTTP routes
pub mod routes;

/// Server and Lambda runtime startup
pub mod server;

/// Configuration and error types
pub mod types;

/// Upload request pipeline
pub mod upload;
