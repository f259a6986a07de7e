// licmon-api: Async Rust client for the license server REST API

pub mod auth;
pub mod client;
pub mod endpoint;
pub mod error;
pub mod features;
pub mod instance;
pub mod models;
pub mod transport;

pub use auth::Credentials;
pub use client::LicenseClient;
pub use endpoint::{CLOUD_LICENSE_SERVICE_URL, Endpoint};
pub use error::Error;
pub use models::{Feature, FeatureClass, FeatureSnapshot, FeatureUsage};
pub use transport::{RetryPolicy, TlsMode, TransportConfig};
