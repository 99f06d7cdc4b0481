pub mod cache;
pub mod circuit;
pub mod client;
pub mod errors;
pub mod privacy;
pub mod rate_limit;
pub mod transport;
pub mod types;

pub use circuit::CircuitState;
pub use client::{ApiClientConfig, ResilientClient, Transport};
pub use errors::ApiError;
pub use privacy::PrivacyFilter;
pub use transport::HttpTransport;
pub use types::{ApiRequest, ApiResponse};
