// rosgate-api: Async Rust clients for the RouterOS control APIs (REST + legacy)

pub mod error;
pub mod legacy;
pub mod rest;
pub mod transport;

pub use error::Error;
pub use legacy::LegacySession;
pub use legacy::client::LEGACY_TLS_PORT;
pub use rest::RestClient;
pub use transport::{DEVICE_TIMEOUT, TransportConfig};
