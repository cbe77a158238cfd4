// src/application/ports/output/geolocation_port.rs
use async_trait::async_trait;

use crate::core::platform::container::visitor::GeoLookup;

pub type GeolocationPortResult<T> = Result<T, GeolocationPortError>;

#[derive(Debug, thiserror::Error)]
pub enum GeolocationPortError {
    #[error("Geolocation request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Geolocation service responded with status {0}")]
    Status(u16),
}

/// IP geolocation lookup.
///
/// A lookup that reaches the service but cannot place the address is still `Ok`;
/// check `GeoLookup::is_success`.
#[async_trait]
pub trait GeolocationPort: Send + Sync {
    async fn locate(&self, ip: &str) -> GeolocationPortResult<GeoLookup>;
}
