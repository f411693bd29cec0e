use async_trait::async_trait;
use thiserror::Error;

use billbook_core::Coordinates;

/// Why the device position could not be obtained.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LocationError {
    #[error("location permission denied")]
    PermissionDenied,

    #[error("location services are not supported")]
    Unsupported,

    #[error("location unavailable: {0}")]
    Unavailable(String),
}

/// Source of the device's current position.
#[async_trait]
pub trait LocationProvider: Send + Sync {
    async fn current_position(&self) -> Result<Coordinates, LocationError>;
}

/// Provider for hosts without any positioning capability.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLocationProvider;

#[async_trait]
impl LocationProvider for NoLocationProvider {
    async fn current_position(&self) -> Result<Coordinates, LocationError> {
        Err(LocationError::Unsupported)
    }
}
