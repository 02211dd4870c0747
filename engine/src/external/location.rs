//! Device geolocation seam

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shared::Coordinate;
use thiserror::Error;
use tokio::sync::mpsc;

/// Options forwarded with every position request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionOptions {
    pub high_accuracy: bool,
    /// Give up on a fix after this many milliseconds; 0 waits indefinitely
    pub timeout_ms: u64,
    /// Accept a cached fix no older than this
    pub max_cached_age_ms: u64,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LocationError {
    #[error("Location permission denied")]
    PermissionDenied,

    #[error("Position unavailable: {0}")]
    PositionUnavailable(String),

    #[error("Timed out waiting for a position fix")]
    Timeout,

    #[error("Location services are not supported on this device")]
    Unsupported,
}

pub type WatchId = u64;

/// A live position subscription. Updates stop once the id is cleared.
#[derive(Debug)]
pub struct PositionWatch {
    pub id: WatchId,
    pub updates: mpsc::UnboundedReceiver<Result<Coordinate, LocationError>>,
}

/// Device position provider (browser geolocation, GPS daemon, ...)
#[async_trait]
pub trait LocationSource: Send + Sync {
    fn is_supported(&self) -> bool;

    fn watch_position(&self, options: PositionOptions) -> Result<PositionWatch, LocationError>;

    fn clear_watch(&self, id: WatchId);

    async fn current_position(&self, options: PositionOptions)
        -> Result<Coordinate, LocationError>;
}

/// Source for devices without location capability
#[derive(Debug, Clone, Copy, Default)]
pub struct UnsupportedLocation;

#[async_trait]
impl LocationSource for UnsupportedLocation {
    fn is_supported(&self) -> bool {
        false
    }

    fn watch_position(&self, _options: PositionOptions) -> Result<PositionWatch, LocationError> {
        Err(LocationError::Unsupported)
    }

    fn clear_watch(&self, _id: WatchId) {}

    async fn current_position(
        &self,
        _options: PositionOptions,
    ) -> Result<Coordinate, LocationError> {
        Err(LocationError::Unsupported)
    }
}
