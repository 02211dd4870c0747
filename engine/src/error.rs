//! Error handling for the field metrics engine
//!
//! Every failure carries a stable code and a user-facing message so the UI
//! layer can surface it without inspecting variants.

use serde::Serialize;
use shared::{CaptureError, CoordinateError};
use thiserror::Error;

use crate::external::location::LocationError;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Input validation errors
    #[error("Invalid polygon: {0}")]
    InvalidPolygon(#[from] CaptureError),

    #[error("Invalid coordinate: {0}")]
    InvalidCoordinate(#[from] CoordinateError),

    // External service errors
    #[error("Geometry service error: {0}")]
    GeometryService(String),

    #[error("Prediction service error: {0}")]
    PredictionService(String),

    #[error("Advice service error: {0}")]
    AdviceService(String),

    #[error("Weather source {source_name} error: {message}")]
    WeatherSource {
        source_name: &'static str,
        message: String,
    },

    #[error("Geocoding lookup failed: {0}")]
    LookupFailed(String),

    #[error("Location unavailable: {0}")]
    Location(#[from] LocationError),

    // Local resources
    #[error("Profile store error: {0}")]
    ProfileStore(String),

    #[error("Configuration error: {0}")]
    Configuration(#[from] config::ConfigError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error description handed to the UI layer
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    /// The user can fix this by changing their input
    pub recoverable: bool,
}

impl AppError {
    pub fn code(&self) -> &'static str {
        match self {
            AppError::InvalidPolygon(_) => "INVALID_POLYGON",
            AppError::InvalidCoordinate(_) => "INVALID_COORDINATE",
            AppError::GeometryService(_) => "GEOMETRY_SERVICE_ERROR",
            AppError::PredictionService(_) => "PREDICTION_SERVICE_ERROR",
            AppError::AdviceService(_) => "ADVICE_SERVICE_ERROR",
            AppError::WeatherSource { .. } => "WEATHER_SOURCE_ERROR",
            AppError::LookupFailed(_) => "LOOKUP_FAILED",
            AppError::Location(_) => "LOCATION_UNAVAILABLE",
            AppError::ProfileStore(_) => "PROFILE_STORE_ERROR",
            AppError::Configuration(_) => "CONFIGURATION_ERROR",
            AppError::Serialization(_) => "SERIALIZATION_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn detail(&self) -> ErrorDetail {
        let (message, recoverable) = match self {
            AppError::InvalidPolygon(CaptureError::TooFewPoints { required, .. }) => (
                format!(
                    "Polygon requires at least {} points to be valid. Clearing points.",
                    required
                ),
                true,
            ),
            AppError::InvalidPolygon(CaptureError::OutOfRange(e)) | AppError::InvalidCoordinate(e) => {
                (e.to_string(), true)
            }
            AppError::InvalidPolygon(CaptureError::NotDrawing) => {
                ("Start drawing before finishing a polygon.".to_string(), true)
            }
            AppError::GeometryService(_) => ("Backend error".to_string(), false),
            AppError::PredictionService(_) => ("Crop prediction failed".to_string(), false),
            AppError::AdviceService(_) => (
                "Error generating advice. Please try again.".to_string(),
                false,
            ),
            AppError::WeatherSource { .. } => {
                ("Weather data is temporarily unavailable".to_string(), false)
            }
            AppError::LookupFailed(_) => ("Search failed. Please try again.".to_string(), true),
            AppError::Location(_) => (
                "Could not auto-detect. Use search or click map.".to_string(),
                true,
            ),
            AppError::ProfileStore(_)
            | AppError::Configuration(_)
            | AppError::Serialization(_)
            | AppError::Internal(_) => ("An internal error occurred".to_string(), false),
        };

        ErrorDetail {
            code: self.code().to_string(),
            message,
            recoverable,
        }
    }
}

/// Result type alias for engine operations
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_polygon_detail() {
        let err: AppError = CaptureError::TooFewPoints {
            required: 3,
            actual: 2,
        }
        .into();
        let detail = err.detail();
        assert_eq!(detail.code, "INVALID_POLYGON");
        assert!(detail.recoverable);
        assert!(detail.message.contains("at least 3 points"));
    }

    #[test]
    fn test_backend_errors_are_generic_to_users() {
        let err = AppError::GeometryService("502 Bad Gateway".into());
        assert_eq!(err.detail().message, "Backend error");
        assert!(!err.detail().recoverable);
        assert!(err.to_string().contains("502"));
    }

    #[test]
    fn test_location_error_conversion() {
        let err: AppError = LocationError::PermissionDenied.into();
        assert_eq!(err.code(), "LOCATION_UNAVAILABLE");
    }
}
