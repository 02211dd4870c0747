//! Crop prediction labels

use serde::{Deserialize, Serialize};

pub const CALCULATING_LABEL: &str = "Calculating...";
pub const ERROR_LABEL: &str = "Error";
pub const UNKNOWN_LABEL: &str = "Unknown";

/// Outcome of the crop prediction stage as shown to the farmer.
///
/// `Calculating` and `Error` are sentinel labels that report stage status
/// instead of a real prediction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PredictedCrop {
    Calculating,
    Error,
    Unknown,
    Crop(String),
}

impl PredictedCrop {
    /// Label from a prediction response; a missing or blank label is `Unknown`.
    pub fn from_response(label: Option<&str>) -> Self {
        match label.map(str::trim) {
            Some(l) if !l.is_empty() => PredictedCrop::from(l.to_string()),
            _ => PredictedCrop::Unknown,
        }
    }

    /// A sentinel signalling an in-progress or failed stage
    pub fn is_sentinel(&self) -> bool {
        matches!(self, PredictedCrop::Calculating | PredictedCrop::Error)
    }

    pub fn as_str(&self) -> &str {
        match self {
            PredictedCrop::Calculating => CALCULATING_LABEL,
            PredictedCrop::Error => ERROR_LABEL,
            PredictedCrop::Unknown => UNKNOWN_LABEL,
            PredictedCrop::Crop(name) => name,
        }
    }
}

impl From<String> for PredictedCrop {
    fn from(label: String) -> Self {
        match label.as_str() {
            CALCULATING_LABEL => PredictedCrop::Calculating,
            ERROR_LABEL => PredictedCrop::Error,
            UNKNOWN_LABEL | "" => PredictedCrop::Unknown,
            _ => PredictedCrop::Crop(label),
        }
    }
}

impl From<PredictedCrop> for String {
    fn from(crop: PredictedCrop) -> Self {
        match crop {
            PredictedCrop::Crop(name) => name,
            other => other.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for PredictedCrop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_parsing() {
        assert_eq!(PredictedCrop::from("Maize".to_string()), PredictedCrop::Crop("Maize".into()));
        assert_eq!(PredictedCrop::from("Error".to_string()), PredictedCrop::Error);
        assert_eq!(
            PredictedCrop::from("Calculating...".to_string()),
            PredictedCrop::Calculating
        );
        assert_eq!(PredictedCrop::from_response(None), PredictedCrop::Unknown);
        assert_eq!(PredictedCrop::from_response(Some("  ")), PredictedCrop::Unknown);
        assert_eq!(
            PredictedCrop::from_response(Some("Sweet potato")),
            PredictedCrop::Crop("Sweet potato".into())
        );
    }

    #[test]
    fn test_sentinels() {
        assert!(PredictedCrop::Calculating.is_sentinel());
        assert!(PredictedCrop::Error.is_sentinel());
        assert!(!PredictedCrop::Unknown.is_sentinel());
        assert!(!PredictedCrop::Crop("Rice".into()).is_sentinel());
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let json = serde_json::to_string(&PredictedCrop::Crop("Yam".into())).unwrap();
        assert_eq!(json, r#""Yam""#);
        let back: PredictedCrop = serde_json::from_str(r#""Error""#).unwrap();
        assert_eq!(back, PredictedCrop::Error);
    }
}
