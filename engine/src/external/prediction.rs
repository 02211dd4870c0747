//! Crop prediction backend client

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use shared::{PredictedCrop, PredictionRequest};
use tracing::debug;

use crate::error::{AppError, AppResult};
use crate::external::read_json;

#[async_trait]
pub trait PredictionBackend: Send + Sync {
    /// A missing label in a successful response is `Unknown`, not an error
    async fn predict(&self, request: &PredictionRequest) -> AppResult<PredictedCrop>;
}

/// Response from the prediction API
#[derive(Debug, Deserialize)]
struct PredictionResponse {
    #[serde(default)]
    predicted_crop: Option<String>,
}

/// Client for `POST /predict`
#[derive(Clone)]
pub struct PredictionClient {
    client: Client,
    base_url: String,
}

impl PredictionClient {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl PredictionBackend for PredictionClient {
    async fn predict(&self, request: &PredictionRequest) -> AppResult<PredictedCrop> {
        let url = format!("{}/predict", self.base_url);
        debug!(?request, "Requesting crop prediction");

        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                AppError::PredictionService(format!("Prediction request failed: {}", e))
            })?;

        let body: PredictionResponse =
            read_json(response, "prediction", AppError::PredictionService).await?;

        Ok(PredictedCrop::from_response(body.predicted_crop.as_deref()))
    }
}
