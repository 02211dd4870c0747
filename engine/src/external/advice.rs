//! Advice generation backend client

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use shared::GeometryResult;
use tracing::debug;

use crate::error::{AppError, AppResult};
use crate::external::read_json;

/// Instruction sent with every advice request
pub const ADVICE_PROMPT: &str = "Provide smart, actionable farming advice for this field, \
focusing on optimal crop choice and immediate steps for soil and water management.";

#[async_trait]
pub trait AdviceBackend: Send + Sync {
    /// Returns the advice text; `None` when the response carried none
    async fn advise(&self, request: &AdviceRequest) -> AppResult<Option<String>>;
}

/// Body of `POST /chat`
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AdviceRequest {
    pub message: String,
    pub info: AdviceContext,
}

/// The full geometry result plus the predicted crop label.
/// The label always comes from the prediction stage, never from geometry extras.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AdviceContext {
    #[serde(flatten)]
    pub geometry: GeometryResult,
    pub predicted_crop: String,
}

impl AdviceRequest {
    pub fn new(geometry: &GeometryResult, predicted_crop: &str) -> Self {
        let mut geometry = geometry.clone();
        geometry.extra.remove("predicted_crop");

        Self {
            message: ADVICE_PROMPT.to_string(),
            info: AdviceContext {
                geometry,
                predicted_crop: predicted_crop.to_string(),
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct AdviceResponse {
    #[serde(default)]
    response: Option<String>,
}

/// Client for `POST /chat`
#[derive(Clone)]
pub struct AdviceClient {
    client: Client,
    base_url: String,
}

impl AdviceClient {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl AdviceBackend for AdviceClient {
    async fn advise(&self, request: &AdviceRequest) -> AppResult<Option<String>> {
        let url = format!("{}/chat", self.base_url);
        debug!(crop = %request.info.predicted_crop, "Requesting field advice");

        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| AppError::AdviceService(format!("Advice request failed: {}", e)))?;

        let body: AdviceResponse = read_json(response, "advice", AppError::AdviceService).await?;

        Ok(body.response.filter(|text| !text.trim().is_empty()))
    }
}
