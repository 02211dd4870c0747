//! Geometry backend client
//!
//! Computes area, imagery and soil/climate aggregates for a drawn polygon.

use async_trait::async_trait;
use reqwest::Client;
use shared::{FieldMetricsRequest, GeometryResult};
use tracing::debug;

use crate::error::{AppError, AppResult};
use crate::external::read_json;

#[async_trait]
pub trait GeometryBackend: Send + Sync {
    async fn calculate(&self, request: &FieldMetricsRequest) -> AppResult<GeometryResult>;
}

/// Client for `POST /calculate`
#[derive(Clone)]
pub struct GeometryClient {
    client: Client,
    base_url: String,
}

impl GeometryClient {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl GeometryBackend for GeometryClient {
    async fn calculate(&self, request: &FieldMetricsRequest) -> AppResult<GeometryResult> {
        let url = format!("{}/calculate", self.base_url);
        debug!(points = request.point_count(), "Requesting field geometry");

        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| AppError::GeometryService(format!("Geometry request failed: {}", e)))?;

        let result: GeometryResult =
            read_json(response, "geometry", AppError::GeometryService).await?;

        debug!(
            area_sq_m = result.area_square_meters,
            status = result.status.as_deref().unwrap_or("-"),
            "Geometry received"
        );
        Ok(result)
    }
}
