//! Field metrics pipeline
//!
//! One calculation cycle runs geometry, weather fallback, crop prediction and
//! advice strictly in that order. Results are published on watch channels
//! and summarized in a [`CycleReport`].

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use shared::{
    validate_coordinates, validate_polygon, DerivedMetrics, FieldMetricsRequest, GeometryResult, MetricDefaults,
    PredictedCrop, PredictionRequest, ResolvedClimate, WeatherReading,
};
use tokio::sync::watch;
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::external::{
    http_client, AdviceBackend, AdviceClient, GeometryBackend, GeometryClient, NasaPowerClient,
    OpenMeteoClient, PredictionBackend, PredictionClient,
};
use crate::services::advice::{AdviceGate, AdviceOutcome};
use crate::services::profile::{JsonFileProfileStore, ProfileStore};
use crate::services::weather::WeatherFallbackChain;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CyclePhase {
    #[default]
    Idle,
    FetchingGeometry,
    ResolvingWeather,
    Predicting,
    Done,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Geometry,
    Weather,
    Prediction,
    Advice,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    #[default]
    Pending,
    InFlight,
    Completed,
    Skipped,
    Failed,
}

/// Transient bookkeeping for one cycle
#[derive(Debug, Clone, Serialize)]
pub struct PipelineRunState {
    pub cycle_id: Uuid,
    pub phase: CyclePhase,
    pub started_at: DateTime<Utc>,
    geometry: StageStatus,
    weather: StageStatus,
    prediction: StageStatus,
    advice: StageStatus,
}

impl PipelineRunState {
    fn new() -> Self {
        Self {
            cycle_id: Uuid::new_v4(),
            phase: CyclePhase::Idle,
            started_at: Utc::now(),
            geometry: StageStatus::Pending,
            weather: StageStatus::Pending,
            prediction: StageStatus::Pending,
            advice: StageStatus::Pending,
        }
    }

    pub fn stage(&self, stage: Stage) -> StageStatus {
        match stage {
            Stage::Geometry => self.geometry,
            Stage::Weather => self.weather,
            Stage::Prediction => self.prediction,
            Stage::Advice => self.advice,
        }
    }

    fn mark(&mut self, stage: Stage, status: StageStatus) {
        let slot = match stage {
            Stage::Geometry => &mut self.geometry,
            Stage::Weather => &mut self.weather,
            Stage::Prediction => &mut self.prediction,
            Stage::Advice => &mut self.advice,
        };
        *slot = status;
    }

    fn enter(&mut self, phase: CyclePhase) {
        debug!(from = ?self.phase, to = ?phase, "Cycle phase change");
        self.phase = phase;
    }
}

/// Everything one `calculate` call produced
#[derive(Debug)]
pub struct CycleReport {
    pub run: PipelineRunState,
    /// Absent only when the geometry stage failed
    pub metrics: Option<DerivedMetrics>,
    pub advice: Option<String>,
    /// The failure that ended the cycle early or produced the `Error` label
    pub error: Option<AppError>,
}

impl CycleReport {
    pub fn is_success(&self) -> bool {
        self.run.phase == CyclePhase::Done
    }
}

pub struct FieldMetricsPipeline {
    geometry: Arc<dyn GeometryBackend>,
    weather: WeatherFallbackChain,
    prediction: Arc<dyn PredictionBackend>,
    advice: Arc<dyn AdviceBackend>,
    profiles: Arc<dyn ProfileStore>,
    defaults: MetricDefaults,
    loading: watch::Sender<bool>,
    metrics: watch::Sender<Option<DerivedMetrics>>,
    advice_text: watch::Sender<Option<String>>,
}

impl FieldMetricsPipeline {
    pub fn new(
        geometry: Arc<dyn GeometryBackend>,
        weather: WeatherFallbackChain,
        prediction: Arc<dyn PredictionBackend>,
        advice: Arc<dyn AdviceBackend>,
        profiles: Arc<dyn ProfileStore>,
        defaults: MetricDefaults,
    ) -> Self {
        let (loading, _) = watch::channel(false);
        let (metrics, _) = watch::channel(None);
        let (advice_text, _) = watch::channel(None);

        Self {
            geometry,
            weather,
            prediction,
            advice,
            profiles,
            defaults,
            loading,
            metrics,
            advice_text,
        }
    }

    /// Wire the HTTP clients, weather sources and profile file from configuration
    pub fn from_config(config: &Config) -> AppResult<Self> {
        let client = http_client(config.http.timeout())?;
        let backend_url = config.backend.base_url.as_str();

        let weather = WeatherFallbackChain::new(
            Arc::new(OpenMeteoClient::with_base_url(
                client.clone(),
                &config.weather.primary_url,
            )),
            Arc::new(NasaPowerClient::with_base_url(
                client.clone(),
                &config.weather.secondary_url,
            )),
        );

        Ok(Self::new(
            Arc::new(GeometryClient::new(client.clone(), backend_url)),
            weather,
            Arc::new(PredictionClient::new(client.clone(), backend_url)),
            Arc::new(AdviceClient::new(client, backend_url)),
            Arc::new(JsonFileProfileStore::from_config(&config.profile)),
            config.defaults.clone(),
        ))
    }

    pub fn subscribe_loading(&self) -> watch::Receiver<bool> {
        self.loading.subscribe()
    }

    pub fn subscribe_metrics(&self) -> watch::Receiver<Option<DerivedMetrics>> {
        self.metrics.subscribe()
    }

    pub fn subscribe_advice(&self) -> watch::Receiver<Option<String>> {
        self.advice_text.subscribe()
    }

    pub fn is_loading(&self) -> bool {
        *self.loading.borrow()
    }

    pub fn latest_metrics(&self) -> Option<DerivedMetrics> {
        self.metrics.borrow().clone()
    }

    /// Run one calculation cycle.
    ///
    /// Concurrent calls are not serialized; callers should consult the
    /// loading flag before starting another cycle.
    pub async fn calculate(&self, request: FieldMetricsRequest) -> CycleReport {
        let run = PipelineRunState::new();
        let span = info_span!(
            "field_cycle",
            cycle_id = %run.cycle_id,
            points = request.point_count()
        );
        self.run_cycle(run, request).instrument(span).await
    }

    async fn run_cycle(&self, mut run: PipelineRunState, request: FieldMetricsRequest) -> CycleReport {
        if let Err(e) = validate_request(&request) {
            warn!(error = %e, "Rejecting polygon before any request");
            run.mark(Stage::Geometry, StageStatus::Skipped);
            run.enter(CyclePhase::Failed);
            return CycleReport {
                run,
                metrics: None,
                advice: None,
                error: Some(e),
            };
        }

        self.loading.send_replace(true);
        self.metrics.send_replace(None);
        self.advice_text.send_replace(None);
        let mut gate = AdviceGate::new(Arc::clone(&self.advice));
        let profile = self.profiles.load().await;

        // Geometry
        run.enter(CyclePhase::FetchingGeometry);
        run.mark(Stage::Geometry, StageStatus::InFlight);
        let geometry = match self.geometry.calculate(&request).await {
            Ok(geometry) => {
                run.mark(Stage::Geometry, StageStatus::Completed);
                geometry
            }
            Err(e) => {
                error!(error = %e, "Geometry stage failed");
                run.mark(Stage::Geometry, StageStatus::Failed);
                run.enter(CyclePhase::Failed);
                self.loading.send_replace(false);
                return CycleReport {
                    run,
                    metrics: None,
                    advice: None,
                    error: Some(e),
                };
            }
        };

        // Weather
        let climate = self.resolve_climate(&geometry, &mut run).await;

        // Prediction
        let prediction_request =
            PredictionRequest::build(&profile, &geometry, climate, &self.defaults);
        run.enter(CyclePhase::Predicting);
        run.mark(Stage::Prediction, StageStatus::InFlight);
        let mut cycle_error = None;
        let crop = match self.prediction.predict(&prediction_request).await {
            Ok(crop) => {
                info!(crop = %crop, "Crop predicted");
                run.mark(Stage::Prediction, StageStatus::Completed);
                crop
            }
            Err(e) => {
                error!(error = %e, "Prediction stage failed");
                run.mark(Stage::Prediction, StageStatus::Failed);
                cycle_error = Some(e);
                PredictedCrop::Error
            }
        };

        let metrics =
            DerivedMetrics::assemble(&geometry, climate, crop.clone(), &self.defaults, Utc::now());
        info!(
            land_area_ha = %metrics.land_area_ha,
            temperature = metrics.temperature,
            rainfall = metrics.rainfall,
            crop = %metrics.predicted_crop,
            "Field metrics published"
        );
        self.metrics.send_replace(Some(metrics.clone()));
        run.enter(if cycle_error.is_some() {
            CyclePhase::Failed
        } else {
            CyclePhase::Done
        });
        self.loading.send_replace(false);

        // Advice
        let outcome = gate.request(&geometry, &crop).await;
        run.mark(
            Stage::Advice,
            match &outcome {
                AdviceOutcome::Skipped(_) => StageStatus::Skipped,
                AdviceOutcome::Delivered(_) => StageStatus::Completed,
                AdviceOutcome::Failed(_) => StageStatus::Failed,
            },
        );
        let advice = gate.advice().map(str::to_string);
        if advice.is_some() {
            self.advice_text.send_replace(advice.clone());
        }

        CycleReport {
            run,
            metrics: Some(metrics),
            advice,
            error: cycle_error,
        }
    }

    /// Backend climate values, gaps filled by the fallback chain, then defaults
    async fn resolve_climate(
        &self,
        geometry: &GeometryResult,
        run: &mut PipelineRunState,
    ) -> ResolvedClimate {
        if !geometry.needs_weather_fallback() {
            run.mark(Stage::Weather, StageStatus::Skipped);
            return ResolvedClimate::resolve(geometry, WeatherReading::EMPTY, &self.defaults);
        }

        run.enter(CyclePhase::ResolvingWeather);
        run.mark(Stage::Weather, StageStatus::InFlight);
        let reading = self.weather.resolve(geometry).await;

        let filled = WeatherReading::new(geometry.avg_temp_c, geometry.rainfall_total_mm).or(reading);
        run.mark(
            Stage::Weather,
            if filled.is_complete() {
                StageStatus::Completed
            } else {
                StageStatus::Failed
            },
        );

        let climate = ResolvedClimate::resolve(geometry, reading, &self.defaults);
        debug!(?reading, ?climate, "Climate resolved");
        climate
    }
}

fn validate_request(request: &FieldMetricsRequest) -> AppResult<()> {
    validate_polygon(&request.polygon)?;
    validate_coordinates(&request.polygon)?;
    Ok(())
}
