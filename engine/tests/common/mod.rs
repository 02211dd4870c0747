//! In-memory doubles for the engine's external seams
#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use agro_field_engine::error::{AppError, AppResult};
use agro_field_engine::external::{
    AdviceBackend, AdviceRequest, ClickListener, GeocodeMatch, Geocoder, GeometryBackend,
    ListenerId, LocationError, LocationSource, MapSurface, PositionOptions, PositionWatch,
    PredictionBackend, WatchId, WeatherSource,
};
use async_trait::async_trait;
use shared::{
    Coordinate, FieldMetricsRequest, GeometryResult, PredictedCrop, PredictionRequest,
    WeatherReading,
};
use tokio::sync::mpsc;

pub fn coord(latitude: f64, longitude: f64) -> Coordinate {
    Coordinate::new_unchecked(latitude, longitude)
}

/// A ~2 ha square near Zaria
pub fn square_polygon() -> Vec<Coordinate> {
    vec![
        coord(11.0850, 7.7100),
        coord(11.0850, 7.7114),
        coord(11.0863, 7.7114),
        coord(11.0863, 7.7100),
    ]
}

pub fn geometry(json: serde_json::Value) -> GeometryResult {
    serde_json::from_value(json).expect("valid geometry fixture")
}

/// Geometry result carrying only an area and the given bounds
pub fn field_bounds(bounds: &[Coordinate]) -> GeometryResult {
    let pairs: Vec<[f64; 2]> = bounds.iter().map(Coordinate::as_lng_lat).collect();
    geometry(serde_json::json!({ "area_sq_m": 20000.0, "polygon_bounds": pairs }))
}

// ============================================================================
// Map
// ============================================================================

#[derive(Default)]
pub struct RecordingMap {
    next_id: AtomicU64,
    listeners: Mutex<BTreeMap<u64, ClickListener>>,
    flights: Mutex<Vec<(Coordinate, u8)>>,
    detached: Mutex<Vec<ListenerId>>,
}

impl RecordingMap {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Deliver a click to every attached listener
    pub fn click(&self, at: Coordinate) {
        let listeners: Vec<ClickListener> =
            self.listeners.lock().unwrap().values().cloned().collect();
        for listener in listeners {
            listener(at);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.lock().unwrap().len()
    }

    /// Currently attached listeners, kept alive past detachment
    pub fn snapshot_listeners(&self) -> Vec<ClickListener> {
        self.listeners.lock().unwrap().values().cloned().collect()
    }

    pub fn flights(&self) -> Vec<(Coordinate, u8)> {
        self.flights.lock().unwrap().clone()
    }

    pub fn detached(&self) -> Vec<ListenerId> {
        self.detached.lock().unwrap().clone()
    }
}

impl MapSurface for RecordingMap {
    fn fly_to(&self, target: Coordinate, zoom: u8) {
        self.flights.lock().unwrap().push((target, zoom));
    }

    fn on_click(&self, listener: ClickListener) -> ListenerId {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.listeners.lock().unwrap().insert(id, listener);
        ListenerId(id)
    }

    fn off_click(&self, id: ListenerId) {
        self.listeners.lock().unwrap().remove(&id.0);
        self.detached.lock().unwrap().push(id);
    }
}

// ============================================================================
// Backends
// ============================================================================

pub struct StubGeometry {
    result: Option<GeometryResult>,
    pub calls: AtomicUsize,
    pub requests: Mutex<Vec<FieldMetricsRequest>>,
}

impl StubGeometry {
    pub fn returning(result: GeometryResult) -> Arc<Self> {
        Arc::new(Self {
            result: Some(result),
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            result: None,
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GeometryBackend for StubGeometry {
    async fn calculate(&self, request: &FieldMetricsRequest) -> AppResult<GeometryResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());
        self.result
            .clone()
            .ok_or_else(|| AppError::GeometryService("geometry error: 500 - boom".into()))
    }
}

pub struct StubPrediction {
    label: Option<PredictedCrop>,
    pub requests: Mutex<Vec<PredictionRequest>>,
}

impl StubPrediction {
    pub fn returning(label: &str) -> Arc<Self> {
        Arc::new(Self {
            label: Some(PredictedCrop::from_response(Some(label))),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            label: None,
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn last_request(&self) -> Option<PredictionRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl PredictionBackend for StubPrediction {
    async fn predict(&self, request: &PredictionRequest) -> AppResult<PredictedCrop> {
        self.requests.lock().unwrap().push(request.clone());
        self.label
            .clone()
            .ok_or_else(|| AppError::PredictionService("prediction error: 503".into()))
    }
}

pub enum AdviceReply {
    Text(&'static str),
    Empty,
    Fail,
}

pub struct StubAdvice {
    reply: AdviceReply,
    pub requests: Mutex<Vec<AdviceRequest>>,
}

impl StubAdvice {
    pub fn new(reply: AdviceReply) -> Arc<Self> {
        Arc::new(Self {
            reply,
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<AdviceRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl AdviceBackend for StubAdvice {
    async fn advise(&self, request: &AdviceRequest) -> AppResult<Option<String>> {
        self.requests.lock().unwrap().push(request.clone());
        match self.reply {
            AdviceReply::Text(text) => Ok(Some(text.to_string())),
            AdviceReply::Empty => Ok(None),
            AdviceReply::Fail => Err(AppError::AdviceService("advice error: 500".into())),
        }
    }
}

// ============================================================================
// Weather
// ============================================================================

pub struct StubWeather {
    name: &'static str,
    reading: Option<WeatherReading>,
    pub queried_at: Mutex<Vec<Coordinate>>,
}

impl StubWeather {
    pub fn returning(name: &'static str, temperature: Option<f64>, rainfall: Option<f64>) -> Arc<Self> {
        Arc::new(Self {
            name,
            reading: Some(WeatherReading::new(temperature, rainfall)),
            queried_at: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(name: &'static str) -> Arc<Self> {
        Arc::new(Self {
            name,
            reading: None,
            queried_at: Mutex::new(Vec::new()),
        })
    }

    pub fn call_count(&self) -> usize {
        self.queried_at.lock().unwrap().len()
    }
}

#[async_trait]
impl WeatherSource for StubWeather {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn reading(&self, at: Coordinate) -> AppResult<WeatherReading> {
        self.queried_at.lock().unwrap().push(at);
        self.reading.ok_or_else(|| AppError::WeatherSource {
            source_name: self.name,
            message: "request failed: connection refused".into(),
        })
    }
}

// ============================================================================
// Geocoding
// ============================================================================

pub struct StubGeocoder {
    matches: Option<Vec<GeocodeMatch>>,
    pub queries: Mutex<Vec<(String, String)>>,
}

impl StubGeocoder {
    pub fn returning(matches: Vec<GeocodeMatch>) -> Arc<Self> {
        Arc::new(Self {
            matches: Some(matches),
            queries: Mutex::new(Vec::new()),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            matches: None,
            queries: Mutex::new(Vec::new()),
        })
    }

    pub fn call_count(&self) -> usize {
        self.queries.lock().unwrap().len()
    }
}

#[async_trait]
impl Geocoder for StubGeocoder {
    async fn search(&self, query: &str, country_code: &str) -> AppResult<Vec<GeocodeMatch>> {
        self.queries
            .lock()
            .unwrap()
            .push((query.to_string(), country_code.to_string()));
        self.matches
            .clone()
            .ok_or_else(|| AppError::LookupFailed("geocoding error: 429".into()))
    }
}

// ============================================================================
// Location
// ============================================================================

pub type PositionSender = mpsc::UnboundedSender<Result<Coordinate, LocationError>>;

/// Device double; the test pushes fixes through the sender of the latest watch
pub struct ScriptedLocation {
    supported: bool,
    next_id: AtomicU64,
    senders: Mutex<Vec<PositionSender>>,
    cleared: Mutex<Vec<WatchId>>,
    pub watch_options: Mutex<Vec<PositionOptions>>,
    once: Mutex<Option<Result<Coordinate, LocationError>>>,
}

impl ScriptedLocation {
    pub fn supported() -> Arc<Self> {
        Arc::new(Self::with_support(true))
    }

    pub fn unsupported() -> Arc<Self> {
        Arc::new(Self::with_support(false))
    }

    fn with_support(supported: bool) -> Self {
        Self {
            supported,
            next_id: AtomicU64::new(1),
            senders: Mutex::new(Vec::new()),
            cleared: Mutex::new(Vec::new()),
            watch_options: Mutex::new(Vec::new()),
            once: Mutex::new(None),
        }
    }

    /// Sender feeding the most recently opened watch
    pub fn sender(&self) -> PositionSender {
        self.senders
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("a watch was opened")
    }

    pub fn cleared(&self) -> Vec<WatchId> {
        self.cleared.lock().unwrap().clone()
    }

    pub fn set_once(&self, result: Result<Coordinate, LocationError>) {
        *self.once.lock().unwrap() = Some(result);
    }
}

#[async_trait]
impl LocationSource for ScriptedLocation {
    fn is_supported(&self) -> bool {
        self.supported
    }

    fn watch_position(&self, options: PositionOptions) -> Result<PositionWatch, LocationError> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.senders.lock().unwrap().push(tx);
        self.watch_options.lock().unwrap().push(options);
        Ok(PositionWatch {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            updates: rx,
        })
    }

    fn clear_watch(&self, id: WatchId) {
        self.cleared.lock().unwrap().push(id);
    }

    async fn current_position(&self, _options: PositionOptions) -> Result<Coordinate, LocationError> {
        let once = self.once.lock().unwrap().clone();
        match once {
            Some(result) => result,
            None => std::future::pending().await,
        }
    }
}
