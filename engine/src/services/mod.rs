//! Orchestration services for field delineation and derived metrics

pub mod advice;
pub mod drawing;
pub mod pipeline;
pub mod place;
pub mod profile;
pub mod tracking;
pub mod weather;

pub use advice::{AdviceGate, AdviceLatch, AdviceOutcome, SkipReason};
pub use drawing::DrawingSession;
pub use pipeline::{
    CyclePhase, CycleReport, FieldMetricsPipeline, PipelineRunState, Stage, StageStatus,
};
pub use place::{PlaceLookup, PlaceResolver};
pub use profile::{InMemoryProfileStore, JsonFileProfileStore, ProfileStore};
pub use tracking::{shared_location, GeoTracker, LocationState, SharedLocation, TrackingHandle};
pub use weather::WeatherFallbackChain;
