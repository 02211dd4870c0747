//! Advice gate
//!
//! Releases at most one advice request per calculation cycle, and only for
//! a real prediction label.

use std::sync::Arc;

use shared::{GeometryResult, PredictedCrop};
use tracing::{debug, info, warn};

use crate::external::advice::{AdviceBackend, AdviceRequest};

pub const NO_ADVICE_MESSAGE: &str = "No advice received from AI.";
pub const ADVICE_ERROR_MESSAGE: &str = "Error generating advice. Please try again.";

/// Whether this cycle's single advice request has been spent
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AdviceLatch {
    #[default]
    Open,
    Released,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The label is `Calculating...` or `Error`
    SentinelLabel,
    AlreadyRequested,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdviceOutcome {
    Skipped(SkipReason),
    /// Text published to the UI; may be the "no advice" message
    Delivered(String),
    /// The backend call failed; the error message was published
    Failed(String),
}

impl AdviceOutcome {
    pub fn text(&self) -> Option<&str> {
        match self {
            AdviceOutcome::Skipped(_) => None,
            AdviceOutcome::Delivered(text) | AdviceOutcome::Failed(text) => Some(text),
        }
    }
}

pub struct AdviceGate {
    backend: Arc<dyn AdviceBackend>,
    latch: AdviceLatch,
    advice: Option<String>,
}

impl AdviceGate {
    pub fn new(backend: Arc<dyn AdviceBackend>) -> Self {
        Self {
            backend,
            latch: AdviceLatch::Open,
            advice: None,
        }
    }

    pub fn latch(&self) -> AdviceLatch {
        self.latch
    }

    /// Advice text published in this cycle, if any
    pub fn advice(&self) -> Option<&str> {
        self.advice.as_deref()
    }

    /// Re-arm for a new cycle and forget the previous advice
    pub fn reset(&mut self) {
        self.latch = AdviceLatch::Open;
        self.advice = None;
    }

    /// Request advice for `geometry` labelled with `crop`.
    ///
    /// The latch is released before the backend call, so a failed call still
    /// consumes the cycle's request.
    pub async fn request(&mut self, geometry: &GeometryResult, crop: &PredictedCrop) -> AdviceOutcome {
        if crop.is_sentinel() {
            debug!(label = %crop, "Advice skipped for sentinel label");
            return AdviceOutcome::Skipped(SkipReason::SentinelLabel);
        }
        if self.latch == AdviceLatch::Released {
            debug!("Advice already requested this cycle");
            return AdviceOutcome::Skipped(SkipReason::AlreadyRequested);
        }
        self.latch = AdviceLatch::Released;

        let request = AdviceRequest::new(geometry, crop.as_str());
        let outcome = match self.backend.advise(&request).await {
            Ok(Some(text)) => {
                info!(crop = %crop, "Advice received");
                AdviceOutcome::Delivered(text)
            }
            Ok(None) => {
                warn!(crop = %crop, "Advice response was empty");
                AdviceOutcome::Delivered(NO_ADVICE_MESSAGE.to_string())
            }
            Err(e) => {
                warn!(error = %e, "Advice request failed");
                AdviceOutcome::Failed(ADVICE_ERROR_MESSAGE.to_string())
            }
        };

        self.advice = outcome.text().map(str::to_string);
        outcome
    }
}
