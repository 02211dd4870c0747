//! Advice gate tests
//!
//! - At most one advice request per cycle
//! - No request for sentinel labels
//! - Fixed messages for empty and failed responses

mod common;

use agro_field_engine::external::ADVICE_PROMPT;
use agro_field_engine::services::advice::{ADVICE_ERROR_MESSAGE, NO_ADVICE_MESSAGE};
use agro_field_engine::services::{AdviceGate, AdviceLatch, AdviceOutcome, SkipReason};
use common::*;
use proptest::prelude::*;
use serde_json::json;
use shared::{GeometryResult, PredictedCrop};

fn field() -> GeometryResult {
    geometry(json!({
        "status": "success",
        "area_sq_m": 85788.19,
        "image_tile_url": "https://tiles.example/t",
        "soil_pH": 6.2,
        "ndvi_mean": 0.61
    }))
}

fn maize() -> PredictedCrop {
    PredictedCrop::Crop("Maize".into())
}

// ============================================================================
// Unit Tests
// ============================================================================

#[tokio::test]
async fn test_second_request_is_a_no_op() {
    let backend = StubAdvice::new(AdviceReply::Text("Rotate with legumes."));
    let mut gate = AdviceGate::new(backend.clone());

    let first = gate.request(&field(), &maize()).await;
    let second = gate.request(&field(), &maize()).await;

    assert_eq!(first, AdviceOutcome::Delivered("Rotate with legumes.".into()));
    assert_eq!(second, AdviceOutcome::Skipped(SkipReason::AlreadyRequested));
    assert_eq!(backend.call_count(), 1);
    assert_eq!(gate.latch(), AdviceLatch::Released);
    assert_eq!(gate.advice(), Some("Rotate with legumes."));
}

#[tokio::test]
async fn test_sentinel_labels_never_reach_backend() {
    let backend = StubAdvice::new(AdviceReply::Text("unused"));
    let mut gate = AdviceGate::new(backend.clone());

    for label in [PredictedCrop::Calculating, PredictedCrop::Error] {
        let outcome = gate.request(&field(), &label).await;
        assert_eq!(outcome, AdviceOutcome::Skipped(SkipReason::SentinelLabel));
    }

    assert_eq!(backend.call_count(), 0);
    // Sentinels do not consume the cycle's request
    assert_eq!(gate.latch(), AdviceLatch::Open);
    assert!(gate.advice().is_none());
}

#[tokio::test]
async fn test_request_carries_prompt_geometry_and_label() {
    let backend = StubAdvice::new(AdviceReply::Text("ok"));
    let mut gate = AdviceGate::new(backend.clone());

    gate.request(&field(), &maize()).await;

    let sent = &backend.requests()[0];
    assert_eq!(sent.message, ADVICE_PROMPT);
    assert_eq!(sent.info.predicted_crop, "Maize");
    assert_eq!(sent.info.geometry, field());
}

#[tokio::test]
async fn test_empty_response_uses_fallback_text() {
    let mut gate = AdviceGate::new(StubAdvice::new(AdviceReply::Empty));

    let outcome = gate.request(&field(), &maize()).await;

    assert_eq!(outcome, AdviceOutcome::Delivered(NO_ADVICE_MESSAGE.into()));
    assert_eq!(gate.advice(), Some(NO_ADVICE_MESSAGE));
}

#[tokio::test]
async fn test_failure_consumes_latch_and_publishes_error_text() {
    let backend = StubAdvice::new(AdviceReply::Fail);
    let mut gate = AdviceGate::new(backend.clone());

    let outcome = gate.request(&field(), &maize()).await;
    let retry = gate.request(&field(), &maize()).await;

    assert_eq!(outcome, AdviceOutcome::Failed(ADVICE_ERROR_MESSAGE.into()));
    assert_eq!(retry, AdviceOutcome::Skipped(SkipReason::AlreadyRequested));
    assert_eq!(backend.call_count(), 1);
    assert_eq!(gate.advice(), Some(ADVICE_ERROR_MESSAGE));
}

#[tokio::test]
async fn test_reset_rearms_for_next_cycle() {
    let backend = StubAdvice::new(AdviceReply::Text("ok"));
    let mut gate = AdviceGate::new(backend.clone());

    gate.request(&field(), &maize()).await;
    gate.reset();
    assert_eq!(gate.latch(), AdviceLatch::Open);
    assert!(gate.advice().is_none());

    gate.request(&field(), &maize()).await;
    assert_eq!(backend.call_count(), 2);
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    /// Any number of requests within one cycle reaches the backend at most once
    #[test]
    fn property_at_most_one_call_per_cycle(attempts in 1usize..8, label in "[A-Z][a-z]{2,10}") {
        let backend = StubAdvice::new(AdviceReply::Text("ok"));
        let mut gate = AdviceGate::new(backend.clone());
        let crop = PredictedCrop::from_response(Some(&label));

        tokio_test::block_on(async {
            for _ in 0..attempts {
                gate.request(&field(), &crop).await;
            }
        });

        let expected = if crop.is_sentinel() { 0 } else { 1 };
        prop_assert_eq!(backend.call_count(), expected);
    }
}
