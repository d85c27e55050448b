use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{Duration, NaiveDate};

use crate::risk::{
    BorrowingHistory, ClassificationError, ClassificationObserver, ErrorKind, FallbackCause,
    PredictorError, ReturnRiskDispatcher, ReturnRiskRule, RiskLevel, RiskPredictor, RiskVerdict,
};

pub(super) const FAKE_AI_REASON: &str = "AI Risk Prediction: MediumRisk (fake)";

pub(super) fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 18).expect("valid date")
}

pub(super) fn days(offset: i64) -> NaiveDate {
    today() + Duration::days(offset)
}

/// Prior loan graded by `prior_offset` days relative to its due date and a
/// current loan due today.
pub(super) fn prior_loan(prior_offset: i64) -> BorrowingHistory {
    BorrowingHistory::with_prior_loan(days(-10), days(-10 + prior_offset), today())
}

/// Predictor that answers with a fixed verdict and records every call.
pub(super) struct StubPredictor {
    verdict: RiskVerdict,
    calls: Mutex<Vec<(BorrowingHistory, NaiveDate)>>,
}

impl StubPredictor {
    pub(super) fn answering(verdict: RiskVerdict) -> Self {
        Self {
            verdict,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub(super) fn fake_ai() -> Self {
        Self::answering(RiskVerdict::new(RiskLevel::Medium, FAKE_AI_REASON).expect("reason"))
    }

    pub(super) fn calls(&self) -> Vec<(BorrowingHistory, NaiveDate)> {
        self.calls.lock().expect("calls mutex poisoned").clone()
    }
}

#[async_trait]
impl RiskPredictor for StubPredictor {
    async fn predict(
        &self,
        history: &BorrowingHistory,
        returned_on: NaiveDate,
    ) -> Result<RiskVerdict, PredictorError> {
        self.calls
            .lock()
            .expect("calls mutex poisoned")
            .push((*history, returned_on));
        Ok(self.verdict.clone())
    }
}

/// Predictor whose every call fails with the error built by `make_error`.
pub(super) struct FailingPredictor {
    make_error: fn() -> PredictorError,
}

impl FailingPredictor {
    pub(super) fn new(make_error: fn() -> PredictorError) -> Self {
        Self { make_error }
    }
}

#[async_trait]
impl RiskPredictor for FailingPredictor {
    async fn predict(
        &self,
        _history: &BorrowingHistory,
        _returned_on: NaiveDate,
    ) -> Result<RiskVerdict, PredictorError> {
        Err((self.make_error)())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum ObservedEvent {
    RuleSelected(ReturnRiskRule),
    NoMatch(FallbackCause),
    Error(ErrorKind),
}

#[derive(Default)]
pub(super) struct RecordingObserver {
    events: Mutex<Vec<ObservedEvent>>,
}

impl RecordingObserver {
    pub(super) fn events(&self) -> Vec<ObservedEvent> {
        self.events.lock().expect("observer mutex poisoned").clone()
    }

    fn push(&self, event: ObservedEvent) {
        self.events.lock().expect("observer mutex poisoned").push(event);
    }
}

impl ClassificationObserver for RecordingObserver {
    fn on_rule_selected(&self, rule: ReturnRiskRule, _verdict: &RiskVerdict) {
        self.push(ObservedEvent::RuleSelected(rule));
    }

    fn on_no_match(&self, cause: FallbackCause) {
        self.push(ObservedEvent::NoMatch(cause));
    }

    fn on_error(&self, error: &ClassificationError) {
        self.push(ObservedEvent::Error(error.kind()));
    }
}

pub(super) fn dispatcher_with_fake_ai() -> (ReturnRiskDispatcher<StubPredictor>, Arc<StubPredictor>)
{
    let predictor = Arc::new(StubPredictor::fake_ai());
    (ReturnRiskDispatcher::new(predictor.clone()), predictor)
}
