use crate::infra::{deserialize_date, deserialize_optional_date, AppState};
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use chrono::NaiveDate;
use return_risk::error::AppError;
use return_risk::risk::{
    BorrowingHistory, ReturnRiskDispatcher, RiskLevel, RiskPredictor, VerdictSource,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub(crate) struct ReturnRiskRequest {
    #[serde(default)]
    pub(crate) history: Option<HistoryPayload>,
    #[serde(deserialize_with = "deserialize_date")]
    pub(crate) returned_on: NaiveDate,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct HistoryPayload {
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub(crate) last_due_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub(crate) last_returned_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub(crate) current_due_date: Option<NaiveDate>,
}

impl From<HistoryPayload> for BorrowingHistory {
    fn from(payload: HistoryPayload) -> Self {
        BorrowingHistory {
            last_due_date: payload.last_due_date,
            last_returned_date: payload.last_returned_date,
            current_due_date: payload.current_due_date.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ReturnRiskResponse {
    pub(crate) level: RiskLevel,
    pub(crate) reason: String,
    pub(crate) verdict: String,
    pub(crate) source: VerdictSource,
}

pub(crate) fn with_risk_routes<P>(dispatcher: Arc<ReturnRiskDispatcher<P>>) -> Router
where
    P: RiskPredictor + 'static,
{
    Router::new()
        .route("/api/v1/returns/risk", post(return_risk_endpoint::<P>))
        .with_state(dispatcher)
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn return_risk_endpoint<P>(
    State(dispatcher): State<Arc<ReturnRiskDispatcher<P>>>,
    Json(payload): Json<ReturnRiskRequest>,
) -> Result<Json<ReturnRiskResponse>, AppError>
where
    P: RiskPredictor + 'static,
{
    let ReturnRiskRequest {
        history,
        returned_on,
    } = payload;

    let history = history.map(BorrowingHistory::from);
    let outcome = dispatcher.classify(history.as_ref(), returned_on).await?;

    Ok(Json(ReturnRiskResponse {
        level: outcome.verdict.level(),
        reason: outcome.verdict.reason().to_string(),
        verdict: outcome.verdict.to_string(),
        source: outcome.source,
    }))
}
