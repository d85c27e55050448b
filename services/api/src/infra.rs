use chrono::{DateTime, NaiveDate, NaiveDateTime};
use metrics_exporter_prometheus::PrometheusHandle;
use return_risk::config::PredictorConfig;
use return_risk::error::AppError;
use return_risk::risk::{OpenAiRiskPredictor, ReturnRiskDispatcher, TracingObserver};
use serde::Deserialize;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) type LiveDispatcher = ReturnRiskDispatcher<OpenAiRiskPredictor>;

/// Process-lifetime dispatcher over the full rule catalog with the OpenAI
/// predictor as fallback.
pub(crate) fn build_dispatcher(config: &PredictorConfig) -> Result<Arc<LiveDispatcher>, AppError> {
    let predictor = Arc::new(OpenAiRiskPredictor::from_config(config)?);
    let dispatcher = ReturnRiskDispatcher::new(predictor).with_observer(Arc::new(TracingObserver));
    Ok(Arc::new(dispatcher))
}

/// Accepts a calendar date or a timestamp; timestamps are truncated to their
/// calendar date.
pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    let trimmed = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(date);
    }
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(timestamp.date_naive());
    }
    NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|timestamp| timestamp.date())
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD or timestamp ({err})"))
}

pub(crate) fn deserialize_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_date(&raw).map_err(serde::de::Error::custom)
}

pub(crate) fn deserialize_optional_date<'de, D>(
    deserializer: D,
) -> Result<Option<NaiveDate>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    opt.map(|value| parse_date(&value).map_err(serde::de::Error::custom))
        .transpose()
}
