//! Fallback predictor backed by an OpenAI-compatible chat-completions API.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::{json, Value};

use super::domain::{BorrowingHistory, RiskLevel, RiskVerdict};
use super::predictor::{PredictorError, RiskPredictor};
use crate::config::PredictorConfig;

const SYSTEM_PROMPT: &str =
    "You are a library risk evaluator. Return one of: LowRisk, MediumRisk, HighRisk.";
const MALFORMED_RESPONSE_REASON: &str = "AI Error: Missing or malformed response from OpenAI.";

/// Chat-completions client that turns the model's answer into a verdict.
#[derive(Clone)]
pub struct OpenAiRiskPredictor {
    client: reqwest::Client,
    api_key: Option<String>,
    endpoint: String,
    model: String,
}

impl OpenAiRiskPredictor {
    pub fn from_config(config: &PredictorConfig) -> Result<Self, PredictorError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|err| PredictorError::Unavailable(format!("http client: {err}")))?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn request_body(&self, history: &BorrowingHistory, returned_on: NaiveDate) -> Value {
        json!({
            "model": &self.model,
            "messages": [
                {"role": "system", "content": SYSTEM_PROMPT},
                {"role": "user", "content": build_prompt(history, returned_on)}
            ]
        })
    }
}

impl std::fmt::Debug for OpenAiRiskPredictor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiRiskPredictor")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl RiskPredictor for OpenAiRiskPredictor {
    async fn predict(
        &self,
        history: &BorrowingHistory,
        returned_on: NaiveDate,
    ) -> Result<RiskVerdict, PredictorError> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            PredictorError::Unavailable("OPENAI_API_KEY is not configured".to_string())
        })?;

        tracing::debug!(endpoint = %self.endpoint, model = %self.model, "requesting risk prediction");

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&self.request_body(history, returned_on))
            .send()
            .await
            .map_err(|err| PredictorError::Transport(Box::new(err)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PredictorError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|err| PredictorError::Decode(Box::new(err)))?;

        let verdict = verdict_from_completion(&payload);
        tracing::debug!(level = %verdict.level(), "risk prediction received");
        Ok(verdict)
    }
}

pub(crate) fn build_prompt(history: &BorrowingHistory, returned_on: NaiveDate) -> String {
    format!(
        "Evaluate the risk of a book being returned. \
         LastDueDate: {}, LastReturnedDate: {}, CurrentDueDate: {}, ReturnedDate: {}",
        optional_date(history.last_due_date),
        optional_date(history.last_returned_date),
        history.current_due_date,
        returned_on
    )
}

fn optional_date(date: Option<NaiveDate>) -> String {
    date.map(|date| date.to_string())
        .unwrap_or_else(|| "none".to_string())
}

/// A completion without usable content degrades to a Medium verdict rather
/// than an error.
pub(crate) fn verdict_from_completion(payload: &Value) -> RiskVerdict {
    let content = payload
        .get("choices")
        .and_then(|choices| choices.get(0))
        .and_then(|choice| choice.get("message"))
        .and_then(|message| message.get("content"))
        .and_then(Value::as_str);

    let Some(content) = content else {
        return RiskVerdict::fixed(RiskLevel::Medium, MALFORMED_RESPONSE_REASON);
    };

    let normalized = content.to_ascii_lowercase();
    let level = if normalized.contains("lowrisk") {
        RiskLevel::Low
    } else if normalized.contains("highrisk") {
        RiskLevel::High
    } else {
        RiskLevel::Medium
    };

    RiskVerdict::new(level, content.trim())
        .unwrap_or_else(|_| RiskVerdict::fixed(RiskLevel::Medium, MALFORMED_RESPONSE_REASON))
}
