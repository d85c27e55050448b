use async_trait::async_trait;
use chrono::NaiveDate;

use super::domain::{BorrowingHistory, RiskVerdict};

/// External oracle consulted when no catalog rule grades a return.
///
/// Implementations own their transport, timeout and retry policy. Failures
/// must surface as [`PredictorError`] rather than a placeholder verdict.
#[async_trait]
pub trait RiskPredictor: Send + Sync {
    async fn predict(
        &self,
        history: &BorrowingHistory,
        returned_on: NaiveDate,
    ) -> Result<RiskVerdict, PredictorError>;
}

/// Failure raised by a fallback predictor.
#[derive(Debug, thiserror::Error)]
pub enum PredictorError {
    #[error("predictor unavailable: {0}")]
    Unavailable(String),
    #[error("predictor transport failed")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),
    #[error("predictor returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("predictor response could not be decoded")]
    Decode(#[source] Box<dyn std::error::Error + Send + Sync>),
    #[error("predictor returned an invalid verdict: {0}")]
    InvalidVerdict(String),
    #[error("predictor failed internally")]
    Internal(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl PredictorError {
    /// Whether the failure belongs to a known predictor failure mode rather
    /// than an unanticipated internal fault.
    pub fn is_recognized(&self) -> bool {
        !matches!(self, PredictorError::Internal(_))
    }
}
