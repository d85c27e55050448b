mod dispatcher;
pub mod domain;
mod error;
pub mod observer;
pub mod openai;
pub mod predictor;
pub mod rules;

#[cfg(test)]
mod tests;

pub use dispatcher::{Classification, FallbackCause, ReturnRiskDispatcher, VerdictSource};
pub use domain::{BorrowingHistory, DueDate, ReturnTiming, RiskLevel, RiskVerdict};
pub use error::{ClassificationError, ErrorKind, ValidationFailure};
pub use observer::{ClassificationObserver, NoopObserver, TracingObserver};
pub use openai::OpenAiRiskPredictor;
pub use predictor::{PredictorError, RiskPredictor};
pub use rules::{ReturnRiskRule, RuleViolation, CATALOG};
