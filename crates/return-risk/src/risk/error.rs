use super::predictor::PredictorError;
use super::rules::{ReturnRiskRule, RuleViolation};

/// Coarse failure category so callers can separate local rule faults from
/// fallback predictor faults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    RuleEvaluation,
    Fallback,
    Unexpected,
}

/// Input rejected before any rule is consulted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationFailure {
    #[error("borrowing history is required")]
    MissingHistory,
}

/// Error returned by [`super::ReturnRiskDispatcher::classify`].
#[derive(Debug, thiserror::Error)]
pub enum ClassificationError {
    #[error("validation failed: {source}")]
    Validation {
        #[source]
        source: ValidationFailure,
    },
    #[error("risk rule error in {rule}: {source}")]
    RuleEvaluation {
        rule: ReturnRiskRule,
        #[source]
        source: RuleViolation,
    },
    #[error("fallback predictor failed: {source}")]
    Fallback {
        #[source]
        source: PredictorError,
    },
    #[error("unexpected classification error")]
    Unexpected {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl ClassificationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ClassificationError::Validation { .. } => ErrorKind::Validation,
            ClassificationError::RuleEvaluation { .. } => ErrorKind::RuleEvaluation,
            ClassificationError::Fallback { .. } => ErrorKind::Fallback,
            ClassificationError::Unexpected { .. } => ErrorKind::Unexpected,
        }
    }
}

impl From<ValidationFailure> for ClassificationError {
    fn from(source: ValidationFailure) -> Self {
        Self::Validation { source }
    }
}

impl From<PredictorError> for ClassificationError {
    fn from(source: PredictorError) -> Self {
        if source.is_recognized() {
            Self::Fallback { source }
        } else {
            Self::Unexpected {
                source: Box::new(source),
            }
        }
    }
}
