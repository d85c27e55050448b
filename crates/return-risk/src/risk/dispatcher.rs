use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::domain::{BorrowingHistory, RiskVerdict};
use super::error::{ClassificationError, ValidationFailure};
use super::observer::{ClassificationObserver, NoopObserver};
use super::predictor::{PredictorError, RiskPredictor};
use super::rules::{self, ReturnRiskRule, CATALOG};

/// Why a classification was handed to the fallback predictor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackCause {
    NoRuleMatched,
    DueDateUnset,
}

/// Which path produced a verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "detail")]
pub enum VerdictSource {
    Rule(ReturnRiskRule),
    Fallback(FallbackCause),
}

/// Verdict together with its provenance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub verdict: RiskVerdict,
    pub source: VerdictSource,
}

/// Routes each returned item to the first matching rule, or to the fallback
/// predictor when none applies. Holds no mutable state, so one instance can
/// serve concurrent callers.
pub struct ReturnRiskDispatcher<P> {
    rules: Vec<ReturnRiskRule>,
    predictor: Arc<P>,
    observer: Arc<dyn ClassificationObserver>,
}

impl<P> ReturnRiskDispatcher<P>
where
    P: RiskPredictor + 'static,
{
    pub fn new(predictor: Arc<P>) -> Self {
        Self::with_rules(CATALOG.to_vec(), predictor)
    }

    /// Dispatcher scanning `rules` in the given order instead of the catalog.
    pub fn with_rules(rules: Vec<ReturnRiskRule>, predictor: Arc<P>) -> Self {
        Self {
            rules,
            predictor,
            observer: Arc::new(NoopObserver),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn ClassificationObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn rules(&self) -> &[ReturnRiskRule] {
        &self.rules
    }

    /// Grade the return of an item.
    ///
    /// Dropping the returned future cancels any in-flight predictor call.
    pub async fn classify(
        &self,
        history: Option<&BorrowingHistory>,
        returned_on: NaiveDate,
    ) -> Result<Classification, ClassificationError> {
        let result = self.resolve(history, returned_on).await;
        if let Err(error) = &result {
            self.observer.on_error(error);
        }
        result
    }

    async fn resolve(
        &self,
        history: Option<&BorrowingHistory>,
        returned_on: NaiveDate,
    ) -> Result<Classification, ClassificationError> {
        let history = history.ok_or(ValidationFailure::MissingHistory)?;

        let cause = match rules::select_rule(&self.rules, history, returned_on) {
            Some(rule) if !history.current_due_date.is_unset() => {
                let verdict = rule
                    .evaluate(history, returned_on)
                    .map_err(|source| ClassificationError::RuleEvaluation { rule, source })?;
                self.observer.on_rule_selected(rule, &verdict);
                return Ok(Classification {
                    verdict,
                    source: VerdictSource::Rule(rule),
                });
            }
            Some(_) => FallbackCause::DueDateUnset,
            None if history.current_due_date.is_unset() => FallbackCause::DueDateUnset,
            None => FallbackCause::NoRuleMatched,
        };

        self.observer.on_no_match(cause);
        let verdict = self.predictor.predict(history, returned_on).await?;
        if verdict.reason().trim().is_empty() {
            return Err(PredictorError::InvalidVerdict("empty reason".to_string()).into());
        }

        Ok(Classification {
            verdict,
            source: VerdictSource::Fallback(cause),
        })
    }
}
