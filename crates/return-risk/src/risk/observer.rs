use super::dispatcher::FallbackCause;
use super::domain::RiskVerdict;
use super::error::ClassificationError;
use super::rules::ReturnRiskRule;

/// Hook points the dispatcher reports to. Every method defaults to a no-op so
/// observers only implement what they care about.
pub trait ClassificationObserver: Send + Sync {
    fn on_rule_selected(&self, _rule: ReturnRiskRule, _verdict: &RiskVerdict) {}

    fn on_no_match(&self, _cause: FallbackCause) {}

    fn on_error(&self, _error: &ClassificationError) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl ClassificationObserver for NoopObserver {}

/// Emits one `tracing` event per hook.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl ClassificationObserver for TracingObserver {
    fn on_rule_selected(&self, rule: ReturnRiskRule, verdict: &RiskVerdict) {
        tracing::info!(rule = %rule, level = %verdict.level(), "return risk graded by rule");
    }

    fn on_no_match(&self, cause: FallbackCause) {
        tracing::info!(?cause, "no rule verdict, consulting fallback predictor");
    }

    fn on_error(&self, error: &ClassificationError) {
        tracing::warn!(kind = ?error.kind(), error = %error, "return risk classification failed");
    }
}
