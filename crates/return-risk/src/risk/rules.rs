use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::domain::{BorrowingHistory, ReturnTiming, RiskLevel, RiskVerdict};

/// Borrowing-behavior patterns, one per variant. Each owns a disjoint slice of
/// the (history, return date) space except at the boundaries, where catalog
/// order decides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReturnRiskRule {
    InitialReturn,
    OnTimeTwice,
    EarlyThenOnTime,
    EarlyThenEarly,
    EarlyThenLate,
    LateThenOnTime,
    LateThenLate,
    LateThenEarly,
}

/// Every rule in evaluation priority order.
pub const CATALOG: [ReturnRiskRule; 8] = [
    ReturnRiskRule::InitialReturn,
    ReturnRiskRule::OnTimeTwice,
    ReturnRiskRule::EarlyThenOnTime,
    ReturnRiskRule::EarlyThenEarly,
    ReturnRiskRule::EarlyThenLate,
    ReturnRiskRule::LateThenOnTime,
    ReturnRiskRule::LateThenLate,
    ReturnRiskRule::LateThenEarly,
];

/// Raised when a rule is evaluated against input its pattern does not cover.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuleViolation {
    #[error("rule {rule} evaluated against a history it does not match")]
    PatternMismatch { rule: ReturnRiskRule },
    #[error("rule {rule} cannot grade a return without a current due date")]
    DueDateUnset { rule: ReturnRiskRule },
}

impl ReturnRiskRule {
    pub fn id(&self) -> &'static str {
        match self {
            ReturnRiskRule::InitialReturn => "initial_return",
            ReturnRiskRule::OnTimeTwice => "on_time_twice",
            ReturnRiskRule::EarlyThenOnTime => "early_then_on_time",
            ReturnRiskRule::EarlyThenEarly => "early_then_early",
            ReturnRiskRule::EarlyThenLate => "early_then_late",
            ReturnRiskRule::LateThenOnTime => "late_then_on_time",
            ReturnRiskRule::LateThenLate => "late_then_late",
            ReturnRiskRule::LateThenEarly => "late_then_early",
        }
    }

    /// Prior and current timings a two-loan rule is keyed on.
    fn timing_pattern(&self) -> Option<(ReturnTiming, ReturnTiming)> {
        use ReturnTiming::{Early, Late, OnTime};

        match self {
            ReturnRiskRule::InitialReturn | ReturnRiskRule::OnTimeTwice => None,
            ReturnRiskRule::EarlyThenOnTime => Some((Early, OnTime)),
            ReturnRiskRule::EarlyThenEarly => Some((Early, Early)),
            ReturnRiskRule::EarlyThenLate => Some((Early, Late)),
            ReturnRiskRule::LateThenOnTime => Some((Late, OnTime)),
            ReturnRiskRule::LateThenLate => Some((Late, Late)),
            ReturnRiskRule::LateThenEarly => Some((Late, Early)),
        }
    }

    pub fn matches(&self, history: &BorrowingHistory, returned_on: NaiveDate) -> bool {
        match self {
            ReturnRiskRule::InitialReturn => !history.has_prior_loan(),
            ReturnRiskRule::OnTimeTwice => {
                history.prior_timing() == Some(ReturnTiming::OnTime)
                    && !history.current_due_date.is_unset()
            }
            _ => {
                let observed = history
                    .prior_timing()
                    .zip(history.current_timing(returned_on));
                observed == self.timing_pattern()
            }
        }
    }

    /// Grade a return. Only valid after [`ReturnRiskRule::matches`] held for
    /// the same input.
    pub fn evaluate(
        &self,
        history: &BorrowingHistory,
        returned_on: NaiveDate,
    ) -> Result<RiskVerdict, RuleViolation> {
        use ReturnTiming::{Early, Late, OnTime};

        if !self.matches(history, returned_on) {
            return Err(RuleViolation::PatternMismatch { rule: *self });
        }

        let current = history
            .current_timing(returned_on)
            .ok_or(RuleViolation::DueDateUnset { rule: *self })?;

        let (level, reason) = match (*self, current) {
            (ReturnRiskRule::InitialReturn, OnTime) => (
                RiskLevel::Low,
                "first time being returned and returned on time",
            ),
            (ReturnRiskRule::InitialReturn, Late) => (
                RiskLevel::Medium,
                "first time being returned and returned late",
            ),
            (ReturnRiskRule::InitialReturn, Early) => (
                RiskLevel::Low,
                "first time being returned and returned early",
            ),
            (ReturnRiskRule::OnTimeTwice, OnTime) => {
                (RiskLevel::Low, "returned on due date last 2 times")
            }
            (ReturnRiskRule::OnTimeTwice, Late) => (
                RiskLevel::Medium,
                "returned on due date last time but late this time",
            ),
            (ReturnRiskRule::OnTimeTwice, Early) => (
                RiskLevel::Medium,
                "returned on due date last time but early this time",
            ),
            (ReturnRiskRule::EarlyThenOnTime, _) => (
                RiskLevel::Low,
                "returned on early last time and on due date this time",
            ),
            (ReturnRiskRule::EarlyThenEarly, _) => (
                RiskLevel::Low,
                "returned early last time and early this time",
            ),
            (ReturnRiskRule::EarlyThenLate, _) => (
                RiskLevel::Medium,
                "returned early last time but late this time",
            ),
            (ReturnRiskRule::LateThenOnTime, _) => (
                RiskLevel::Medium,
                "returned late last time but on due date this time",
            ),
            (ReturnRiskRule::LateThenLate, _) => (
                RiskLevel::High,
                "returned late last time and late this time",
            ),
            (ReturnRiskRule::LateThenEarly, _) => (
                RiskLevel::Medium,
                "returned late last time but early this time",
            ),
        };

        Ok(RiskVerdict::fixed(level, reason))
    }
}

impl fmt::Display for ReturnRiskRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// First rule in `rules` whose pattern holds.
pub(crate) fn select_rule(
    rules: &[ReturnRiskRule],
    history: &BorrowingHistory,
    returned_on: NaiveDate,
) -> Option<ReturnRiskRule> {
    rules
        .iter()
        .copied()
        .find(|rule| rule.matches(history, returned_on))
}
