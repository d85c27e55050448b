use super::common::*;
use crate::risk::{
    BorrowingHistory, DueDate, ReturnRiskRule, RiskLevel, RuleViolation, CATALOG,
};

fn matching_rules(history: &BorrowingHistory, returned_on: chrono::NaiveDate) -> Vec<ReturnRiskRule> {
    CATALOG
        .iter()
        .copied()
        .filter(|rule| rule.matches(history, returned_on))
        .collect()
}

#[test]
fn initial_return_grades_current_timing() {
    let history = BorrowingHistory::first_loan(today());
    let rule = ReturnRiskRule::InitialReturn;

    let cases = [
        (0, RiskLevel::Low, "first time being returned and returned on time"),
        (1, RiskLevel::Medium, "first time being returned and returned late"),
        (-1, RiskLevel::Low, "first time being returned and returned early"),
    ];

    for (offset, level, reason) in cases {
        assert!(rule.matches(&history, days(offset)));
        let verdict = rule.evaluate(&history, days(offset)).expect("rule applies");
        assert_eq!(verdict.level(), level, "offset {offset}");
        assert_eq!(verdict.reason(), reason);
    }
}

#[test]
fn initial_return_covers_half_populated_history() {
    let history = BorrowingHistory {
        last_due_date: Some(days(-10)),
        last_returned_date: None,
        current_due_date: DueDate::On(today()),
    };

    assert_eq!(
        matching_rules(&history, today()),
        vec![ReturnRiskRule::InitialReturn]
    );
}

#[test]
fn on_time_twice_grades_current_timing() {
    let history = prior_loan(0);
    let rule = ReturnRiskRule::OnTimeTwice;

    let cases = [
        (0, RiskLevel::Low, "returned on due date last 2 times"),
        (2, RiskLevel::Medium, "returned on due date last time but late this time"),
        (-2, RiskLevel::Medium, "returned on due date last time but early this time"),
    ];

    for (offset, level, reason) in cases {
        assert_eq!(matching_rules(&history, days(offset)), vec![rule]);
        let verdict = rule.evaluate(&history, days(offset)).expect("rule applies");
        assert_eq!(verdict.level(), level, "offset {offset}");
        assert_eq!(verdict.reason(), reason);
    }
}

#[test]
fn two_loan_patterns_select_exactly_one_rule() {
    let cases = [
        (
            -1,
            0,
            ReturnRiskRule::EarlyThenOnTime,
            RiskLevel::Low,
            "returned on early last time and on due date this time",
        ),
        (
            -1,
            -1,
            ReturnRiskRule::EarlyThenEarly,
            RiskLevel::Low,
            "returned early last time and early this time",
        ),
        (
            -1,
            1,
            ReturnRiskRule::EarlyThenLate,
            RiskLevel::Medium,
            "returned early last time but late this time",
        ),
        (
            1,
            0,
            ReturnRiskRule::LateThenOnTime,
            RiskLevel::Medium,
            "returned late last time but on due date this time",
        ),
        (
            1,
            1,
            ReturnRiskRule::LateThenLate,
            RiskLevel::High,
            "returned late last time and late this time",
        ),
        (
            1,
            -1,
            ReturnRiskRule::LateThenEarly,
            RiskLevel::Medium,
            "returned late last time but early this time",
        ),
    ];

    for (prior_offset, current_offset, rule, level, reason) in cases {
        let history = prior_loan(prior_offset);
        let returned_on = days(current_offset);

        assert_eq!(matching_rules(&history, returned_on), vec![rule]);
        let verdict = rule.evaluate(&history, returned_on).expect("rule applies");
        assert_eq!(verdict.level(), level, "{rule}");
        assert_eq!(verdict.reason(), reason);
    }
}

#[test]
fn catalog_patterns_never_overlap() {
    let shapes = [
        BorrowingHistory::first_loan(today()),
        prior_loan(-3),
        prior_loan(0),
        prior_loan(4),
    ];

    for history in shapes {
        for offset in -2..=2 {
            let matched = matching_rules(&history, days(offset));
            assert_eq!(matched.len(), 1, "{history:?} returned {offset}: {matched:?}");
        }
    }
}

#[test]
fn two_loan_rules_need_a_current_due_date() {
    let mut history = prior_loan(-1);
    history.current_due_date = DueDate::Unset;

    assert!(matching_rules(&history, today()).is_empty());

    history = prior_loan(0);
    history.current_due_date = DueDate::Unset;
    assert!(!ReturnRiskRule::OnTimeTwice.matches(&history, today()));
}

#[test]
fn evaluating_outside_the_pattern_is_a_violation() {
    let history = prior_loan(1);

    let err = ReturnRiskRule::EarlyThenEarly
        .evaluate(&history, days(-1))
        .expect_err("pattern does not hold");

    assert_eq!(
        err,
        RuleViolation::PatternMismatch {
            rule: ReturnRiskRule::EarlyThenEarly
        }
    );
}

#[test]
fn initial_return_without_due_date_is_a_violation() {
    let history = BorrowingHistory::first_loan(DueDate::Unset);

    assert!(ReturnRiskRule::InitialReturn.matches(&history, today()));
    assert_eq!(
        ReturnRiskRule::InitialReturn.evaluate(&history, today()),
        Err(RuleViolation::DueDateUnset {
            rule: ReturnRiskRule::InitialReturn
        })
    );
}

#[test]
fn rule_ids_are_stable() {
    let ids: Vec<&str> = CATALOG.iter().map(ReturnRiskRule::id).collect();
    assert_eq!(
        ids,
        [
            "initial_return",
            "on_time_twice",
            "early_then_on_time",
            "early_then_early",
            "early_then_late",
            "late_then_on_time",
            "late_then_late",
            "late_then_early",
        ]
    );
    assert_eq!(
        serde_json::to_string(&ReturnRiskRule::LateThenLate).expect("serializes"),
        "\"late_then_late\""
    );
}
