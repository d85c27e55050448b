use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Due date of the loan being closed. `Unset` marks a loan that was never
/// properly due-dated; no rule verdict is issued for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DueDate {
    #[default]
    Unset,
    On(NaiveDate),
}

impl DueDate {
    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            DueDate::Unset => None,
            DueDate::On(date) => Some(*date),
        }
    }

    pub fn is_unset(&self) -> bool {
        matches!(self, DueDate::Unset)
    }
}

impl From<Option<NaiveDate>> for DueDate {
    fn from(value: Option<NaiveDate>) -> Self {
        value.map(DueDate::On).unwrap_or(DueDate::Unset)
    }
}

impl From<NaiveDate> for DueDate {
    fn from(value: NaiveDate) -> Self {
        DueDate::On(value)
    }
}

impl fmt::Display for DueDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DueDate::Unset => f.write_str("unset"),
            DueDate::On(date) => write!(f, "{date}"),
        }
    }
}

impl Serialize for DueDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.date().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for DueDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Option::<NaiveDate>::deserialize(deserializer).map(DueDate::from)
    }
}

/// Where a return landed relative to its due date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReturnTiming {
    Early,
    OnTime,
    Late,
}

impl ReturnTiming {
    pub fn compare(returned: NaiveDate, due: NaiveDate) -> Self {
        match returned.cmp(&due) {
            Ordering::Less => ReturnTiming::Early,
            Ordering::Equal => ReturnTiming::OnTime,
            Ordering::Greater => ReturnTiming::Late,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ReturnTiming::Early => "early",
            ReturnTiming::OnTime => "on time",
            ReturnTiming::Late => "late",
        }
    }
}

/// Due-date snapshot of an item at the moment it comes back.
///
/// The prior-loan dates are expected to be present together or absent
/// together. A history with only one of them is treated as having no prior
/// loan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BorrowingHistory {
    #[serde(default)]
    pub last_due_date: Option<NaiveDate>,
    #[serde(default)]
    pub last_returned_date: Option<NaiveDate>,
    #[serde(default)]
    pub current_due_date: DueDate,
}

impl BorrowingHistory {
    /// History for an item that has never been loaned before.
    pub fn first_loan(current_due_date: impl Into<DueDate>) -> Self {
        Self {
            last_due_date: None,
            last_returned_date: None,
            current_due_date: current_due_date.into(),
        }
    }

    pub fn with_prior_loan(
        last_due_date: NaiveDate,
        last_returned_date: NaiveDate,
        current_due_date: impl Into<DueDate>,
    ) -> Self {
        Self {
            last_due_date: Some(last_due_date),
            last_returned_date: Some(last_returned_date),
            current_due_date: current_due_date.into(),
        }
    }

    pub fn has_prior_loan(&self) -> bool {
        self.last_due_date.is_some() && self.last_returned_date.is_some()
    }

    /// Timing of the previous loan, when both of its dates are known.
    pub fn prior_timing(&self) -> Option<ReturnTiming> {
        match (self.last_returned_date, self.last_due_date) {
            (Some(returned), Some(due)) => Some(ReturnTiming::compare(returned, due)),
            _ => None,
        }
    }

    /// Timing of the return being recorded now.
    pub fn current_timing(&self, returned_on: NaiveDate) -> Option<ReturnTiming> {
        self.current_due_date
            .date()
            .map(|due| ReturnTiming::compare(returned_on, due))
    }
}

/// Severity scale shared by rule verdicts and the fallback predictor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn label(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown risk level '{0}'")]
pub struct UnknownRiskLevel(pub String);

impl FromStr for RiskLevel {
    type Err = UnknownRiskLevel;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        let name = normalized.strip_suffix("risk").unwrap_or(&normalized);
        match name {
            "low" => Ok(RiskLevel::Low),
            "medium" => Ok(RiskLevel::Medium),
            "high" => Ok(RiskLevel::High),
            _ => Err(UnknownRiskLevel(value.to_string())),
        }
    }
}

/// Level plus the stable phrase describing which pattern produced it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RiskVerdict {
    level: RiskLevel,
    reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("risk verdict reason must not be empty")]
pub struct EmptyReason;

impl RiskVerdict {
    pub fn new(level: RiskLevel, reason: impl Into<String>) -> Result<Self, EmptyReason> {
        let reason = reason.into();
        if reason.trim().is_empty() {
            return Err(EmptyReason);
        }
        Ok(Self { level, reason })
    }

    pub(crate) fn fixed(level: RiskLevel, reason: &'static str) -> Self {
        Self {
            level,
            reason: reason.to_string(),
        }
    }

    pub fn level(&self) -> RiskLevel {
        self.level
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}

impl fmt::Display for RiskVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}Risk: {}", self.level, self.reason)
    }
}
