//! Data-quality issue records.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for an audit run.
pub type RunId = Uuid;

/// Severity of a data-quality issue.
///
/// Ordered so that `Warning < Error < Critical`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Likely explainable, needs no immediate action.
    Warning,
    /// Data is wrong or missing without a known explanation.
    Error,
    /// Data is missing from every source; downstream results are unsafe.
    Critical,
}

impl Severity {
    /// Returns the severity as a string identifier.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Critical => "critical",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Which audit produced an issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckType {
    /// Single-provider rule-engine scan.
    SingleSource,
    /// Two-provider reconciliation.
    CrossValidation,
}

impl CheckType {
    /// Returns the check type as a string identifier.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::SingleSource => "single_source",
            Self::CrossValidation => "cross_validation",
        }
    }
}

impl std::fmt::Display for CheckType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Classification of a data-quality finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    /// OHLC values are non-positive or internally inconsistent.
    PriceAnomaly,
    /// Close-to-close change beyond the volatility threshold.
    PriceJump,
    /// A calendar trading day with no bar from the provider.
    MissingDay,
    /// Two providers disagree on the close price.
    PriceMismatch,
    /// Exactly one provider is missing a trading day.
    OneSidedGap,
    /// Both providers are missing a calendar trading day.
    BothSidesMissing,
}

impl IssueKind {
    /// Returns the kind as a human-readable label.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::PriceAnomaly => "price anomaly",
            Self::PriceJump => "price jump",
            Self::MissingDay => "missing trading-day data",
            Self::PriceMismatch => "price inconsistency",
            Self::OneSidedGap => "one-sided missing data",
            Self::BothSidesMissing => "both sources missing trading-day data",
        }
    }
}

impl std::fmt::Display for IssueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An issue as emitted by the rule engine or reconciler.
///
/// Drafts carry only the per-date finding; symbol, check type, and run
/// identity are stamped by the orchestrator before persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueDraft {
    /// Trading date the finding refers to.
    pub trade_date: NaiveDate,
    /// Classification of the finding.
    pub kind: IssueKind,
    /// Severity of the finding.
    pub severity: Severity,
    /// Free-form detail string (prices, percentages, provider names).
    pub details: String,
}

impl IssueDraft {
    /// Creates a new issue draft.
    #[must_use]
    pub const fn new(
        trade_date: NaiveDate,
        kind: IssueKind,
        severity: Severity,
        details: String,
    ) -> Self {
        Self {
            trade_date,
            kind,
            severity,
            details,
        }
    }

    /// Promotes the draft to a persistable issue.
    #[must_use]
    pub fn into_issue(
        self,
        symbol: &str,
        check_type: CheckType,
        run_id: RunId,
        checked_at: DateTime<Utc>,
    ) -> Issue {
        Issue {
            symbol: symbol.to_string(),
            check_type,
            trade_date: self.trade_date,
            severity: self.severity,
            kind: self.kind,
            details: self.details,
            run_id,
            checked_at,
        }
    }
}

/// A persisted data-quality finding.
///
/// Issue rows are append-only; they are inserted in batches and never
/// mutated. `run_id` and `checked_at` are run-scoped so findings from
/// different runs are distinguishable without relying on insertion order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    /// Instrument identifier.
    pub symbol: String,
    /// Which audit produced this issue.
    pub check_type: CheckType,
    /// Trading date the finding refers to.
    pub trade_date: NaiveDate,
    /// Severity of the finding.
    pub severity: Severity,
    /// Classification of the finding.
    pub kind: IssueKind,
    /// Free-form detail string.
    pub details: String,
    /// Identifier of the run that produced this issue.
    pub run_id: RunId,
    /// Timestamp of the run that produced this issue.
    pub checked_at: DateTime<Utc>,
}
