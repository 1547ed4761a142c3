//! Storage collaborator contracts and reference stores.
//!
//! The audit core never talks to a database directly: it consumes the
//! [`MarketStore`] trait, which a relational backend implements elsewhere.
//! This crate ships two reference implementations:
//!
//! - [`MemoryStore`] - an in-process store used by tests and by the CLI's
//!   per-run composition;
//! - [`WatermarkState`] - JSON files under the application data directory,
//!   keeping audit watermarks across CLI invocations.

#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod memory;
mod state;

use async_trait::async_trait;
use chrono::NaiveDate;
use huangpu_types::{Bar, CorporateAction, FactorPoint, Issue, Provider, Result, Watermark};

pub use memory::MemoryStore;
pub use state::{StateError, StateResult, WatermarkState};

/// Storage contract consumed by the audit core.
///
/// All reads return series ordered ascending by trade date. Writes to
/// bars, factors, and watermarks are idempotent upserts on their natural
/// keys; issue writes are plain append-only inserts.
#[async_trait]
pub trait MarketStore: Send + Sync {
    /// Returns bars for one instrument and provider from `floor` onward.
    ///
    /// When `floor` is set, the result additionally includes the one bar
    /// strictly before it (if any) so the caller can seed the first
    /// percentage-change computation. `None` returns the full series.
    ///
    /// # Errors
    ///
    /// Returns an error on storage failure.
    async fn bars_from(
        &self,
        symbol: &str,
        provider: Provider,
        floor: Option<NaiveDate>,
    ) -> Result<Vec<Bar>>;

    /// Returns the dense factor series for one instrument.
    ///
    /// # Errors
    ///
    /// Returns an error on storage failure.
    async fn factors(&self, symbol: &str) -> Result<Vec<FactorPoint>>;

    /// Returns the sparse corporate-action events for one instrument.
    ///
    /// # Errors
    ///
    /// Returns an error on storage failure.
    async fn corporate_actions(&self, symbol: &str) -> Result<Vec<CorporateAction>>;

    /// Returns the suspension dates for one instrument, ascending.
    ///
    /// # Errors
    ///
    /// Returns an error on storage failure.
    async fn suspension_dates(&self, symbol: &str) -> Result<Vec<NaiveDate>>;

    /// Reads the audit watermark for a (symbol, provider) pair.
    ///
    /// # Errors
    ///
    /// Returns an error on storage failure.
    async fn watermark(&self, symbol: &str, provider: Provider) -> Result<Option<NaiveDate>>;

    /// Upserts an audit watermark; an existing watermark never moves
    /// backwards.
    ///
    /// # Errors
    ///
    /// Returns an error on storage failure.
    async fn upsert_watermark(&self, watermark: Watermark) -> Result<()>;

    /// Appends a batch of issues. Never updates existing rows.
    ///
    /// # Errors
    ///
    /// Returns an error on storage failure; the caller must then treat
    /// every watermark staged with this batch as not advanced.
    async fn insert_issues(&self, issues: &[Issue]) -> Result<()>;

    /// Upserts bars on (symbol, provider, trade_date).
    ///
    /// # Errors
    ///
    /// Returns an error on storage failure.
    async fn upsert_bars(&self, provider: Provider, bars: &[Bar]) -> Result<()>;

    /// Upserts factor points on (symbol, trade_date).
    ///
    /// # Errors
    ///
    /// Returns an error on storage failure.
    async fn upsert_factors(&self, factors: &[FactorPoint]) -> Result<()>;

    /// Replaces the suspension dates for one instrument.
    ///
    /// # Errors
    ///
    /// Returns an error on storage failure.
    async fn replace_suspensions(&self, symbol: &str, dates: &[NaiveDate]) -> Result<()>;

    /// Returns the most recent stored bar date for one instrument, if any.
    ///
    /// # Errors
    ///
    /// Returns an error on storage failure.
    async fn last_bar_date(&self, symbol: &str, provider: Provider) -> Result<Option<NaiveDate>>;

    /// Returns all issues recorded so far, in insertion order.
    ///
    /// # Errors
    ///
    /// Returns an error on storage failure.
    async fn issues(&self) -> Result<Vec<Issue>>;
}
