//! Data-quality audit toolkit for A-share daily bars.
//!
//! This is a facade crate that re-exports functionality from the huangpu
//! workspace crates for convenient access.
//!
//! # Quick Start
//!
//! ```ignore
//! use huangpu_lib::prelude::*;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Arc::new(MemoryStore::new());
//!     let calendar = Arc::new(TradingCalendar::from_dates([
//!         chrono::NaiveDate::from_ymd_opt(2023, 1, 3).unwrap(),
//!         chrono::NaiveDate::from_ymd_opt(2023, 1, 4).unwrap(),
//!     ]));
//!
//!     let runner = AuditRunner::new(store, calendar, RunnerConfig::default());
//!     let summary = runner
//!         .run_single_source(&["600519".to_string()], Provider::Eastmoney, false, &NoProgress)
//!         .await?;
//!     println!("{} issues found", summary.issues_found);
//!
//!     Ok(())
//! }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Re-export core types
pub use huangpu_types::*;

// Re-export the trading calendar
pub use huangpu_calendar::{CalendarSource, TradingCalendar};

// Re-export audit checks
#[cfg(feature = "audit")]
pub use huangpu_audit::{
    CLOSE_DIVERGENCE_THRESHOLD, ReconcileInput, ScanInput, VOLATILITY_THRESHOLD, reconcile_bars,
    scan_bars, synthesize_factors,
};

// Re-export storage
#[cfg(feature = "store")]
pub use huangpu_store::{MarketStore, MemoryStore, StateError, WatermarkState};

// Re-export the orchestrator and ingest pipeline
#[cfg(feature = "runner")]
pub use huangpu_runner::{
    AuditRunner, CsvBarSource, FileCalendarSource, HaltAnnouncement, IngestSummary,
    MarketDataSource, NoProgress, ProgressSink, RunSummary, RunnerConfig, TaskOutcome, TaskStatus,
    expand_suspensions, read_halt_announcements, run_update,
};

// Re-export report formatters
#[cfg(feature = "format")]
pub use huangpu_format::{CsvFormatter, FormatError, Formatter, JsonFormatter, ReportFormat};

/// Prelude module for convenient imports.
///
/// ```
/// use huangpu_lib::prelude::*;
/// ```
pub mod prelude {
    pub use huangpu_types::{
        Bar, CheckType, CorporateAction, DateRange, FactorPoint, HuangpuError, Issue, IssueKind,
        Provider, Result, Severity, Watermark,
    };

    pub use huangpu_calendar::{CalendarSource, TradingCalendar};

    #[cfg(feature = "audit")]
    pub use huangpu_audit::{ReconcileInput, ScanInput, reconcile_bars, scan_bars};

    #[cfg(feature = "store")]
    pub use huangpu_store::{MarketStore, MemoryStore, WatermarkState};

    #[cfg(feature = "runner")]
    pub use huangpu_runner::{
        AuditRunner, CsvBarSource, MarketDataSource, NoProgress, RunSummary, RunnerConfig,
        run_update,
    };

    #[cfg(feature = "format")]
    pub use huangpu_format::{CsvFormatter, Formatter, JsonFormatter, ReportFormat};
}
