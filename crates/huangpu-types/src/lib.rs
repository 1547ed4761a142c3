//! Core types for the huangpu daily-bar audit toolkit.
//!
//! This crate provides the fundamental data structures used throughout
//! huangpu:
//!
//! - [`Bar`] - One trading day's OHLCV record for an instrument
//! - [`FactorPoint`] - Dense cumulative price-adjustment factors for one date
//! - [`CorporateAction`] - A sparse corporate-action ratio event
//! - [`Issue`] - A severity-tagged data-quality finding
//! - [`Provider`] - Enumerated upstream data provider
//! - [`Watermark`] - Last fully-checked date per (symbol, provider)
//! - [`DateRange`] - Closed date range with a day iterator

#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod bar;
mod date_range;
mod error;
mod factor;
mod issue;
mod provider;
mod watermark;

pub use bar::Bar;
pub use date_range::{DateRange, DayIterator};
pub use error::{DateRangeError, HuangpuError, Result};
pub use factor::{CorporateAction, FactorPoint};
pub use issue::{CheckType, Issue, IssueDraft, IssueKind, RunId, Severity};
pub use provider::{Provider, ProviderParseError};
pub use watermark::Watermark;
