//! Audit core: factor synthesis, single-source rules, cross-source
//! reconciliation.
//!
//! Everything in this crate is stateless and side-effect-free: functions
//! take ordered series and sets, and return ordered [`IssueDraft`] lists
//! or dense factor series. Persistence, parallel fan-out, and watermark
//! bookkeeping live in `huangpu-runner`.
//!
//! [`IssueDraft`]: huangpu_types::IssueDraft

#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod engine;
mod factors;
mod reconcile;

pub use engine::{ScanInput, VOLATILITY_THRESHOLD, scan_bars};
pub use factors::synthesize_factors;
pub use reconcile::{CLOSE_DIVERGENCE_THRESHOLD, ReconcileInput, reconcile_bars};
