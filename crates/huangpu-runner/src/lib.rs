//! Concurrency orchestrator and ingest pipeline for huangpu audits.
//!
//! The orchestrator fans audit tasks out across the instrument universe
//! with a bounded number of in-flight tasks, collects per-task outcomes on
//! a single loop, and commits issues to storage in bounded batches. Task
//! failures are isolated: a failing instrument is logged and counted, and
//! its watermark is left untouched so the next run retries the same window.

#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod ingest;
mod orchestrator;
mod source;
mod suspend;

pub use ingest::{IngestSummary, run_update};
pub use orchestrator::{
    AuditRunner, NoProgress, ProgressSink, RunSummary, RunnerConfig, TaskOutcome, TaskStatus,
};
pub use source::{CsvBarSource, FileCalendarSource, MarketDataSource, read_halt_announcements};
pub use suspend::{HaltAnnouncement, expand_suspensions};
