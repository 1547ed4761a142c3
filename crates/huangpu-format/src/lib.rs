//! Issue-report formatters for the huangpu audit toolkit.
//!
//! This crate provides formatters for writing audit findings to report
//! files:
//!
//! - [`CsvFormatter`] - CSV format
//! - [`JsonFormatter`] - JSON array or NDJSON format

#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod csv;
mod formatter;
mod json;

pub use crate::csv::CsvFormatter;
pub use formatter::{FormatError, Formatter, ReportFormat};
pub use json::{JsonFormatter, JsonStyle};
