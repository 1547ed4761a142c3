//! Command implementations for the huangpu CLI.

pub(crate) mod clean;
pub(crate) mod cross;
pub(crate) mod update;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use huangpu_lib::FileCalendarSource;
use huangpu_lib::prelude::*;
use std::path::Path;

/// Parses a `YYYY-MM-DD` date argument.
pub(crate) fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").with_context(|| format!("Invalid date: {s}"))
}

/// Parses an end-date argument, defaulting to today.
pub(crate) fn end_or_today(end: Option<&str>) -> Result<NaiveDate> {
    match end {
        Some(s) => parse_date(s),
        None => Ok(chrono::Utc::now().date_naive()),
    }
}

/// Resolves the symbol universe: explicit arguments, or every bar CSV in
/// the data directory.
pub(crate) fn resolve_symbols(explicit: Vec<String>, data_dir: &Path) -> Result<Vec<String>> {
    if !explicit.is_empty() {
        return Ok(explicit);
    }

    let mut symbols = Vec::new();
    let entries = std::fs::read_dir(data_dir)
        .with_context(|| format!("Cannot read data directory: {}", data_dir.display()))?;
    for entry in entries {
        let path = entry?.path();
        if path.extension().is_some_and(|ext| ext == "csv")
            && let Some(stem) = path.file_stem().and_then(|s| s.to_str())
            && !stem.ends_with(".actions")
        {
            symbols.push(stem.to_string());
        }
    }
    symbols.sort_unstable();
    Ok(symbols)
}

/// Loads the trading calendar from a file, or an empty calendar when no
/// file is given. An empty calendar disables continuity checks.
pub(crate) async fn load_calendar(path: Option<&Path>) -> TradingCalendar {
    match path {
        Some(path) => TradingCalendar::load(&FileCalendarSource::new(path)).await,
        None => TradingCalendar::unavailable(),
    }
}
