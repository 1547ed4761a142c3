//! Update command implementation.
//!
//! Loads a provider's CSV export into the run store and synthesizes the
//! dense adjustment-factor series, reporting what would be persisted.

use crate::commands::{end_or_today, parse_date, resolve_symbols};
use anyhow::{Result, ensure};
use huangpu_lib::prelude::*;
use std::path::Path;
use std::sync::Arc;

/// Refresh bars and adjustment factors from a provider export.
pub(crate) async fn update(
    data_dir: &Path,
    provider_str: &str,
    symbols: Vec<String>,
    start_str: &str,
    end_str: Option<&str>,
    concurrency: usize,
    quiet: bool,
) -> Result<()> {
    let provider: Provider = provider_str.parse()?;
    let start = parse_date(start_str)?;
    let end = end_or_today(end_str)?;

    let symbols = resolve_symbols(symbols, data_dir)?;
    ensure!(
        !symbols.is_empty(),
        "No symbols found in {}",
        data_dir.display()
    );

    let store = Arc::new(MemoryStore::new());
    let source = Arc::new(CsvBarSource::new(data_dir, provider));

    let summary = run_update(&store, &source, &symbols, start, end, concurrency).await?;

    if !quiet {
        println!(
            "Updated {} symbols from {provider}: {} bars, {} factor points",
            summary.symbols_processed, summary.bars_upserted, summary.factors_upserted
        );
        if summary.symbols_failed > 0 {
            println!("{} symbols failed", summary.symbols_failed);
        }
    }

    Ok(())
}
