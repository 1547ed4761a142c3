//! Clean command implementation.
//!
//! Runs the single-source rule engine over one provider's data: loads the
//! CSV export, expands halt announcements into suspension days, restores
//! watermarks from previous invocations, audits, and saves the advanced
//! watermarks back.

use crate::commands::{end_or_today, load_calendar, parse_date, resolve_symbols};
use crate::display::{Format, SymbolProgress, write_report};
use anyhow::{Result, ensure};
use huangpu_lib::prelude::*;
use huangpu_lib::{expand_suspensions, read_halt_announcements};
use std::path::PathBuf;
use std::sync::Arc;

/// Arguments for the clean command.
pub(crate) struct CleanArgs {
    pub(crate) data_dir: PathBuf,
    pub(crate) provider: String,
    pub(crate) symbols: Vec<String>,
    pub(crate) calendar: Option<PathBuf>,
    pub(crate) halts: Option<PathBuf>,
    pub(crate) start: String,
    pub(crate) end: Option<String>,
    pub(crate) full: bool,
    pub(crate) report: Option<PathBuf>,
    pub(crate) format: Format,
    pub(crate) concurrency: usize,
    pub(crate) batch_size: usize,
    pub(crate) state_dir: Option<PathBuf>,
    pub(crate) quiet: bool,
}

/// Audit one provider's daily bars.
pub(crate) async fn clean(args: CleanArgs) -> Result<()> {
    let provider: Provider = args.provider.parse()?;
    let start = parse_date(&args.start)?;
    let end = end_or_today(args.end.as_deref())?;

    let symbols = resolve_symbols(args.symbols, &args.data_dir)?;
    ensure!(
        !symbols.is_empty(),
        "No symbols found in {}",
        args.data_dir.display()
    );

    let calendar = Arc::new(load_calendar(args.calendar.as_deref()).await);
    let store = Arc::new(MemoryStore::new());
    let source = Arc::new(CsvBarSource::new(&args.data_dir, provider));

    // Load the export before auditing; the audit reads the store only.
    let ingest = run_update(&store, &source, &symbols, start, end, args.concurrency).await?;
    if !args.quiet {
        println!(
            "Loaded {} bars and {} factor points from {provider}",
            ingest.bars_upserted, ingest.factors_upserted
        );
    }

    if let Some(halts_path) = &args.halts {
        let halts = read_halt_announcements(halts_path).await?;
        let expanded = expand_suspensions(&calendar, &halts, end);
        for (symbol, days) in &expanded {
            store.replace_suspensions(symbol, days).await?;
        }
    }

    let state = match &args.state_dir {
        Some(dir) => WatermarkState::new(dir.clone())?,
        None => WatermarkState::with_default_path()?,
    };
    let mut marks = state.load(provider)?;
    if !args.full {
        for (symbol, date) in &marks {
            store
                .upsert_watermark(Watermark::new(symbol.clone(), provider, *date))
                .await?;
        }
    }

    let progress = SymbolProgress::new(symbols.len() as u64, args.quiet);
    let runner = AuditRunner::new(
        Arc::clone(&store),
        calendar,
        RunnerConfig {
            concurrency: args.concurrency,
            batch_size: args.batch_size,
        },
    );
    let summary = runner
        .run_single_source(&symbols, provider, args.full, &progress)
        .await?;
    progress.finish(format!("{} issues found", summary.issues_found));

    for symbol in &symbols {
        if let Some(date) = store.watermark(symbol, provider).await? {
            marks.insert(symbol.clone(), date);
        }
    }
    state.save(provider, &marks)?;

    if let Some(report) = &args.report {
        let issues = store.issues().await?;
        write_report(&issues, report, args.format.report())?;
        if !args.quiet {
            println!("Report written to: {}", report.display());
        }
    }

    if !args.quiet {
        println!(
            "Run {}: {} symbols processed, {} failed, {} issues",
            summary.run_id, summary.symbols_processed, summary.symbols_failed, summary.issues_found
        );
    }

    Ok(())
}
