//! Cross command implementation.
//!
//! Loads two providers' CSV exports into the run store and reconciles
//! their series symbol by symbol.

use crate::commands::{end_or_today, load_calendar, parse_date, resolve_symbols};
use crate::display::{Format, SymbolProgress, write_report};
use anyhow::{Result, ensure};
use huangpu_lib::prelude::*;
use std::path::PathBuf;
use std::sync::Arc;

/// Arguments for the cross command.
pub(crate) struct CrossArgs {
    pub(crate) data_dir_a: PathBuf,
    pub(crate) data_dir_b: PathBuf,
    pub(crate) provider_a: String,
    pub(crate) provider_b: String,
    pub(crate) symbols: Vec<String>,
    pub(crate) calendar: Option<PathBuf>,
    pub(crate) start: String,
    pub(crate) end: Option<String>,
    pub(crate) report: Option<PathBuf>,
    pub(crate) format: Format,
    pub(crate) concurrency: usize,
    pub(crate) batch_size: usize,
    pub(crate) quiet: bool,
}

/// Reconcile two providers' series against each other.
pub(crate) async fn cross(args: CrossArgs) -> Result<()> {
    let provider_a: Provider = args.provider_a.parse()?;
    let provider_b: Provider = args.provider_b.parse()?;
    ensure!(
        provider_a != provider_b,
        "Cross-validation needs two distinct providers"
    );
    let start = parse_date(&args.start)?;
    let end = end_or_today(args.end.as_deref())?;

    let symbols = resolve_symbols(args.symbols, &args.data_dir_a)?;
    ensure!(
        !symbols.is_empty(),
        "No symbols found in {}",
        args.data_dir_a.display()
    );

    let calendar = Arc::new(load_calendar(args.calendar.as_deref()).await);
    let store = Arc::new(MemoryStore::new());

    for (dir, provider) in [(&args.data_dir_a, provider_a), (&args.data_dir_b, provider_b)] {
        let source = Arc::new(CsvBarSource::new(dir, provider));
        let ingest = run_update(&store, &source, &symbols, start, end, args.concurrency).await?;
        if !args.quiet {
            println!("Loaded {} bars from {provider}", ingest.bars_upserted);
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
        .run_cross_validation(&symbols, provider_a, provider_b, &progress)
        .await?;
    progress.finish(format!("{} issues found", summary.issues_found));

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
