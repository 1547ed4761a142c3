//! Ingest updater: bar refresh plus dense factor persistence.

use std::sync::Arc;

use chrono::{Days, NaiveDate};
use futures::stream::{self, StreamExt};
use huangpu_audit::synthesize_factors;
use huangpu_store::MarketStore;
use huangpu_types::{DateRange, Result};
use tracing::{debug, info, warn};

use crate::source::MarketDataSource;

/// Aggregate counts reported at the end of an ingest run.
#[derive(Debug, Clone, Default)]
pub struct IngestSummary {
    /// Instruments updated to completion.
    pub symbols_processed: usize,
    /// Instruments whose update failed.
    pub symbols_failed: usize,
    /// Bars upserted across all instruments.
    pub bars_upserted: usize,
    /// Factor points upserted across all instruments.
    pub factors_upserted: usize,
}

/// Refreshes bars and factor series for `symbols` from one provider.
///
/// Per instrument: resume from the day after the last stored bar (or
/// `default_start` for a first load), fetch and upsert new bars, then
/// refetch corporate actions and persist the synthesized dense factor
/// series over the instrument's full stored skeleton. Instrument failures
/// are logged and counted; they never abort the run.
///
/// # Errors
///
/// Returns an error only on invocation-level failures.
pub async fn run_update<S, D>(
    store: &Arc<S>,
    source: &Arc<D>,
    symbols: &[String],
    default_start: NaiveDate,
    end: NaiveDate,
    concurrency: usize,
) -> Result<IngestSummary>
where
    S: MarketStore + 'static,
    D: MarketDataSource + 'static,
{
    info!(
        provider = %source.provider(),
        symbols = symbols.len(),
        %end,
        "starting ingest"
    );

    let mut outcomes = stream::iter(symbols.iter().cloned())
        .map(|symbol| {
            let store = Arc::clone(store);
            let source = Arc::clone(source);
            async move {
                let result =
                    update_one(store.as_ref(), source.as_ref(), &symbol, default_start, end)
                        .await;
                (symbol, result)
            }
        })
        .buffer_unordered(concurrency.max(1));

    let mut summary = IngestSummary::default();
    while let Some((symbol, result)) = outcomes.next().await {
        match result {
            Ok((bars, factors)) => {
                summary.symbols_processed += 1;
                summary.bars_upserted += bars;
                summary.factors_upserted += factors;
            }
            Err(e) => {
                summary.symbols_failed += 1;
                warn!(symbol = %symbol, error = %e, "ingest failed");
            }
        }
    }

    info!(
        processed = summary.symbols_processed,
        failed = summary.symbols_failed,
        bars = summary.bars_upserted,
        "ingest finished"
    );
    Ok(summary)
}

/// Updates one instrument: new bars, then the full factor series.
async fn update_one<S: MarketStore, D: MarketDataSource>(
    store: &S,
    source: &D,
    symbol: &str,
    default_start: NaiveDate,
    end: NaiveDate,
) -> Result<(usize, usize)> {
    let provider = source.provider();

    let resume = match store.last_bar_date(symbol, provider).await? {
        Some(last) => last.checked_add_days(Days::new(1)).unwrap_or(last),
        None => default_start,
    };

    let mut bars_upserted = 0;
    if resume <= end {
        let bars = source.fetch_bars(symbol, DateRange::new(resume, end)?).await?;
        if !bars.is_empty() {
            bars_upserted = bars.len();
            store.upsert_bars(provider, &bars).await?;
            debug!(symbol, count = bars_upserted, "bars staged");
        }
    }

    // The factor series is derived over the instrument's full stored
    // skeleton, so a new event retroactively rewrites history.
    let skeleton: Vec<NaiveDate> = store
        .bars_from(symbol, provider, None)
        .await?
        .iter()
        .map(|b| b.trade_date)
        .collect();
    if skeleton.is_empty() {
        return Ok((bars_upserted, 0));
    }

    let actions = source.fetch_corporate_actions(symbol).await?;
    let points = synthesize_factors(symbol, &skeleton, &actions)?;
    let factors_upserted = points.len();
    store.upsert_factors(&points).await?;

    Ok((bars_upserted, factors_upserted))
}
