//! Audit run orchestration.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, Days, NaiveDate, Utc};
use futures::stream::{self, StreamExt};
use huangpu_audit::{ReconcileInput, ScanInput, reconcile_bars, scan_bars};
use huangpu_calendar::TradingCalendar;
use huangpu_store::MarketStore;
use huangpu_types::{CheckType, Issue, IssueDraft, Provider, Result, RunId, Watermark};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Configuration for an audit runner.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Maximum in-flight instrument tasks.
    pub concurrency: usize,
    /// Issue-buffer size that triggers a flush to storage.
    pub batch_size: usize,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            concurrency: 8,
            batch_size: 2000,
        }
    }
}

/// Status of a per-instrument audit task.
///
/// Transitions only move forward: `Pending -> Running -> {Completed,
/// Failed}`. Failed is terminal and does not affect sibling tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskStatus {
    /// Task is queued but not yet started.
    #[default]
    Pending,
    /// Task is currently running.
    Running,
    /// Task completed and its drafts are in the result stream.
    Completed,
    /// Task failed; it is excluded from the result stream.
    Failed,
}

impl TaskStatus {
    /// Returns true if the task is in a terminal state.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// Outcome of one per-instrument task.
#[derive(Debug, Clone)]
pub struct TaskOutcome {
    /// The instrument this task covered.
    pub symbol: String,
    /// Terminal status of the task.
    pub status: TaskStatus,
    /// Issue drafts found (empty on failure).
    pub drafts: Vec<IssueDraft>,
    /// Most recent trade date examined; staged as the new watermark.
    pub latest_date: Option<NaiveDate>,
    /// Error message when the task failed.
    pub error: Option<String>,
}

impl TaskOutcome {
    fn completed(symbol: String, drafts: Vec<IssueDraft>, latest_date: Option<NaiveDate>) -> Self {
        Self {
            symbol,
            status: TaskStatus::Completed,
            drafts,
            latest_date,
            error: None,
        }
    }

    fn failed(symbol: String, error: String) -> Self {
        Self {
            symbol,
            status: TaskStatus::Failed,
            drafts: Vec::new(),
            latest_date: None,
            error: Some(error),
        }
    }
}

/// Aggregate counts reported at the end of a run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Identifier stamped onto every issue from this run.
    pub run_id: RunId,
    /// Run-scoped timestamp stamped onto every issue.
    pub started_at: DateTime<Utc>,
    /// Which audit this run performed.
    pub check_type: CheckType,
    /// Instruments scanned to completion.
    pub symbols_processed: usize,
    /// Instruments whose task failed and will be retried next run.
    pub symbols_failed: usize,
    /// Issues persisted across all flushed batches.
    pub issues_found: usize,
}

/// Observer for per-task completion, e.g. a CLI progress bar.
pub trait ProgressSink: Send + Sync {
    /// Called once per instrument when its task reaches a terminal state.
    fn on_symbol_done(&self, symbol: &str, status: TaskStatus);
}

/// Progress sink that ignores all events.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn on_symbol_done(&self, _symbol: &str, _status: TaskStatus) {}
}

/// Fans audits out across the instrument universe and persists the
/// resulting issues in bounded batches.
///
/// The calendar is fetched once at construction and shared read-only with
/// every task; the store is the only shared mutable resource and is only
/// written through upserts and append-only inserts.
#[derive(Debug)]
pub struct AuditRunner<S> {
    store: Arc<S>,
    calendar: Arc<TradingCalendar>,
    config: RunnerConfig,
}

impl<S: MarketStore + 'static> AuditRunner<S> {
    /// Creates a runner over the given store and calendar.
    #[must_use]
    pub const fn new(store: Arc<S>, calendar: Arc<TradingCalendar>, config: RunnerConfig) -> Self {
        Self {
            store,
            calendar,
            config,
        }
    }

    /// Returns the underlying store.
    #[must_use]
    pub const fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Runs the single-source rule engine over `symbols` for one provider.
    ///
    /// Incremental by default: each instrument is scanned strictly after
    /// its watermark, and the watermark advances only after the batch
    /// holding its issues commits. `full_recheck` bypasses watermarks and scans
    /// every instrument's full history.
    ///
    /// # Errors
    ///
    /// Returns an error only on invocation-level failures; per-instrument
    /// faults are counted in the summary instead.
    pub async fn run_single_source(
        &self,
        symbols: &[String],
        provider: Provider,
        full_recheck: bool,
        progress: &dyn ProgressSink,
    ) -> Result<RunSummary> {
        info!(
            provider = %provider,
            symbols = symbols.len(),
            full_recheck,
            "starting single-source audit"
        );

        let outcomes = stream::iter(symbols.iter().cloned())
            .map(|symbol| {
                let store = Arc::clone(&self.store);
                let calendar = Arc::clone(&self.calendar);
                async move {
                    match scan_one(store.as_ref(), &calendar, &symbol, provider, full_recheck)
                        .await
                    {
                        Ok(outcome) => outcome,
                        Err(e) => TaskOutcome::failed(symbol, e.to_string()),
                    }
                }
            })
            .buffer_unordered(self.config.concurrency);

        self.collect(outcomes, CheckType::SingleSource, Some(provider), progress)
            .await
    }

    /// Reconciles two providers' series for every symbol.
    ///
    /// Cross-validation always covers the full joined range; watermarks
    /// are keyed by (symbol, provider) and belong to single-source scans.
    ///
    /// # Errors
    ///
    /// Returns an error only on invocation-level failures.
    pub async fn run_cross_validation(
        &self,
        symbols: &[String],
        provider_a: Provider,
        provider_b: Provider,
        progress: &dyn ProgressSink,
    ) -> Result<RunSummary> {
        info!(
            provider_a = %provider_a,
            provider_b = %provider_b,
            symbols = symbols.len(),
            "starting cross-source reconciliation"
        );

        let outcomes = stream::iter(symbols.iter().cloned())
            .map(|symbol| {
                let store = Arc::clone(&self.store);
                let calendar = Arc::clone(&self.calendar);
                async move {
                    match reconcile_one(store.as_ref(), &calendar, &symbol, provider_a, provider_b)
                        .await
                    {
                        Ok(drafts) => TaskOutcome::completed(symbol, drafts, None),
                        Err(e) => TaskOutcome::failed(symbol, e.to_string()),
                    }
                }
            })
            .buffer_unordered(self.config.concurrency);

        self.collect(outcomes, CheckType::CrossValidation, None, progress)
            .await
    }

    /// Single-threaded collection loop: buffers drafts, flushes batches,
    /// and stages watermarks with the batch that holds their issues.
    async fn collect(
        &self,
        mut outcomes: impl stream::Stream<Item = TaskOutcome> + Unpin,
        check_type: CheckType,
        provider: Option<Provider>,
        progress: &dyn ProgressSink,
    ) -> Result<RunSummary> {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();

        let mut buffer: Vec<Issue> = Vec::new();
        let mut staged: Vec<Watermark> = Vec::new();
        // Completed symbols whose issues or watermark ride on the current
        // batch; they flip to failed if that batch rolls back.
        let mut batch_symbols = 0usize;
        let mut processed = 0usize;
        let mut failed = 0usize;
        let mut issues_found = 0usize;

        while let Some(outcome) = outcomes.next().await {
            progress.on_symbol_done(&outcome.symbol, outcome.status);
            match outcome.status {
                TaskStatus::Completed => {
                    processed += 1;
                    let mut rides_batch = !outcome.drafts.is_empty();
                    if rides_batch {
                        debug!(
                            symbol = %outcome.symbol,
                            count = outcome.drafts.len(),
                            "issues found"
                        );
                    }
                    buffer.extend(outcome.drafts.into_iter().map(|draft| {
                        draft.into_issue(&outcome.symbol, check_type, run_id, started_at)
                    }));
                    if let (Some(provider), Some(latest)) = (provider, outcome.latest_date) {
                        staged.push(Watermark::new(outcome.symbol, provider, latest));
                        rides_batch = true;
                    }
                    if rides_batch {
                        batch_symbols += 1;
                    }
                    if buffer.len() >= self.config.batch_size {
                        let (flushed, rolled_back) = self.flush(&mut buffer, &mut staged).await;
                        issues_found += flushed;
                        if rolled_back {
                            processed -= batch_symbols;
                            failed += batch_symbols;
                        }
                        batch_symbols = 0;
                    }
                }
                TaskStatus::Failed => {
                    failed += 1;
                    warn!(
                        symbol = %outcome.symbol,
                        error = outcome.error.as_deref().unwrap_or("unknown"),
                        "task failed, watermark not advanced"
                    );
                }
                TaskStatus::Pending | TaskStatus::Running => {
                    // Outcomes are only emitted in terminal states.
                }
            }
        }

        let (flushed, rolled_back) = self.flush(&mut buffer, &mut staged).await;
        issues_found += flushed;
        if rolled_back {
            processed -= batch_symbols;
            failed += batch_symbols;
        }

        let summary = RunSummary {
            run_id,
            started_at,
            check_type,
            symbols_processed: processed,
            symbols_failed: failed,
            issues_found,
        };
        info!(
            run_id = %summary.run_id,
            processed = summary.symbols_processed,
            failed = summary.symbols_failed,
            issues = summary.issues_found,
            "run finished"
        );
        Ok(summary)
    }

    /// Flushes the issue buffer and, on success, writes staged watermarks.
    ///
    /// Returns the number of issues committed and whether the batch rolled
    /// back. A failed flush drops the staged watermarks so the affected
    /// instruments are re-examined next run; batches already committed
    /// earlier in the run stay committed.
    async fn flush(&self, buffer: &mut Vec<Issue>, staged: &mut Vec<Watermark>) -> (usize, bool) {
        let flushed = buffer.len();
        if flushed > 0 {
            if let Err(e) = self.store.insert_issues(buffer).await {
                error!(error = %e, batch = flushed, "batch flush failed, rolled back");
                buffer.clear();
                staged.clear();
                return (0, true);
            }
            buffer.clear();
        }

        for watermark in staged.drain(..) {
            if let Err(e) = self.store.upsert_watermark(watermark).await {
                warn!(error = %e, "watermark upsert failed, will re-scan");
            }
        }
        (flushed, false)
    }
}

/// One single-source scan: window computation, data loading, rule engine.
async fn scan_one<S: MarketStore>(
    store: &S,
    calendar: &TradingCalendar,
    symbol: &str,
    provider: Provider,
    full_recheck: bool,
) -> Result<TaskOutcome> {
    // Resume strictly after the watermark; the watermark bar itself comes
    // back as the seed for the first percentage-change computation.
    let floor = if full_recheck {
        None
    } else {
        store
            .watermark(symbol, provider)
            .await?
            .map(|mark| mark.checked_add_days(Days::new(1)).unwrap_or(mark))
    };

    let bars = store.bars_from(symbol, provider, floor).await?;
    // Nothing new since the watermark: only the seed bar (or nothing at
    // all) came back, so there is no window to report on.
    let has_new = bars
        .iter()
        .any(|b| floor.is_none_or(|f| b.trade_date >= f));
    if !has_new {
        return Ok(TaskOutcome::completed(symbol.to_string(), Vec::new(), None));
    }

    let actions = store.corporate_actions(symbol).await?;
    let factor_event_dates: BTreeSet<NaiveDate> =
        actions.iter().map(|a| a.event_date).collect();
    let suspensions: BTreeSet<NaiveDate> =
        store.suspension_dates(symbol).await?.into_iter().collect();

    let check_from = floor.unwrap_or(bars[0].trade_date);
    let latest = bars[bars.len() - 1].trade_date;

    let drafts = scan_bars(&ScanInput {
        bars: &bars,
        factor_event_dates: &factor_event_dates,
        suspensions: &suspensions,
        check_from: Some(check_from),
        calendar,
    });

    Ok(TaskOutcome::completed(
        symbol.to_string(),
        drafts,
        Some(latest),
    ))
}

/// One cross-source reconciliation over the full joined range.
async fn reconcile_one<S: MarketStore>(
    store: &S,
    calendar: &TradingCalendar,
    symbol: &str,
    provider_a: Provider,
    provider_b: Provider,
) -> Result<Vec<IssueDraft>> {
    let bars_a = store.bars_from(symbol, provider_a, None).await?;
    let bars_b = store.bars_from(symbol, provider_b, None).await?;
    let suspensions: BTreeSet<NaiveDate> =
        store.suspension_dates(symbol).await?.into_iter().collect();

    Ok(reconcile_bars(&ReconcileInput {
        bars_a: &bars_a,
        bars_b: &bars_b,
        provider_a,
        provider_b,
        suspensions: &suspensions,
        calendar,
    }))
}
