//! Provider data-source contract and file-backed implementations.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::NaiveDate;
use csv_async::AsyncReaderBuilder;
use futures::StreamExt;
use huangpu_calendar::CalendarSource;
use huangpu_types::{Bar, CorporateAction, DateRange, HuangpuError, Provider, Result};
use serde::Deserialize;

use crate::suspend::HaltAnnouncement;

/// Upstream source of bars and corporate actions for one provider.
///
/// One concrete implementation exists per [`Provider`] variant, selected at
/// construction time. Implementations return empty collections for "no
/// data" and reserve errors for genuine transport failure.
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// The provider this source represents.
    fn provider(&self) -> Provider;

    /// Fetches unadjusted daily bars for one instrument in a date range.
    ///
    /// # Errors
    ///
    /// Returns an error only on transport failure.
    async fn fetch_bars(&self, symbol: &str, range: DateRange) -> Result<Vec<Bar>>;

    /// Fetches the sparse corporate-action events for one instrument.
    ///
    /// # Errors
    ///
    /// Returns an error only on transport failure.
    async fn fetch_corporate_actions(&self, symbol: &str) -> Result<Vec<CorporateAction>>;
}

#[derive(Debug, Deserialize)]
struct BarRecord {
    trade_date: NaiveDate,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: u64,
}

#[derive(Debug, Deserialize)]
struct ActionRecord {
    event_date: NaiveDate,
    fore_ratio: f64,
    back_ratio: f64,
}

#[derive(Debug, Deserialize)]
struct HaltRecord {
    symbol: String,
    start: NaiveDate,
    resumption: Option<NaiveDate>,
}

/// [`MarketDataSource`] over a directory of per-symbol CSV files.
///
/// Expects `<symbol>.csv` with a `trade_date,open,high,low,close,volume`
/// header and optionally `<symbol>.actions.csv` with
/// `event_date,fore_ratio,back_ratio`. A missing file means no data for
/// that instrument, matching the live-provider contract.
#[derive(Debug, Clone)]
pub struct CsvBarSource {
    root: PathBuf,
    provider: Provider,
}

impl CsvBarSource {
    /// Creates a source reading from `root` on behalf of `provider`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, provider: Provider) -> Self {
        Self {
            root: root.into(),
            provider,
        }
    }

    fn bars_path(&self, symbol: &str) -> PathBuf {
        self.root.join(format!("{symbol}.csv"))
    }

    fn actions_path(&self, symbol: &str) -> PathBuf {
        self.root.join(format!("{symbol}.actions.csv"))
    }
}

#[async_trait]
impl MarketDataSource for CsvBarSource {
    fn provider(&self) -> Provider {
        self.provider
    }

    async fn fetch_bars(&self, symbol: &str, range: DateRange) -> Result<Vec<Bar>> {
        let path = self.bars_path(symbol);
        if !path.exists() {
            return Ok(Vec::new());
        }

        let mut bars = Vec::new();
        let mut records = read_csv::<BarRecord>(&path).await?;
        while let Some(record) = records.next().await {
            let record = record.map_err(|e| csv_error(&path, &e))?;
            if range.contains(record.trade_date) {
                bars.push(Bar::new(
                    symbol.to_string(),
                    record.trade_date,
                    record.open,
                    record.high,
                    record.low,
                    record.close,
                    record.volume,
                ));
            }
        }
        bars.sort_by_key(|b| b.trade_date);
        Ok(bars)
    }

    async fn fetch_corporate_actions(&self, symbol: &str) -> Result<Vec<CorporateAction>> {
        let path = self.actions_path(symbol);
        if !path.exists() {
            return Ok(Vec::new());
        }

        let mut actions = Vec::new();
        let mut records = read_csv::<ActionRecord>(&path).await?;
        while let Some(record) = records.next().await {
            let record = record.map_err(|e| csv_error(&path, &e))?;
            actions.push(CorporateAction::new(
                symbol.to_string(),
                record.event_date,
                record.fore_ratio,
                record.back_ratio,
            ));
        }
        actions.sort_by_key(|a| a.event_date);
        Ok(actions)
    }
}

/// Reads halt announcements from a `symbol,start,resumption` CSV file.
///
/// A missing file is an empty list; `resumption` may be blank for
/// single-day halts.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub async fn read_halt_announcements(path: &Path) -> Result<Vec<HaltAnnouncement>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let mut announcements = Vec::new();
    let mut records = read_csv::<HaltRecord>(path).await?;
    while let Some(record) = records.next().await {
        let record = record.map_err(|e| csv_error(path, &e))?;
        announcements.push(HaltAnnouncement {
            symbol: record.symbol,
            start: record.start,
            resumption: record.resumption,
        });
    }
    Ok(announcements)
}

/// Calendar source over a text file with one `YYYY-MM-DD` date per line.
///
/// Blank lines and `#` comments are skipped.
#[derive(Debug, Clone)]
pub struct FileCalendarSource {
    path: PathBuf,
}

impl FileCalendarSource {
    /// Creates a calendar source reading from `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl CalendarSource for FileCalendarSource {
    async fn trading_days(&self) -> Result<Vec<NaiveDate>> {
        let contents = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| HuangpuError::Calendar(format!("{}: {e}", self.path.display())))?;

        let mut dates = Vec::new();
        for line in contents.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let date = line.parse::<NaiveDate>().map_err(|e| {
                HuangpuError::Calendar(format!("{}: bad date '{line}': {e}", self.path.display()))
            })?;
            dates.push(date);
        }
        Ok(dates)
    }
}

async fn read_csv<T>(
    path: &Path,
) -> Result<impl StreamExt<Item = std::result::Result<T, csv_async::Error>> + Unpin + use<T>>
where
    T: for<'de> Deserialize<'de> + Send + 'static,
{
    let file = tokio::fs::File::open(path).await?;
    let reader = AsyncReaderBuilder::new().create_deserializer(file);
    Ok(reader.into_deserialize::<T>())
}

fn csv_error(path: &Path, e: &csv_async::Error) -> HuangpuError {
    HuangpuError::Source(format!("{}: {e}", path.display()))
}
