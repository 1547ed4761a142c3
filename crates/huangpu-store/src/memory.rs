//! In-memory reference store.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use async_trait::async_trait;
use chrono::NaiveDate;
use huangpu_types::{Bar, CorporateAction, FactorPoint, Issue, Provider, Result, Watermark};
use tokio::sync::RwLock;

use crate::MarketStore;

type BarKey = (String, Provider);

#[derive(Debug, Default)]
struct Inner {
    bars: HashMap<BarKey, BTreeMap<NaiveDate, Bar>>,
    factors: HashMap<String, BTreeMap<NaiveDate, FactorPoint>>,
    actions: HashMap<String, BTreeMap<NaiveDate, CorporateAction>>,
    suspensions: HashMap<String, BTreeSet<NaiveDate>>,
    watermarks: HashMap<BarKey, Watermark>,
    issues: Vec<Issue>,
}

/// In-process [`MarketStore`] backed by ordered maps.
///
/// Used by tests and by the CLI, which composes a fresh store per run from
/// CSV inputs. All keys match the relational layout: bars by (symbol,
/// provider, date), factors by (symbol, date), watermarks by (symbol,
/// provider), issues append-only.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds corporate-action events (test/ingest helper).
    pub async fn seed_actions(&self, actions: &[CorporateAction]) {
        let mut inner = self.inner.write().await;
        for action in actions {
            inner
                .actions
                .entry(action.symbol.clone())
                .or_default()
                .insert(action.event_date, action.clone());
        }
    }
}

#[async_trait]
impl MarketStore for MemoryStore {
    async fn bars_from(
        &self,
        symbol: &str,
        provider: Provider,
        floor: Option<NaiveDate>,
    ) -> Result<Vec<Bar>> {
        let inner = self.inner.read().await;
        let Some(series) = inner.bars.get(&(symbol.to_string(), provider)) else {
            return Ok(Vec::new());
        };
        match floor {
            None => Ok(series.values().cloned().collect()),
            Some(floor) => {
                // One bar strictly before the floor seeds the first
                // percentage-change computation.
                let seed = series.range(..floor).next_back().map(|(_, b)| b.clone());
                let mut bars: Vec<Bar> = seed.into_iter().collect();
                bars.extend(series.range(floor..).map(|(_, b)| b.clone()));
                Ok(bars)
            }
        }
    }

    async fn factors(&self, symbol: &str) -> Result<Vec<FactorPoint>> {
        let inner = self.inner.read().await;
        Ok(inner
            .factors
            .get(symbol)
            .map(|series| series.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn corporate_actions(&self, symbol: &str) -> Result<Vec<CorporateAction>> {
        let inner = self.inner.read().await;
        Ok(inner
            .actions
            .get(symbol)
            .map(|series| series.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn suspension_dates(&self, symbol: &str) -> Result<Vec<NaiveDate>> {
        let inner = self.inner.read().await;
        Ok(inner
            .suspensions
            .get(symbol)
            .map(|dates| dates.iter().copied().collect())
            .unwrap_or_default())
    }

    async fn watermark(&self, symbol: &str, provider: Provider) -> Result<Option<NaiveDate>> {
        let inner = self.inner.read().await;
        Ok(inner
            .watermarks
            .get(&(symbol.to_string(), provider))
            .map(|w| w.last_checked))
    }

    async fn upsert_watermark(&self, watermark: Watermark) -> Result<()> {
        let mut inner = self.inner.write().await;
        match inner
            .watermarks
            .entry((watermark.symbol.clone(), watermark.provider))
        {
            std::collections::hash_map::Entry::Occupied(mut entry) => {
                entry.get_mut().advance_to(watermark.last_checked);
            }
            std::collections::hash_map::Entry::Vacant(entry) => {
                entry.insert(watermark);
            }
        }
        Ok(())
    }

    async fn insert_issues(&self, issues: &[Issue]) -> Result<()> {
        let mut inner = self.inner.write().await;
        inner.issues.extend_from_slice(issues);
        Ok(())
    }

    async fn upsert_bars(&self, provider: Provider, bars: &[Bar]) -> Result<()> {
        let mut inner = self.inner.write().await;
        for bar in bars {
            inner
                .bars
                .entry((bar.symbol.clone(), provider))
                .or_default()
                .insert(bar.trade_date, bar.clone());
        }
        Ok(())
    }

    async fn upsert_factors(&self, factors: &[FactorPoint]) -> Result<()> {
        let mut inner = self.inner.write().await;
        for point in factors {
            inner
                .factors
                .entry(point.symbol.clone())
                .or_default()
                .insert(point.trade_date, point.clone());
        }
        Ok(())
    }

    async fn replace_suspensions(&self, symbol: &str, dates: &[NaiveDate]) -> Result<()> {
        let mut inner = self.inner.write().await;
        inner
            .suspensions
            .insert(symbol.to_string(), dates.iter().copied().collect());
        Ok(())
    }

    async fn last_bar_date(&self, symbol: &str, provider: Provider) -> Result<Option<NaiveDate>> {
        let inner = self.inner.read().await;
        Ok(inner
            .bars
            .get(&(symbol.to_string(), provider))
            .and_then(|series| series.keys().next_back().copied()))
    }

    async fn issues(&self) -> Result<Vec<Issue>> {
        let inner = self.inner.read().await;
        Ok(inner.issues.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn bar(date: NaiveDate, close: f64) -> Bar {
        Bar::new("600519".to_string(), date, close, close, close, close, 1_000)
    }

    #[tokio::test]
    async fn test_bars_from_includes_seed_bar() {
        let store = MemoryStore::new();
        store
            .upsert_bars(
                Provider::Eastmoney,
                &[
                    bar(d(2023, 1, 2), 10.0),
                    bar(d(2023, 1, 3), 10.5),
                    bar(d(2023, 1, 4), 11.0),
                ],
            )
            .await
            .unwrap();

        let bars = store
            .bars_from("600519", Provider::Eastmoney, Some(d(2023, 1, 4)))
            .await
            .unwrap();
        let dates: Vec<_> = bars.iter().map(|b| b.trade_date).collect();
        assert_eq!(dates, vec![d(2023, 1, 3), d(2023, 1, 4)]);
    }

    #[tokio::test]
    async fn test_bars_from_floor_at_series_start_has_no_seed() {
        let store = MemoryStore::new();
        store
            .upsert_bars(Provider::Eastmoney, &[bar(d(2023, 1, 2), 10.0)])
            .await
            .unwrap();

        let bars = store
            .bars_from("600519", Provider::Eastmoney, Some(d(2023, 1, 2)))
            .await
            .unwrap();
        assert_eq!(bars.len(), 1);
    }

    #[tokio::test]
    async fn test_bar_upsert_is_idempotent() {
        let store = MemoryStore::new();
        let bars = [bar(d(2023, 1, 2), 10.0)];
        store.upsert_bars(Provider::Eastmoney, &bars).await.unwrap();
        store.upsert_bars(Provider::Eastmoney, &bars).await.unwrap();

        let stored = store
            .bars_from("600519", Provider::Eastmoney, None)
            .await
            .unwrap();
        assert_eq!(stored.len(), 1);
    }

    #[tokio::test]
    async fn test_providers_are_isolated() {
        let store = MemoryStore::new();
        store
            .upsert_bars(Provider::Eastmoney, &[bar(d(2023, 1, 2), 10.0)])
            .await
            .unwrap();

        let other = store
            .bars_from("600519", Provider::Baostock, None)
            .await
            .unwrap();
        assert!(other.is_empty());
    }

    #[tokio::test]
    async fn test_watermark_round_trip() {
        let store = MemoryStore::new();
        assert!(
            store
                .watermark("600519", Provider::Eastmoney)
                .await
                .unwrap()
                .is_none()
        );

        store
            .upsert_watermark(Watermark::new(
                "600519".to_string(),
                Provider::Eastmoney,
                d(2023, 6, 30),
            ))
            .await
            .unwrap();
        assert_eq!(
            store.watermark("600519", Provider::Eastmoney).await.unwrap(),
            Some(d(2023, 6, 30))
        );
    }

    #[tokio::test]
    async fn test_watermark_never_regresses() {
        let store = MemoryStore::new();
        store
            .upsert_watermark(Watermark::new(
                "600519".to_string(),
                Provider::Eastmoney,
                d(2023, 6, 30),
            ))
            .await
            .unwrap();

        store
            .upsert_watermark(Watermark::new(
                "600519".to_string(),
                Provider::Eastmoney,
                d(2023, 1, 31),
            ))
            .await
            .unwrap();

        assert_eq!(
            store.watermark("600519", Provider::Eastmoney).await.unwrap(),
            Some(d(2023, 6, 30))
        );
    }
}
