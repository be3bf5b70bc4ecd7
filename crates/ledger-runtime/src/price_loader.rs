//! Settle-all acquisition of the daily price objects.
//!
//! Every day in the range is requested concurrently. The loader waits for all
//! requests to finish, successful or not, and only then decides: if any day
//! failed the whole load fails with every failure listed, otherwise the
//! bundles are returned in date order. Nothing is retried.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::anyhow;
use chrono::NaiveDate;
use ledger_core::error::{DayFailure, LedgerError, Result};
use ledger_core::models::PriceBundle;
use ledger_core::tax::TaxRule;
use ledger_data::price_table::{decode_bundle, PriceTable};
use tokio::task::{Id, JoinSet};

use crate::source::PriceSource;

/// Outcome of one day's request, kept until every request has settled.
struct DayOutcome {
    index: usize,
    key: String,
    result: Result<PriceBundle>,
}

/// Fetches and decodes one price object per calendar day.
pub struct PriceLoader {
    source: Arc<dyn PriceSource>,
}

impl PriceLoader {
    pub fn new(source: Arc<dyn PriceSource>) -> Self {
        Self { source }
    }

    /// Load and tax-adjust every day in `from ..= until`.
    pub async fn load_table(
        &self,
        from: NaiveDate,
        until: NaiveDate,
        tax: &TaxRule,
    ) -> Result<PriceTable> {
        let bundles = self.load_bundles(from, until).await?;
        let table = PriceTable::build(&bundles, tax);
        tracing::info!(
            days = bundles.len(),
            hours = table.len(),
            "price table built"
        );
        Ok(table)
    }

    /// Fetch and decode the bundle of every day in `from ..= until`, in date
    /// order.
    pub async fn load_bundles(&self, from: NaiveDate, until: NaiveDate) -> Result<Vec<PriceBundle>> {
        let days: Vec<NaiveDate> = from.iter_days().take_while(|d| *d <= until).collect();
        let total = days.len();

        let mut set = JoinSet::new();
        let mut pending: HashMap<Id, (usize, String)> = HashMap::with_capacity(total);
        for (index, day) in days.into_iter().enumerate() {
            let source = Arc::clone(&self.source);
            let key = source.key_for(day);
            let task_key = key.clone();
            let handle = set.spawn(async move {
                let result = match source.fetch(&task_key).await {
                    Ok(body) => decode_bundle(&body),
                    Err(e) => Err(e),
                };
                DayOutcome {
                    index,
                    key: task_key,
                    result,
                }
            });
            pending.insert(handle.id(), (index, key));
        }

        let mut outcomes = Vec::with_capacity(total);
        while let Some(joined) = set.join_next_with_id().await {
            match joined {
                Ok((id, outcome)) => {
                    pending.remove(&id);
                    outcomes.push(outcome);
                }
                Err(e) => {
                    let (index, key) = pending
                        .remove(&e.id())
                        .unwrap_or_else(|| (total, "<unknown>".to_string()));
                    outcomes.push(DayOutcome {
                        index,
                        key,
                        result: Err(anyhow!("fetch task failed: {e}").into()),
                    });
                }
            }
        }

        settle(outcomes, total)
    }
}

/// Classify the collected outcomes once every request has finished.
fn settle(mut outcomes: Vec<DayOutcome>, total: usize) -> Result<Vec<PriceBundle>> {
    outcomes.sort_by_key(|o| o.index);

    let mut bundles = Vec::with_capacity(outcomes.len());
    let mut failed = Vec::new();
    for outcome in outcomes {
        match outcome.result {
            Ok(bundle) => bundles.push(bundle),
            Err(e) => {
                tracing::warn!(key = %outcome.key, error = %e, "price object unavailable");
                failed.push(DayFailure {
                    key: outcome.key,
                    reason: e.to_string(),
                });
            }
        }
    }

    if !failed.is_empty() {
        return Err(LedgerError::FetchFailure { failed, total });
    }

    tracing::debug!(days = bundles.len(), "all price objects fetched");
    Ok(bundles)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// In-memory source. Keys missing from `objects` fail immediately; present
    /// keys answer after `delay`.
    struct MemorySource {
        objects: HashMap<String, String>,
        delay: Duration,
        calls: AtomicUsize,
        completed: AtomicUsize,
    }

    impl MemorySource {
        fn new(objects: &[(&str, &str)], delay: Duration) -> Self {
            Self {
                objects: objects
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
                delay,
                calls: AtomicUsize::new(0),
                completed: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl PriceSource for MemorySource {
        fn key_for(&self, day: NaiveDate) -> String {
            ledger_core::keys::object_key(day, ".json")
        }

        async fn fetch(&self, key: &str) -> Result<Vec<u8>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let Some(body) = self.objects.get(key) else {
                return Err(LedgerError::Config(format!("no object {key}")));
            };
            tokio::time::sleep(self.delay).await;
            self.completed.fetch_add(1, Ordering::SeqCst);
            Ok(body.as_bytes().to_vec())
        }
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn body(hour: &str, price: f64) -> String {
        format!(r#"{{"hourPrices":[{{"startTime":"{hour}:00:00Z","price":{price}}}]}}"#)
    }

    // ── success ───────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_load_bundles_in_date_order() {
        let b1 = body("2023-01-01T00", 1.0);
        let b2 = body("2023-01-02T00", 2.0);
        let b3 = body("2023-01-03T00", 3.0);
        let source = MemorySource::new(
            &[
                ("2023-01-01.json", b1.as_str()),
                ("2023-01-02.json", b2.as_str()),
                ("2023-01-03.json", b3.as_str()),
            ],
            Duration::from_millis(5),
        );
        let loader = PriceLoader::new(Arc::new(source));

        let bundles = loader
            .load_bundles(day(2023, 1, 1), day(2023, 1, 3))
            .await
            .unwrap();

        let starts: Vec<&str> = bundles
            .iter()
            .map(|b| b.hour_prices[0].start_time.as_str())
            .collect();
        assert_eq!(
            starts,
            vec!["2023-01-01T00:00:00Z", "2023-01-02T00:00:00Z", "2023-01-03T00:00:00Z"]
        );
    }

    #[tokio::test]
    async fn test_load_table_applies_tax() {
        let b1 = body("2023-01-10T10", 50.0);
        let source = MemorySource::new(&[("2023-01-10.json", b1.as_str())], Duration::ZERO);
        let loader = PriceLoader::new(Arc::new(source));

        let table = loader
            .load_table(day(2023, 1, 10), day(2023, 1, 10), &TaxRule::default())
            .await
            .unwrap();

        let price = table.price_for("2023-01-10T10").unwrap();
        assert!((price - 55.0).abs() < 1e-9);
    }

    // ── settle-all ────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_failure_waits_for_every_request() {
        let b2 = body("2023-01-02T00", 2.0);
        let b3 = body("2023-01-03T00", 3.0);
        // Day 1 fails at once; days 2 and 3 are slow.
        let source = Arc::new(MemorySource::new(
            &[("2023-01-02.json", b2.as_str()), ("2023-01-03.json", b3.as_str())],
            Duration::from_millis(50),
        ));
        let loader = PriceLoader::new(source.clone());

        let err = loader
            .load_bundles(day(2023, 1, 1), day(2023, 1, 3))
            .await
            .unwrap_err();

        assert_eq!(source.calls.load(Ordering::SeqCst), 3);
        assert_eq!(source.completed.load(Ordering::SeqCst), 2);
        match err {
            LedgerError::FetchFailure { failed, total } => {
                assert_eq!(total, 3);
                assert_eq!(failed.len(), 1);
                assert_eq!(failed[0].key, "2023-01-01.json");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_every_failure_is_reported() {
        let b2 = body("2023-01-02T00", 2.0);
        let source = MemorySource::new(&[("2023-01-02.json", b2.as_str())], Duration::ZERO);
        let loader = PriceLoader::new(Arc::new(source));

        let err = loader
            .load_bundles(day(2023, 1, 1), day(2023, 1, 3))
            .await
            .unwrap_err();

        match err {
            LedgerError::FetchFailure { failed, total } => {
                assert_eq!(total, 3);
                let keys: Vec<&str> = failed.iter().map(|f| f.key.as_str()).collect();
                assert_eq!(keys, vec!["2023-01-01.json", "2023-01-03.json"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    /// Source whose fetch panics for one key and succeeds for the rest.
    struct PanickingSource {
        panics_on: String,
        body: String,
    }

    #[async_trait]
    impl PriceSource for PanickingSource {
        fn key_for(&self, day: NaiveDate) -> String {
            ledger_core::keys::object_key(day, ".json")
        }

        async fn fetch(&self, key: &str) -> Result<Vec<u8>> {
            if key == self.panics_on {
                panic!("source exploded on {key}");
            }
            Ok(self.body.as_bytes().to_vec())
        }
    }

    #[tokio::test]
    async fn test_panicked_task_reports_its_day() {
        let source = PanickingSource {
            panics_on: "2023-01-02.json".to_string(),
            body: body("2023-01-01T00", 1.0),
        };
        let loader = PriceLoader::new(Arc::new(source));

        let err = loader
            .load_bundles(day(2023, 1, 1), day(2023, 1, 3))
            .await
            .unwrap_err();

        match err {
            LedgerError::FetchFailure { failed, total } => {
                assert_eq!(total, 3);
                assert_eq!(failed.len(), 1);
                assert_eq!(failed[0].key, "2023-01-02.json");
                assert!(failed[0].reason.contains("fetch task failed"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_undecodable_object_fails_the_load() {
        let source = MemorySource::new(&[("2023-01-01.json", "not json")], Duration::ZERO);
        let loader = PriceLoader::new(Arc::new(source));

        let result = loader
            .load_table(day(2023, 1, 1), day(2023, 1, 1), &TaxRule::default())
            .await;

        assert!(matches!(result, Err(LedgerError::FetchFailure { .. })));
    }

    #[tokio::test]
    async fn test_empty_range_yields_no_bundles() {
        let source = MemorySource::new(&[], Duration::ZERO);
        let loader = PriceLoader::new(Arc::new(source));

        let bundles = loader
            .load_bundles(day(2023, 1, 2), day(2023, 1, 1))
            .await
            .unwrap();
        assert!(bundles.is_empty());
    }
}
