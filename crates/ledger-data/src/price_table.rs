//! Tax-adjusted hourly price table built from per-day price bundles.

use std::collections::{BTreeSet, HashMap};

use ledger_core::error::Result;
use ledger_core::keys::{day_key, hour_key, month_key};
use ledger_core::models::{PriceBundle, PriceRecord};
use ledger_core::tax::TaxRule;

/// Decode one day's price object body.
pub fn decode_bundle(body: &[u8]) -> Result<PriceBundle> {
    Ok(serde_json::from_slice(body)?)
}

/// Flatten `bundles` into tax-adjusted price records, preserving bundle order
/// and hour order within each bundle.
pub fn build_price_records(bundles: &[PriceBundle], tax: &TaxRule) -> Vec<PriceRecord> {
    bundles
        .iter()
        .flat_map(|bundle| bundle.hour_prices.iter())
        .map(|hp| {
            let hour = hour_key(&hp.start_time);
            let price = tax.apply(&hour, hp.price);
            PriceRecord { hour, price }
        })
        .collect()
}

// ── PriceTable ────────────────────────────────────────────────────────────────

/// Immutable price dataset with an hour index and day/month coverage.
///
/// When several records share an hour key the first one is used for lookups;
/// all of them stay in [`PriceTable::records`].
#[derive(Debug, Clone, Default)]
pub struct PriceTable {
    records: Vec<PriceRecord>,
    by_hour: HashMap<String, f64>,
    days: BTreeSet<String>,
    months: BTreeSet<String>,
}

impl PriceTable {
    /// Index an already tax-adjusted record sequence.
    pub fn from_records(records: Vec<PriceRecord>) -> Self {
        let mut by_hour = HashMap::with_capacity(records.len());
        let mut days = BTreeSet::new();
        let mut months = BTreeSet::new();

        for record in &records {
            by_hour.entry(record.hour.clone()).or_insert(record.price);
            days.insert(day_key(&record.hour).to_string());
            months.insert(month_key(&record.hour).to_string());
        }

        Self {
            records,
            by_hour,
            days,
            months,
        }
    }

    /// Build the table from raw day bundles, applying `tax` to every hour.
    pub fn build(bundles: &[PriceBundle], tax: &TaxRule) -> Self {
        Self::from_records(build_price_records(bundles, tax))
    }

    /// Price for `hour`, if any record covers it.
    pub fn price_for(&self, hour: &str) -> Option<f64> {
        self.by_hour.get(hour).copied()
    }

    /// `true` when at least one record falls on `day`.
    pub fn has_day(&self, day: &str) -> bool {
        self.days.contains(day)
    }

    /// Month keys covered by at least one record, ascending.
    pub fn months(&self) -> &BTreeSet<String> {
        &self.months
    }

    /// The flat `{hour, price}` sequence in build order.
    pub fn records(&self) -> &[PriceRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
