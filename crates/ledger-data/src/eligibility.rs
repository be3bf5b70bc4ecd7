//! Months and days covered by both the consumption and the price dataset.

use std::collections::BTreeSet;

use ledger_core::keys::{day_key, month_key};
use ledger_core::models::ConsumptionRecord;

use crate::price_table::PriceTable;

/// Months present in both datasets, most recent first.
pub fn eligible_months(consumption: &[ConsumptionRecord], prices: &PriceTable) -> Vec<String> {
    let consumed: BTreeSet<&str> = consumption.iter().map(|c| month_key(&c.hour)).collect();

    consumed
        .into_iter()
        .rev()
        .filter(|month| prices.months().contains(*month))
        .map(str::to_string)
        .collect()
}

/// Days of `month` that have consumption and at least one price record,
/// ascending.
pub fn eligible_days(
    month: &str,
    consumption: &[ConsumptionRecord],
    prices: &PriceTable,
) -> Vec<String> {
    let days: BTreeSet<&str> = consumption
        .iter()
        .map(|c| day_key(&c.hour))
        .filter(|day| month_key(day) == month)
        .collect();

    days.into_iter()
        .filter(|day| prices.has_day(day))
        .map(str::to_string)
        .collect()
}
