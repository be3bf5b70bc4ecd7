//! Joining consumption with prices into daily and monthly aggregates.
//!
//! Everything here is a pure function of the two immutable datasets; each
//! call recomputes from scratch.

use ledger_core::keys::day_key;
use ledger_core::models::{ConsumptionRecord, DayAggregate, MonthAggregate};

use crate::eligibility::eligible_days;
use crate::price_table::PriceTable;

// ── Day ───────────────────────────────────────────────────────────────────────

/// Join one day's consumption with the price table.
///
/// Hours without a price still count towards `kwh` but add nothing to `cost`.
pub fn compute_day_aggregate<'a>(
    day: &str,
    prices: &PriceTable,
    consumption: impl IntoIterator<Item = &'a ConsumptionRecord>,
) -> DayAggregate {
    let mut kwh = 0.0;
    let mut cost = 0.0;

    for record in consumption {
        kwh += record.kwh;
        if let Some(price) = prices.price_for(&record.hour) {
            cost += record.kwh * price;
        }
    }

    DayAggregate {
        day: day.to_string(),
        kwh,
        cost,
    }
}

/// Aggregates of every eligible day of `month`, ascending by day.
pub fn daily_breakdown(
    month: &str,
    prices: &PriceTable,
    consumption: &[ConsumptionRecord],
) -> Vec<DayAggregate> {
    eligible_days(month, consumption, prices)
        .into_iter()
        .map(|day| {
            let records = consumption.iter().filter(|c| day_key(&c.hour) == day);
            compute_day_aggregate(&day, prices, records)
        })
        .collect()
}

// ── Month ─────────────────────────────────────────────────────────────────────

/// Fold the eligible days of `month` into totals and extremes.
///
/// Days are visited in ascending order. Extremes start at the first day and
/// move only on a strictly greater (or smaller) value, so ties keep the
/// earlier day.
pub fn compute_month_aggregate(
    month: &str,
    prices: &PriceTable,
    consumption: &[ConsumptionRecord],
) -> MonthAggregate {
    daily_breakdown(month, prices, consumption)
        .into_iter()
        .fold(MonthAggregate::empty(month), fold_day)
}

/// Add one day to a running month aggregate.
fn fold_day(mut agg: MonthAggregate, day: DayAggregate) -> MonthAggregate {
    agg.day_count += 1;
    agg.total_kwh += day.kwh;
    agg.total_cost += day.cost;

    replace_if(&mut agg.max_kwh_day, &day, |new, cur| new.kwh > cur.kwh);
    replace_if(&mut agg.min_kwh_day, &day, |new, cur| new.kwh < cur.kwh);
    replace_if(&mut agg.max_cost_day, &day, |new, cur| new.cost > cur.cost);
    replace_if(&mut agg.min_cost_day, &day, |new, cur| new.cost < cur.cost);

    agg
}

/// Seed `slot` with `day`, or replace it when `better(day, current)` holds.
fn replace_if(
    slot: &mut Option<DayAggregate>,
    day: &DayAggregate,
    better: impl Fn(&DayAggregate, &DayAggregate) -> bool,
) {
    let replace = match slot {
        Some(current) => better(day, current),
        None => true,
    };
    if replace {
        *slot = Some(day.clone());
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
