use serde::{Deserialize, Serialize};

/// One hourly meter reading from the consumption export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsumptionRecord {
    /// Hour key, e.g. `"2023-01-10T10"`.
    pub hour: String,
    /// Energy drawn during the hour.
    pub kwh: f64,
}

/// Tax-adjusted price for one hour, in minor currency units per kWh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRecord {
    /// Hour key, e.g. `"2023-01-10T10"`.
    pub hour: String,
    /// Final price after the tax multiplier.
    pub price: f64,
}

/// One raw `(startTime, price)` pair as published in a day's price object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HourPrice {
    pub start_time: String,
    pub price: f64,
}

/// Body of one day's price object: `{ "hourPrices": [...] }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceBundle {
    #[serde(default)]
    pub hour_prices: Vec<HourPrice>,
}

/// Consumption and cost totals for one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayAggregate {
    /// Day key, e.g. `"2023-01-10"`.
    pub day: String,
    pub kwh: f64,
    /// Cost in minor currency units.
    pub cost: f64,
}

/// Totals and extremes across the eligible days of one month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthAggregate {
    /// Month key, e.g. `"2023-01"`.
    pub month: String,
    /// Days actually aggregated (consumption and price coverage), not the
    /// calendar length of the month.
    pub day_count: usize,
    pub total_kwh: f64,
    /// Total cost in minor currency units.
    pub total_cost: f64,
    pub max_kwh_day: Option<DayAggregate>,
    pub max_cost_day: Option<DayAggregate>,
    pub min_kwh_day: Option<DayAggregate>,
    pub min_cost_day: Option<DayAggregate>,
}

impl MonthAggregate {
    /// An aggregate with no days folded in yet.
    pub fn empty(month: impl Into<String>) -> Self {
        Self {
            month: month.into(),
            day_count: 0,
            total_kwh: 0.0,
            total_cost: 0.0,
            max_kwh_day: None,
            max_cost_day: None,
            min_kwh_day: None,
            min_cost_day: None,
        }
    }

    /// Average price paid per kWh in minor currency units.
    ///
    /// `None` when nothing was consumed.
    pub fn average_price(&self) -> Option<f64> {
        if self.total_kwh == 0.0 {
            return None;
        }
        Some(self.total_cost / self.total_kwh)
    }

    /// Average consumption per aggregated day.
    ///
    /// `None` when nothing was consumed or no day was aggregated.
    pub fn average_daily_kwh(&self) -> Option<f64> {
        if self.total_kwh == 0.0 || self.day_count == 0 {
            return None;
        }
        Some(self.total_kwh / self.day_count as f64)
    }
}
