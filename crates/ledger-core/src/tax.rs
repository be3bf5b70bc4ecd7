//! Tax multiplier selection for raw spot prices.

use chrono::NaiveDate;

use crate::keys::day_key;

/// Multiplier applied inside the reduced-rate window (10 % VAT).
pub const REDUCED_MULTIPLIER: f64 = 1.10;

/// Multiplier applied everywhere else (24 % VAT).
pub const STANDARD_MULTIPLIER: f64 = 1.24;

/// Date-range rule that picks the tax multiplier for an hour.
///
/// Hours whose calendar day falls within `reduced_from ..= reduced_until` get
/// `reduced`, all others get `standard`.
#[derive(Debug, Clone, PartialEq)]
pub struct TaxRule {
    reduced_from: String,
    reduced_until: String,
    /// Multiplier inside the window.
    pub reduced: f64,
    /// Multiplier outside the window.
    pub standard: f64,
}

impl TaxRule {
    /// Build a rule with an inclusive reduced-rate window.
    pub fn new(reduced_from: NaiveDate, reduced_until: NaiveDate, reduced: f64, standard: f64) -> Self {
        Self {
            reduced_from: reduced_from.format("%Y-%m-%d").to_string(),
            reduced_until: reduced_until.format("%Y-%m-%d").to_string(),
            reduced,
            standard,
        }
    }

    /// Multiplier for the hour identified by `hour`.
    ///
    /// Compares the hour's day key against the window bounds as strings,
    /// which is calendar comparison for ISO day keys.
    pub fn multiplier_for(&self, hour: &str) -> f64 {
        let day = day_key(hour);
        if day >= self.reduced_from.as_str() && day <= self.reduced_until.as_str() {
            self.reduced
        } else {
            self.standard
        }
    }

    /// Apply the rule to a raw price.
    pub fn apply(&self, hour: &str, raw_price: f64) -> f64 {
        raw_price * self.multiplier_for(hour)
    }
}

impl Default for TaxRule {
    /// The 2022-12-01 ..= 2023-04-30 reduced VAT period.
    ///
    /// Historically the upper bound was written as `2023-04-31` and compared
    /// against full timestamps; comparing day keys against the real last day
    /// of April selects exactly the same hours.
    fn default() -> Self {
        Self::new(
            NaiveDate::from_ymd_opt(2022, 12, 1).unwrap_or_default(),
            NaiveDate::from_ymd_opt(2023, 4, 30).unwrap_or_default(),
            REDUCED_MULTIPLIER,
            STANDARD_MULTIPLIER,
        )
    }
}
