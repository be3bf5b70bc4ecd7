//! Human-readable rendering of energy, prices and costs.
//!
//! Prices and costs are carried in minor currency units (cents) throughout
//! the engine; only this module converts them to major units for display.

/// Placeholder shown for ratios that are undefined (no consumption).
pub const NO_DATA: &str = "no data";

/// Format a floating-point number with thousands separators and a fixed number
/// of decimal places.
///
/// ```
/// use ledger_core::formatting::format_number;
///
/// assert_eq!(format_number(1234.5, 1), "1,234.5");
/// assert_eq!(format_number(1234567.0, 0), "1,234,567");
/// assert_eq!(format_number(-9876.5, 1), "-9,876.5");
/// ```
pub fn format_number(value: f64, decimals: u32) -> String {
    let negative = value < 0.0;
    let abs_value = value.abs();

    // Nudge exact binary midpoints (1.005 and friends) up before rounding.
    let factor = 10_f64.powi(decimals as i32);
    let epsilon = f64::EPSILON * abs_value * factor;
    let rounded = ((abs_value * factor) + epsilon).round() / factor;

    let text = format!("{:.prec$}", rounded, prec = decimals as usize);
    let (int_part, frac_part) = match text.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (text.as_str(), None),
    };

    let mut result = group_thousands(int_part);
    if let Some(frac) = frac_part {
        result.push('.');
        result.push_str(frac);
    }

    if negative && rounded != 0.0 {
        format!("-{}", result)
    } else {
        result
    }
}

/// Format a cost given in cents as euros.
///
/// ```
/// use ledger_core::formatting::format_cost;
///
/// assert_eq!(format_cost(123_456.0), "€1,234.56");
/// assert_eq!(format_cost(0.0), "€0.00");
/// ```
pub fn format_cost(cents: f64) -> String {
    format!("€{}", format_number(cents / 100.0, 2))
}

/// Format an energy amount in kWh.
pub fn format_kwh(kwh: f64) -> String {
    format!("{} kWh", format_number(kwh, 2))
}

/// Format a unit price given in cents per kWh.
pub fn format_unit_price(cents_per_kwh: f64) -> String {
    format!("{} c/kWh", format_number(cents_per_kwh, 2))
}

/// Render an optional derived ratio, using [`NO_DATA`] when it is undefined.
///
/// ```
/// use ledger_core::formatting::{format_ratio, format_kwh};
///
/// assert_eq!(format_ratio(Some(2.5), format_kwh), "2.50 kWh");
/// assert_eq!(format_ratio(None, format_kwh), "no data");
/// ```
pub fn format_ratio(value: Option<f64>, render: impl Fn(f64) -> String) -> String {
    match value {
        Some(v) if v.is_finite() => render(v),
        _ => NO_DATA.to_string(),
    }
}

/// Insert commas every three digits from the right of an integer string.
fn group_thousands(s: &str) -> String {
    if s.len() <= 3 {
        return s.to_string();
    }
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    let lead = s.len() % 3;
    for (i, c) in s.chars().enumerate() {
        if i != 0 && i % 3 == lead {
            result.push(',');
        }
        result.push(c);
    }
    result
}
