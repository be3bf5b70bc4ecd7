//! Plain-text tables for the monthly and daily views.
//!
//! One row per month (or per day) plus a totals row, with column widths
//! fitted to the widest cell.

use ledger_core::formatting::{
    format_cost, format_kwh, format_number, format_ratio, format_unit_price,
};
use ledger_core::models::DayAggregate;
use ledger_runtime::report::{LedgerReport, MonthSummary};

const MONTH_HEADER: [&str; 8] = [
    "Month",
    "Days",
    "Energy",
    "Cost",
    "Avg price",
    "Avg/day",
    "Peak day",
    "Costliest day",
];

const DAY_HEADER: [&str; 4] = ["Day", "Energy", "Cost", "Avg price"];

/// Render the whole report, month table first, then one day table per month
/// when the daily breakdown is present.
pub fn render_report(report: &LedgerReport) -> String {
    let mut out = format!(
        "Prices {} to {} ({} hours), {} consumption hours\n\n",
        report.price_from,
        report.price_until,
        format_number(report.price_hours as f64, 0),
        format_number(report.consumption_hours as f64, 0),
    );

    if report.months.is_empty() {
        out.push_str("No month has both consumption and price data.\n");
        return out;
    }

    out.push_str(&render_month_table(&report.months));

    for month in report.months.iter().filter(|m| !m.days.is_empty()) {
        out.push('\n');
        out.push_str(&format!("{}\n", month.aggregate.month));
        out.push_str(&render_day_table(&month.days));
    }

    out
}

/// One row per month plus a totals row.
pub fn render_month_table(months: &[MonthSummary]) -> String {
    let mut rows: Vec<Vec<String>> = months.iter().map(month_row).collect();

    let days: usize = months.iter().map(|m| m.aggregate.day_count).sum();
    let kwh: f64 = months.iter().map(|m| m.aggregate.total_kwh).sum();
    let cost: f64 = months.iter().map(|m| m.aggregate.total_cost).sum();
    rows.push(vec![
        "TOTAL".to_string(),
        days.to_string(),
        format_kwh(kwh),
        format_cost(cost),
        format_ratio(ratio(cost, kwh), format_unit_price),
        format_ratio(daily_average(kwh, days), format_kwh),
        String::new(),
        String::new(),
    ]);

    layout(&MONTH_HEADER, &rows)
}

/// One row per day plus a totals row.
pub fn render_day_table(days: &[DayAggregate]) -> String {
    let mut rows: Vec<Vec<String>> = days
        .iter()
        .map(|d| {
            vec![
                d.day.clone(),
                format_kwh(d.kwh),
                format_cost(d.cost),
                format_ratio(ratio(d.cost, d.kwh), format_unit_price),
            ]
        })
        .collect();

    let kwh: f64 = days.iter().map(|d| d.kwh).sum();
    let cost: f64 = days.iter().map(|d| d.cost).sum();
    rows.push(vec![
        "TOTAL".to_string(),
        format_kwh(kwh),
        format_cost(cost),
        format_ratio(ratio(cost, kwh), format_unit_price),
    ]);

    layout(&DAY_HEADER, &rows)
}

fn month_row(summary: &MonthSummary) -> Vec<String> {
    let agg = &summary.aggregate;
    vec![
        agg.month.clone(),
        agg.day_count.to_string(),
        format_kwh(agg.total_kwh),
        format_cost(agg.total_cost),
        format_ratio(summary.average_price, format_unit_price),
        format_ratio(summary.average_daily_kwh, format_kwh),
        extreme(agg.max_kwh_day.as_ref(), |d| format_kwh(d.kwh)),
        extreme(agg.max_cost_day.as_ref(), |d| format_cost(d.cost)),
    ]
}

fn extreme(day: Option<&DayAggregate>, value: impl Fn(&DayAggregate) -> String) -> String {
    match day {
        Some(d) => format!("{} ({})", d.day, value(d)),
        None => "-".to_string(),
    }
}

fn ratio(cost: f64, kwh: f64) -> Option<f64> {
    (kwh != 0.0).then(|| cost / kwh)
}

fn daily_average(kwh: f64, days: usize) -> Option<f64> {
    (kwh != 0.0 && days > 0).then(|| kwh / days as f64)
}

/// Lay out `header` and `rows` as aligned columns. The first column is left
/// aligned, the rest right aligned. The last row is set off by a rule.
fn layout(header: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let rule = "-".repeat(widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1));

    let mut out = String::new();
    out.push_str(&join_cells(header.iter().copied(), &widths));
    out.push('\n');
    out.push_str(&rule);
    out.push('\n');
    for (i, row) in rows.iter().enumerate() {
        if i + 1 == rows.len() {
            out.push_str(&rule);
            out.push('\n');
        }
        out.push_str(&join_cells(row.iter().map(String::as_str), &widths));
        out.push('\n');
    }
    out
}

fn join_cells<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    let mut text = String::new();
    for (i, (cell, width)) in cells.zip(widths).enumerate() {
        if i > 0 {
            text.push_str("  ");
        }
        let pad = width.saturating_sub(cell.chars().count());
        if i == 0 {
            text.push_str(cell);
            text.push_str(&" ".repeat(pad));
        } else {
            text.push_str(&" ".repeat(pad));
            text.push_str(cell);
        }
    }
    text.trim_end().to_string()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
