//! End-to-end report pipeline.
//!
//! Reads the consumption export and the price objects concurrently, then
//! folds the two immutable datasets into per-month summaries. The resulting
//! [`LedgerReport`] is the data contract with whatever renders it.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use ledger_core::error::{LedgerError, Result};
use ledger_core::models::{ConsumptionRecord, DayAggregate, MonthAggregate, PriceRecord};
use ledger_core::settings::{PriceStoreConfig, Settings};
use ledger_core::tax::TaxRule;
use ledger_data::aggregator::{compute_month_aggregate, daily_breakdown};
use ledger_data::eligibility::eligible_months;
use ledger_data::price_table::PriceTable;
use ledger_data::reader::parse_consumption;
use serde::Serialize;

use crate::price_loader::PriceLoader;
use crate::source::{self, PriceSource};

// ── Public types ──────────────────────────────────────────────────────────────

/// Everything needed to produce one report.
#[derive(Debug, Clone)]
pub struct ReportRequest {
    pub consumption_path: PathBuf,
    pub store: PriceStoreConfig,
    /// First day of price data.
    pub from: NaiveDate,
    /// Last day of price data, inclusive.
    pub until: NaiveDate,
    pub tax: TaxRule,
    /// Restrict the report to one month key.
    pub month: Option<String>,
    /// Attach the daily breakdown to every month.
    pub daily: bool,
    /// Attach the flat price sequence.
    pub include_prices: bool,
}

impl ReportRequest {
    /// Resolve a request from CLI settings, with `today` closing the default
    /// price range.
    pub fn from_settings(settings: &Settings, today: NaiveDate) -> Result<Self> {
        let (from, until) = settings.date_range(today)?;
        Ok(Self {
            consumption_path: settings.consumption.clone(),
            store: settings.price_store()?,
            from,
            until,
            tax: settings.tax_rule()?,
            month: settings.month.clone(),
            daily: settings.is_daily_view(),
            include_prices: settings.include_prices,
        })
    }
}

/// The two immutable inputs every aggregate is computed from.
#[derive(Debug, Clone)]
pub struct Datasets {
    pub consumption: Vec<ConsumptionRecord>,
    pub prices: PriceTable,
}

/// One eligible month with its derived ratios.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthSummary {
    #[serde(flatten)]
    pub aggregate: MonthAggregate,
    /// Average price per kWh in cents, `None` without consumption.
    pub average_price: Option<f64>,
    /// Average kWh per aggregated day, `None` without consumption.
    pub average_daily_kwh: Option<f64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub days: Vec<DayAggregate>,
}

impl MonthSummary {
    fn new(aggregate: MonthAggregate, days: Vec<DayAggregate>) -> Self {
        Self {
            average_price: aggregate.average_price(),
            average_daily_kwh: aggregate.average_daily_kwh(),
            aggregate,
            days,
        }
    }
}

/// Complete output of one run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerReport {
    /// RFC 3339 timestamp of report creation.
    pub generated_at: String,
    pub price_from: NaiveDate,
    pub price_until: NaiveDate,
    /// Number of price records loaded.
    pub price_hours: usize,
    /// Number of consumption records parsed.
    pub consumption_hours: usize,
    /// Eligible months, most recent first.
    pub months: Vec<MonthSummary>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub prices: Vec<PriceRecord>,
}

// ── Pipeline ──────────────────────────────────────────────────────────────────

/// Run the whole pipeline against the store described by `request`.
pub async fn run(request: &ReportRequest) -> Result<LedgerReport> {
    let source = source::from_config(&request.store)?;
    run_with_source(request, source).await
}

/// Run the pipeline with an explicit price source.
pub async fn run_with_source(
    request: &ReportRequest,
    source: Arc<dyn PriceSource>,
) -> Result<LedgerReport> {
    let datasets = load_datasets(request, source).await?;
    Ok(build_report(request, &datasets))
}

/// Read the consumption export and all price objects concurrently.
///
/// Both reads always run to completion; a consumption error is reported in
/// preference to a price error.
pub async fn load_datasets(
    request: &ReportRequest,
    source: Arc<dyn PriceSource>,
) -> Result<Datasets> {
    let loader = PriceLoader::new(source);

    let (consumption, prices) = tokio::join!(
        load_consumption(&request.consumption_path),
        loader.load_table(request.from, request.until, &request.tax),
    );

    let consumption = consumption?;
    let prices = prices?;

    tracing::info!(
        consumption = consumption.len(),
        prices = prices.len(),
        "datasets loaded"
    );

    Ok(Datasets {
        consumption,
        prices,
    })
}

/// Read and parse one consumption export.
pub async fn load_consumption(path: &Path) -> Result<Vec<ConsumptionRecord>> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| LedgerError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
    let records = parse_consumption(&text)?;
    tracing::debug!(
        "Loaded {} consumption records from {}",
        records.len(),
        path.display()
    );
    Ok(records)
}

/// Fold `datasets` into a report. Every month is recomputed from the full
/// datasets.
pub fn build_report(request: &ReportRequest, datasets: &Datasets) -> LedgerReport {
    let months = eligible_months(&datasets.consumption, &datasets.prices)
        .into_iter()
        .filter(|month| request.month.as_deref().map_or(true, |m| m == month))
        .map(|month| {
            let aggregate =
                compute_month_aggregate(&month, &datasets.prices, &datasets.consumption);
            let days = if request.daily {
                daily_breakdown(&month, &datasets.prices, &datasets.consumption)
            } else {
                Vec::new()
            };
            MonthSummary::new(aggregate, days)
        })
        .collect();

    let prices = if request.include_prices {
        datasets.prices.records().to_vec()
    } else {
        Vec::new()
    };

    LedgerReport {
        generated_at: Utc::now().to_rfc3339(),
        price_from: request.from,
        price_until: request.until,
        price_hours: datasets.prices.len(),
        consumption_hours: datasets.consumption.len(),
        months,
        prices,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
