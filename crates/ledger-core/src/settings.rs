use std::path::PathBuf;

use chrono::NaiveDate;
use clap::Parser;
use reqwest::Url;

use crate::error::{LedgerError, Result};
use crate::tax::{TaxRule, REDUCED_MULTIPLIER, STANDARD_MULTIPLIER};

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Hourly electricity cost from a meter export and spot prices
#[derive(Parser, Debug, Clone)]
#[command(
    name = "spot-ledger",
    about = "Hourly electricity cost from a meter export and spot prices",
    version
)]
pub struct Settings {
    /// Consumption export (semicolon-separated, decimal comma)
    pub consumption: PathBuf,

    /// Directory holding one price object per day
    #[arg(long)]
    pub price_dir: Option<PathBuf>,

    /// Base URL of the price object store
    #[arg(long, env = "PRICE_STORE_URL")]
    pub price_url: Option<Url>,

    /// Bearer token for the price object store
    #[arg(long, env = "PRICE_STORE_TOKEN", hide_env_values = true)]
    pub price_token: Option<String>,

    /// Suffix appended to the ISO date to form a price object key
    #[arg(long, default_value = ".json")]
    pub object_suffix: String,

    /// First day of price data to fetch
    #[arg(long, default_value = "2022-01-01")]
    pub epoch: NaiveDate,

    /// Last day of price data to fetch (defaults to today)
    #[arg(long)]
    pub until: Option<NaiveDate>,

    /// First day of the reduced VAT period
    #[arg(long, default_value = "2022-12-01")]
    pub reduced_vat_from: NaiveDate,

    /// Last day of the reduced VAT period
    #[arg(long, default_value = "2023-04-30")]
    pub reduced_vat_until: NaiveDate,

    /// Only report this month (YYYY-MM)
    #[arg(long)]
    pub month: Option<String>,

    /// Report view
    #[arg(long, default_value = "monthly", value_parser = ["monthly", "daily"])]
    pub view: String,

    /// Output format
    #[arg(long, default_value = "table", value_parser = ["table", "json"])]
    pub format: String,

    /// Include the flat hourly price sequence in JSON output
    #[arg(long)]
    pub include_prices: bool,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"])]
    pub log_level: String,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

// ── PriceStoreConfig ───────────────────────────────────────────────────────────

/// Where day price objects live. Passed explicitly into the price loader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PriceStoreConfig {
    /// Objects are files named `<key>` under `root`.
    Directory { root: PathBuf, suffix: String },
    /// Objects are fetched with `GET <base_url>/<key>`.
    Http {
        base_url: Url,
        token: Option<String>,
        suffix: String,
    },
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Parse CLI arguments and apply the `--debug` override.
    pub fn load() -> Self {
        Self::load_from(std::env::args_os())
    }

    /// Same as [`Settings::load`] but with an explicit argument list.
    pub fn load_from<I, T>(args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let mut settings = Settings::parse_from(args);
        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }
        settings
    }

    /// Resolve the configured price source.
    pub fn price_store(&self) -> Result<PriceStoreConfig> {
        let suffix = self.object_suffix.clone();
        match (&self.price_dir, &self.price_url) {
            (Some(root), None) => Ok(PriceStoreConfig::Directory {
                root: root.clone(),
                suffix,
            }),
            (None, Some(base_url)) => Ok(PriceStoreConfig::Http {
                base_url: base_url.clone(),
                token: self.price_token.clone(),
                suffix,
            }),
            (Some(_), Some(_)) => Err(LedgerError::Config(
                "--price-dir and --price-url are mutually exclusive".to_string(),
            )),
            (None, None) => Err(LedgerError::Config(
                "one of --price-dir or --price-url is required".to_string(),
            )),
        }
    }

    /// Inclusive day range of price objects to fetch, ending at `today`
    /// unless `--until` is given.
    pub fn date_range(&self, today: NaiveDate) -> Result<(NaiveDate, NaiveDate)> {
        let until = self.until.unwrap_or(today);
        if until < self.epoch {
            return Err(LedgerError::Config(format!(
                "price range is empty: {} is after {}",
                self.epoch, until
            )));
        }
        Ok((self.epoch, until))
    }

    /// Tax rule with the configured reduced-rate window.
    pub fn tax_rule(&self) -> Result<TaxRule> {
        if self.reduced_vat_until < self.reduced_vat_from {
            return Err(LedgerError::Config(format!(
                "reduced VAT period ends ({}) before it starts ({})",
                self.reduced_vat_until, self.reduced_vat_from
            )));
        }
        Ok(TaxRule::new(
            self.reduced_vat_from,
            self.reduced_vat_until,
            REDUCED_MULTIPLIER,
            STANDARD_MULTIPLIER,
        ))
    }

    /// `true` when the daily breakdown was requested.
    pub fn is_daily_view(&self) -> bool {
        self.view == "daily"
    }

    /// `true` when JSON output was requested.
    pub fn is_json(&self) -> bool {
        self.format == "json"
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
