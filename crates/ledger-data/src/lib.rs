//! Parsing and aggregation engine for the spot ledger.
//!
//! Reads the consumption export, builds the tax-adjusted price table, works
//! out which months and days both datasets cover, and folds the joined data
//! into daily and monthly aggregates.

pub mod aggregator;
pub mod eligibility;
pub mod price_table;
pub mod reader;

pub use ledger_core as core;
