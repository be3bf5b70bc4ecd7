//! Runtime layer for the spot ledger.
//!
//! Owns the price sources, the settle-all price loader and the report
//! pipeline that joins consumption with prices.

pub mod price_loader;
pub mod report;
pub mod source;

pub use ledger_core as core;
pub use ledger_data as data;
