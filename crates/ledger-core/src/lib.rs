//! Shared vocabulary for the spot ledger: record and aggregate models, key
//! derivation, the tax rule, the error taxonomy, CLI settings and display
//! formatting.

pub mod error;
pub mod formatting;
pub mod keys;
pub mod models;
pub mod settings;
pub mod tax;

pub use error::{LedgerError, Result};
