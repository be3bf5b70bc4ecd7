use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// One calendar day whose price object could not be retrieved or decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayFailure {
    /// Object key that was requested, e.g. `"2023-01-10.json"`.
    pub key: String,
    /// Human-readable cause.
    pub reason: String,
}

impl fmt::Display for DayFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.key, self.reason)
    }
}

/// All errors produced by the ledger crates.
#[derive(Error, Debug)]
pub enum LedgerError {
    /// The consumption export header does not match the expected columns.
    #[error("Unexpected consumption file header: [{}]", .found.join(", "))]
    SchemaMismatch { found: Vec<String> },

    /// At least one day of price data could not be acquired. Carries every
    /// failed day, not just the first.
    #[error(
        "Failed to fetch price data for {} of {total} days (first: {})",
        .failed.len(),
        .failed.first().map(ToString::to_string).unwrap_or_default()
    )]
    FetchFailure {
        failed: Vec<DayFailure>,
        total: usize,
    },

    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A JSON document could not be parsed.
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// The consumption export could not be tokenised.
    #[error("Failed to read CSV: {0}")]
    Csv(#[from] csv::Error),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Catch-all for errors from third-party crates via `anyhow`.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl LedgerError {
    /// `true` for errors that only invalidate the current input and should be
    /// reported to the user rather than abort the program.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::SchemaMismatch { .. } | Self::FetchFailure { .. })
    }
}

/// Convenience alias used throughout the ledger crates.
pub type Result<T> = std::result::Result<T, LedgerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_schema_mismatch() {
        let err = LedgerError::SchemaMismatch {
            found: vec!["a".to_string(), "b".to_string()],
        };
        assert_eq!(err.to_string(), "Unexpected consumption file header: [a, b]");
    }

    #[test]
    fn test_error_display_fetch_failure() {
        let err = LedgerError::FetchFailure {
            failed: vec![
                DayFailure {
                    key: "2023-01-10.json".to_string(),
                    reason: "not found".to_string(),
                },
                DayFailure {
                    key: "2023-01-11.json".to_string(),
                    reason: "timeout".to_string(),
                },
            ],
            total: 31,
        };
        let msg = err.to_string();
        assert!(msg.contains("2 of 31 days"));
        assert!(msg.contains("2023-01-10.json: not found"));
    }

    #[test]
    fn test_error_display_file_read() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = LedgerError::FileRead {
            path: PathBuf::from("/some/export.csv"),
            source: io_err,
        };
        let msg = err.to_string();
        assert!(msg.contains("Failed to read file"));
        assert!(msg.contains("/some/export.csv"));
        assert!(msg.contains("no such file"));
    }

    #[test]
    fn test_error_display_config() {
        let err = LedgerError::Config("no price source".to_string());
        assert_eq!(err.to_string(), "Configuration error: no price source");
    }

    #[test]
    fn test_error_from_serde_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{invalid}").unwrap_err();
        let err: LedgerError = json_err.into();
        assert!(err.to_string().contains("Failed to parse JSON"));
    }

    #[test]
    fn test_recoverable_classification() {
        assert!(LedgerError::SchemaMismatch { found: vec![] }.is_recoverable());
        assert!(LedgerError::FetchFailure {
            failed: vec![],
            total: 0
        }
        .is_recoverable());
        assert!(!LedgerError::Config("x".to_string()).is_recoverable());
    }
}
