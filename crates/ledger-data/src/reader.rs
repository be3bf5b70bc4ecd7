//! Consumption export parsing.
//!
//! The export is semicolon-separated text with a fixed seven-column header.
//! Only the start time and quantity columns are read; quantities use a
//! decimal comma.

use ledger_core::error::{LedgerError, Result};
use ledger_core::keys::hour_key;
use ledger_core::models::ConsumptionRecord;
use tracing::debug;

/// Field delimiter of the export.
pub const DELIMITER: u8 = b';';

/// Header the export must carry, column for column.
pub const EXPECTED_HEADER: [&str; 7] = [
    "Metering point id",
    "Product type",
    "Resolution",
    "Unit type",
    "Start time",
    "Quantity",
    "Quality",
];

const START_TIME_COLUMN: usize = 4;
const QUANTITY_COLUMN: usize = 5;

// ── Public API ────────────────────────────────────────────────────────────────

/// Parse the full text of one consumption export.
///
/// Fails with [`LedgerError::SchemaMismatch`] when the header differs from
/// [`EXPECTED_HEADER`]. Rows without a start time or quantity, and rows whose
/// quantity is not a finite number, are skipped. Output keeps file order.
pub fn parse_consumption(text: &str) -> Result<Vec<ConsumptionRecord>> {
    let (header, body) = split_header(text);
    check_header(header)?;

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(DELIMITER)
        .has_headers(false)
        .flexible(true)
        .from_reader(body.as_bytes());

    let mut records = Vec::new();
    let mut skipped = 0usize;

    for row in reader.records() {
        let row = row?;
        match parse_row(&row) {
            Some(record) => records.push(record),
            None => skipped += 1,
        }
    }

    debug!(
        "Parsed {} consumption rows ({} skipped)",
        records.len(),
        skipped
    );

    Ok(records)
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Split off the first physical line, without its line terminator and
/// leading byte-order mark.
fn split_header(text: &str) -> (&str, &str) {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let (header, body) = text.split_once('\n').unwrap_or((text, ""));
    (header.strip_suffix('\r').unwrap_or(header), body)
}

/// Compare the raw header line against [`EXPECTED_HEADER`], cell for cell.
///
/// No trimming or unquoting: any deviation is a mismatch.
fn check_header(header: &str) -> Result<()> {
    let found: Vec<String> = if header.is_empty() {
        Vec::new()
    } else {
        header
            .split(char::from(DELIMITER))
            .map(str::to_string)
            .collect()
    };

    let matches = found.len() == EXPECTED_HEADER.len()
        && found.iter().zip(EXPECTED_HEADER).all(|(a, b)| a == b);

    if matches {
        Ok(())
    } else {
        Err(LedgerError::SchemaMismatch { found })
    }
}

/// Map one data row to a record, or `None` when it must be dropped.
fn parse_row(row: &csv::StringRecord) -> Option<ConsumptionRecord> {
    let start = row.get(START_TIME_COLUMN)?.trim();
    let quantity = row.get(QUANTITY_COLUMN)?.trim();
    if start.is_empty() || quantity.is_empty() {
        return None;
    }

    let kwh = parse_decimal_comma(quantity)?;

    Some(ConsumptionRecord {
        hour: hour_key(start),
        kwh,
    })
}

/// Parse a decimal-comma number such as `"1,234"` (one point two three four).
fn parse_decimal_comma(value: &str) -> Option<f64> {
    value
        .replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str =
        "Metering point id;Product type;Resolution;Unit type;Start time;Quantity;Quality";

    fn export(rows: &[&str]) -> String {
        let mut text = String::from(HEADER);
        for row in rows {
            text.push('\n');
            text.push_str(row);
        }
        text
    }

    // ── header ────────────────────────────────────────────────────────────────

    #[test]
    fn test_header_only_yields_no_records() {
        let records = parse_consumption(HEADER).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_empty_input_is_schema_mismatch() {
        let err = parse_consumption("").unwrap_err();
        assert!(matches!(err, LedgerError::SchemaMismatch { ref found } if found.is_empty()));
    }

    #[test]
    fn test_renamed_column_is_schema_mismatch() {
        let text = "Metering point id;Product type;Resolution;Unit type;Start;Quantity;Quality\n";
        match parse_consumption(text).unwrap_err() {
            LedgerError::SchemaMismatch { found } => {
                assert_eq!(found.len(), 7);
                assert_eq!(found[4], "Start");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_reordered_columns_is_schema_mismatch() {
        let text = "Metering point id;Product type;Resolution;Unit type;Quantity;Start time;Quality";
        assert!(matches!(
            parse_consumption(text),
            Err(LedgerError::SchemaMismatch { .. })
        ));
    }

    #[test]
    fn test_extra_column_is_schema_mismatch() {
        let text = format!("{HEADER};Extra");
        assert!(matches!(
            parse_consumption(&text),
            Err(LedgerError::SchemaMismatch { .. })
        ));
    }

    #[test]
    fn test_padded_header_is_schema_mismatch() {
        let text = " Metering point id ;Product type;Resolution;Unit type;Start time;Quantity;Quality\n\
                    1;Energy;PT1H;kWh;2023-01-10T10:00:00Z;1,0;OK";
        match parse_consumption(text).unwrap_err() {
            LedgerError::SchemaMismatch { found } => assert_eq!(found[0], " Metering point id "),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_blank_first_line_is_schema_mismatch() {
        let text = format!("\n{HEADER}\n1;Energy;PT1H;kWh;2023-01-10T10:00:00Z;1,0;OK");
        match parse_consumption(&text).unwrap_err() {
            LedgerError::SchemaMismatch { found } => assert!(found.is_empty()),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_quoted_header_is_schema_mismatch() {
        let quoted: Vec<String> = EXPECTED_HEADER.iter().map(|c| format!("\"{c}\"")).collect();
        let text = quoted.join(";");
        assert!(matches!(
            parse_consumption(&text),
            Err(LedgerError::SchemaMismatch { .. })
        ));
    }

    #[test]
    fn test_header_with_bom_is_accepted() {
        let text = format!("\u{feff}{HEADER}");
        assert!(parse_consumption(&text).is_ok());
    }

    // ── rows ──────────────────────────────────────────────────────────────────

    #[test]
    fn test_parses_rows_in_file_order() {
        let text = export(&[
            "123;Energy;PT1H;kWh;2023-01-10T11:00:00.000Z;3,5;OK",
            "123;Energy;PT1H;kWh;2023-01-10T10:00:00.000Z;2,25;OK",
        ]);
        let records = parse_consumption(&text).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].hour, "2023-01-10T11");
        assert!((records[0].kwh - 3.5).abs() < 1e-9);
        assert_eq!(records[1].hour, "2023-01-10T10");
        assert!((records[1].kwh - 2.25).abs() < 1e-9);
    }

    #[test]
    fn test_crlf_line_endings() {
        let text = format!(
            "{HEADER}\r\n123;Energy;PT1H;kWh;2023-01-10T10:00:00Z;1,0;OK\r\n123;Energy;PT1H;kWh;2023-01-10T11:00:00Z;2,0;OK\r\n"
        );
        let records = parse_consumption(&text).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].hour, "2023-01-10T11");
    }

    #[test]
    fn test_rows_missing_fields_are_dropped() {
        let text = export(&[
            "123;Energy;PT1H;kWh",
            "123;Energy;PT1H;kWh;2023-01-10T10:00:00Z;;OK",
            "123;Energy;PT1H;kWh;;1,0;OK",
            "123;Energy;PT1H;kWh;2023-01-10T11:00:00Z;1,0;OK",
            "",
        ]);
        let records = parse_consumption(&text).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].hour, "2023-01-10T11");
    }

    #[test]
    fn test_non_numeric_quantity_is_dropped() {
        let text = export(&[
            "123;Energy;PT1H;kWh;2023-01-10T10:00:00Z;n/a;OK",
            "123;Energy;PT1H;kWh;2023-01-10T11:00:00Z;NaN;OK",
            "123;Energy;PT1H;kWh;2023-01-10T12:00:00Z;0,5;OK",
        ]);
        let records = parse_consumption(&text).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].hour, "2023-01-10T12");
    }

    #[test]
    fn test_duplicate_hours_are_kept() {
        let text = export(&[
            "123;Energy;PT1H;kWh;2023-01-10T10:00:00Z;1,0;OK",
            "123;Energy;PT1H;kWh;2023-01-10T10:00:00Z;2,0;OK",
        ]);
        let records = parse_consumption(&text).unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_parse_decimal_comma() {
        assert_eq!(parse_decimal_comma("0,125"), Some(0.125));
        assert_eq!(parse_decimal_comma("7"), Some(7.0));
        assert_eq!(parse_decimal_comma("inf"), None);
        assert_eq!(parse_decimal_comma("abc"), None);
    }
}
