//! Hour, day and month key derivation.
//!
//! All keys are fixed-width prefixes of an ISO-8601 timestamp
//! (`YYYY-MM-DDTHH...`). Lexicographic prefix equality is therefore the same
//! as calendar truncation, and lexicographic order is chronological order.
//! Keys produced from anything that is not shaped like that are still usable
//! as opaque grouping strings, they just lose the calendar meaning.

use chrono::NaiveDate;

/// Width of an hour key: `"2023-01-10T10"`.
pub const HOUR_KEY_LEN: usize = 13;
/// Width of a day key: `"2023-01-10"`.
pub const DAY_KEY_LEN: usize = 10;
/// Width of a month key: `"2023-01"`.
pub const MONTH_KEY_LEN: usize = 7;

/// Normalize a raw timestamp into an hour key.
///
/// ```
/// use ledger_core::keys::hour_key;
///
/// assert_eq!(hour_key("2023-01-10T10:00:00.000Z"), "2023-01-10T10");
/// assert_eq!(hour_key("2023-01-10T10"), "2023-01-10T10");
/// ```
pub fn hour_key(timestamp: &str) -> String {
    prefix(timestamp.trim(), HOUR_KEY_LEN).to_string()
}

/// Day key of an hour key (its first 10 characters).
///
/// ```
/// use ledger_core::keys::day_key;
///
/// assert_eq!(day_key("2023-01-10T10"), "2023-01-10");
/// ```
pub fn day_key(hour: &str) -> &str {
    prefix(hour, DAY_KEY_LEN)
}

/// Month key of an hour or day key (its first 7 characters).
///
/// ```
/// use ledger_core::keys::month_key;
///
/// assert_eq!(month_key("2023-01-10T10"), "2023-01");
/// assert_eq!(month_key("2023-01-10"), "2023-01");
/// ```
pub fn month_key(key: &str) -> &str {
    prefix(key, MONTH_KEY_LEN)
}

/// Key of the price object holding `day`: the ISO date plus `suffix`.
///
/// ```
/// use chrono::NaiveDate;
/// use ledger_core::keys::object_key;
///
/// let day = NaiveDate::from_ymd_opt(2023, 1, 9).unwrap();
/// assert_eq!(object_key(day, ".json"), "2023-01-09.json");
/// ```
pub fn object_key(day: NaiveDate, suffix: &str) -> String {
    format!("{}{}", day.format("%Y-%m-%d"), suffix)
}

/// First `len` characters of `s`, or all of `s` when it is shorter.
fn prefix(s: &str, len: usize) -> &str {
    match s.char_indices().nth(len) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
