//! Transaction number generation.
//!
//! Numbers look like `TRX-20240115-000042`: prefix, business date, and a
//! per-day sequence drawn atomically from the store. Sequences are never
//! reused, so a failed commit leaves a gap rather than a duplicate.

use chrono::NaiveDate;

/// Digits the sequence is zero-padded to. Larger values simply grow wider.
pub const SEQUENCE_WIDTH: usize = 6;

/// Store key of the per-day sequence counter, e.g. `TRX-20240115`.
#[must_use]
pub fn sequence_scope(prefix: &str, date: NaiveDate) -> String {
    format!("{prefix}-{}", date.format("%Y%m%d"))
}

/// Formats a transaction number from its parts.
#[must_use]
pub fn format_transaction_number(prefix: &str, date: NaiveDate, sequence: u64) -> String {
    format!(
        "{}-{sequence:0width$}",
        sequence_scope(prefix, date),
        width = SEQUENCE_WIDTH
    )
}

/// Splits a transaction number back into prefix, date and sequence.
#[must_use]
pub fn parse_transaction_number(number: &str) -> Option<(&str, NaiveDate, u64)> {
    let mut parts = number.rsplitn(3, '-');
    let sequence = parts.next()?.parse().ok()?;
    let date = NaiveDate::parse_from_str(parts.next()?, "%Y%m%d").ok()?;
    let prefix = parts.next()?;
    if prefix.is_empty() {
        return None;
    }
    Some((prefix, date, sequence))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
    }

    #[test]
    fn test_format() {
        assert_eq!(format_transaction_number("TRX", date(), 42), "TRX-20240115-000042");
        assert_eq!(
            format_transaction_number("TRX", date(), 1_234_567),
            "TRX-20240115-1234567"
        );
    }

    #[test]
    fn test_scope_is_per_day() {
        assert_eq!(sequence_scope("TRX", date()), "TRX-20240115");
        assert_ne!(
            sequence_scope("TRX", date()),
            sequence_scope("TRX", date().succ_opt().unwrap())
        );
    }

    #[test]
    fn test_parse_roundtrip() {
        let number = format_transaction_number("KASA", date(), 7);
        assert_eq!(parse_transaction_number(&number), Some(("KASA", date(), 7)));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(parse_transaction_number("TRX-2024-01"), None);
        assert_eq!(parse_transaction_number("-20240115-000001"), None);
        assert_eq!(parse_transaction_number("nonsense"), None);
    }
}
