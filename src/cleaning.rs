//! Data Cleaning - small value fixes for exported ledger files
//!
//! Scalar helpers return `None` on unusable input instead of failing; the
//! column helpers apply them to a polars string column.

use crate::error::Result;
use chrono::{Duration, NaiveDate};
use polars::prelude::*;

/// Move a trailing minus to the front: `"286.64-"` -> `"-286.64"`.
///
/// Other values come back trimmed; `None` stays `None`.
pub fn fix_trailing_sign(value: Option<&str>) -> Option<String> {
    let trimmed = value?.trim();
    match trimmed.strip_suffix('-') {
        Some(body) => Some(format!("-{}", body)),
        None => Some(trimmed.to_string()),
    }
}

/// Day zero of Excel's 1900 date system, adjusted for the phantom 1900-02-29
fn excel_epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1899, 12, 30).unwrap_or_default()
}

/// Calendar date for an Excel serial day count
pub fn excel_serial_to_date(serial: i64) -> Option<NaiveDate> {
    excel_epoch().checked_add_signed(Duration::try_days(serial)?)
}

/// Serial date held as text, as produced by all-text spreadsheet reads.
///
/// Accepts integral values (`"45000"`, `"45000.0"`); anything else is `None`.
pub fn parse_excel_serial(value: Option<&str>) -> Option<NaiveDate> {
    let text = value?.trim();
    let serial = match text.parse::<i64>() {
        Ok(n) => n,
        Err(_) => {
            let f = text.parse::<f64>().ok()?;
            if !f.is_finite() || f.fract() != 0.0 {
                return None;
            }
            f as i64
        }
    };
    excel_serial_to_date(serial)
}

/// Rewrite a string column with [`fix_trailing_sign`]
pub fn fix_trailing_sign_column(df: &mut DataFrame, column: &str) -> Result<()> {
    let fixed: StringChunked = df
        .column(column)?
        .cast(&DataType::String)?
        .str()?
        .into_iter()
        .map(fix_trailing_sign)
        .collect();
    df.with_column(fixed.with_name(column).into_series())?;
    Ok(())
}

/// Replace a column of serial numbers with a `Date` column
pub fn excel_serial_column(df: &mut DataFrame, column: &str) -> Result<()> {
    let values = df.column(column)?.cast(&DataType::String)?;
    let dates = DateChunked::from_naive_date_options(
        column,
        values.str()?.into_iter().map(parse_excel_serial),
    );
    df.with_column(dates.into_series())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_minus_moves_to_front() {
        assert_eq!(fix_trailing_sign(Some("286.64-")).as_deref(), Some("-286.64"));
        assert_eq!(fix_trailing_sign(Some("  12- ")).as_deref(), Some("-12"));
        assert_eq!(fix_trailing_sign(Some("-")).as_deref(), Some("-"));
    }

    #[test]
    fn test_other_values_are_only_trimmed() {
        assert_eq!(fix_trailing_sign(Some(" 286.64 ")).as_deref(), Some("286.64"));
        assert_eq!(fix_trailing_sign(Some("-5")).as_deref(), Some("-5"));
        assert_eq!(fix_trailing_sign(Some("a-b")).as_deref(), Some("a-b"));
        assert_eq!(fix_trailing_sign(None), None);
    }

    #[test]
    fn test_excel_serial_fixture() {
        assert_eq!(excel_serial_to_date(45000), NaiveDate::from_ymd_opt(2023, 3, 15));
        assert_eq!(excel_serial_to_date(0), NaiveDate::from_ymd_opt(1899, 12, 30));
        assert_eq!(excel_serial_to_date(1), NaiveDate::from_ymd_opt(1899, 12, 31));
    }

    #[test]
    fn test_excel_serial_matches_day_offset() {
        let epoch = NaiveDate::from_ymd_opt(1899, 12, 30).unwrap();
        for n in [2i64, 60, 61, 36526, 43831, 60000] {
            assert_eq!(excel_serial_to_date(n), Some(epoch + Duration::days(n)));
        }
    }

    #[test]
    fn test_unconvertible_serials_are_none() {
        assert_eq!(parse_excel_serial(Some("45000")), NaiveDate::from_ymd_opt(2023, 3, 15));
        assert_eq!(parse_excel_serial(Some(" 45000.0 ")), NaiveDate::from_ymd_opt(2023, 3, 15));
        assert_eq!(parse_excel_serial(Some("45000.5")), None);
        assert_eq!(parse_excel_serial(Some("15/03/2023")), None);
        assert_eq!(parse_excel_serial(Some("")), None);
        assert_eq!(parse_excel_serial(None), None);
        assert_eq!(excel_serial_to_date(i64::MAX), None);
    }

    #[test]
    fn test_column_helpers() {
        let mut df = df![
            "amount" => [Some("286.64-"), Some("10.00"), None],
            "posted" => [Some("45000"), Some("bad"), Some("45001")]
        ]
        .unwrap();

        fix_trailing_sign_column(&mut df, "amount").unwrap();
        excel_serial_column(&mut df, "posted").unwrap();

        let amount = df.column("amount").unwrap().str().unwrap().clone();
        assert_eq!(amount.get(0), Some("-286.64"));
        assert_eq!(amount.get(1), Some("10.00"));
        assert_eq!(amount.get(2), None);

        let posted = df.column("posted").unwrap();
        assert_eq!(posted.dtype(), &DataType::Date);
        assert_eq!(posted.null_count(), 1);
    }
}
