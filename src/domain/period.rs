//! Month-offset to period-string conversion.
//!
//! Periods are calendar-offset strings counted from January 2020, not parsed
//! date types. Two textual encodings exist, one per source family:
//!
//! - price tables: `"YYYY-M"` (reference date, month unpadded)
//! - case tables:  `"25-M-YYYY"` (the monthly snapshot taken on the 25th)
//!
//! There is no inverse conversion: the cleaners match raw period strings by
//! prefix/equality only and never route them back through this module.

use crate::error::{AppError, ErrorKind};

/// Format a month offset as a price-table reference date, e.g. `0 -> "2020-1"`.
///
/// The offset must be >= 0 (January 2020 is the epoch).
pub fn month_offset_to_ref_date(delta: i64) -> Result<String, AppError> {
    if delta < 0 {
        return Err(AppError::new(
            ErrorKind::InvalidArgument,
            format!("Month offset {delta} is before the 2020-01 epoch."),
        ));
    }
    let month = delta % 12 + 1;
    let year = 2020 + delta / 12;
    Ok(format!("{year}-{month}"))
}

/// Format a month offset as a case-table report date, e.g. `21 -> "25-10-2021"`.
///
/// The offset must be > 0.
pub fn month_offset_to_report_date(delta: i64) -> Result<String, AppError> {
    if delta <= 0 {
        return Err(AppError::new(
            ErrorKind::InvalidArgument,
            format!("Month offset {delta} is out of range for a report date (must be > 0)."),
        ));
    }
    let month = delta % 12 + 1;
    let year = 2020 + delta / 12;
    Ok(format!("25-{month}-{year}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ref_date_starts_at_the_epoch() {
        assert_eq!(month_offset_to_ref_date(0).unwrap(), "2020-1");
        assert_eq!(month_offset_to_ref_date(11).unwrap(), "2020-12");
        assert_eq!(month_offset_to_ref_date(12).unwrap(), "2021-1");
        assert_eq!(month_offset_to_ref_date(21).unwrap(), "2021-10");
        assert_eq!(month_offset_to_ref_date(24).unwrap(), "2022-1");
    }

    #[test]
    fn report_date_matches_the_case_feed_format() {
        assert_eq!(month_offset_to_report_date(21).unwrap(), "25-10-2021");
        assert_eq!(month_offset_to_report_date(22).unwrap(), "25-11-2021");
        assert_eq!(month_offset_to_report_date(24).unwrap(), "25-1-2022");
    }

    #[test]
    fn out_of_domain_offsets_are_rejected() {
        let err = month_offset_to_ref_date(-1).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);

        let err = month_offset_to_report_date(0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }
}
