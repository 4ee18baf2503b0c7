use chrono::NaiveDate;

use crate::error::{FixpointError, FixpointResult};

pub fn parse_date_safe(date_str: &str) -> Option<NaiveDate> {
    if date_str.trim().is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(date_str, "%Y%m%d"))
        .ok()
}

pub fn parse_date_required(date_str: &str, field: &str) -> FixpointResult<NaiveDate> {
    parse_date_safe(date_str)
        .ok_or_else(|| FixpointError::Validation(format!("Invalid {} '{}'", field, date_str)))
}

/// Frontends that have no clock override send nothing; tests and print
/// previews pass a fixed date so derived values are reproducible.
pub fn resolve_today(as_of: Option<&str>) -> NaiveDate {
    as_of
        .and_then(parse_date_safe)
        .unwrap_or_else(|| chrono::Local::now().date_naive())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_safe() {
        assert_eq!(
            parse_date_safe("2024-01-15"),
            Some(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap())
        );
        assert_eq!(
            parse_date_safe("20240115"),
            Some(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap())
        );
        assert_eq!(parse_date_safe("invalid"), None);
        assert_eq!(parse_date_safe(""), None);
    }

    #[test]
    fn test_resolve_today_prefers_override() {
        assert_eq!(
            resolve_today(Some("2024-06-01")),
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
        );
    }
}
