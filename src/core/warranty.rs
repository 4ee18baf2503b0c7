use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};

use super::date_math::days_between;
use crate::error::{FixpointError, FixpointResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Warranty {
    pub end_date: NaiveDate,
    pub under_warranty: bool,
    pub days_remaining: i64,
}

/// Warranty runs `warranty_years` calendar years from the purchase date
/// (exact month and day, not 365 * years). The warranty holds on the end
/// date itself, and `days_remaining` is clamped so an expired part never
/// shows a negative count.
pub fn compute_warranty(
    purchase_date: NaiveDate,
    warranty_years: u32,
    today: NaiveDate,
) -> FixpointResult<Warranty> {
    let end_date = purchase_date
        .checked_add_months(Months::new(warranty_years * 12))
        .ok_or_else(|| {
            FixpointError::InvalidRange(format!(
                "{} + {} years is out of range",
                purchase_date, warranty_years
            ))
        })?;
    Ok(Warranty {
        end_date,
        under_warranty: end_date >= today,
        days_remaining: days_between(today, end_date).max(0),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_calendar_year_end_date() {
        let w = compute_warranty(d(2023, 5, 10), 2, d(2024, 1, 1)).unwrap();
        assert_eq!(w.end_date, d(2025, 5, 10));
        assert!(w.under_warranty);
    }

    #[test]
    fn test_leap_day_purchase_clamps() {
        let w = compute_warranty(d(2024, 2, 29), 1, d(2024, 3, 1)).unwrap();
        assert_eq!(w.end_date, d(2025, 2, 28));
    }

    #[test]
    fn test_under_warranty_on_end_date() {
        let w = compute_warranty(d(2023, 5, 10), 1, d(2024, 5, 10)).unwrap();
        assert!(w.under_warranty);
        assert_eq!(w.days_remaining, 0);
    }

    #[test]
    fn test_expired_never_negative() {
        let w = compute_warranty(d(2020, 5, 10), 1, d(2024, 1, 1)).unwrap();
        assert!(!w.under_warranty);
        assert_eq!(w.days_remaining, 0);
    }
}
