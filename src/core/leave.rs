use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::date_math::inclusive_day_count;
use crate::error::{FixpointError, FixpointResult};

/// Leave types matched by this name are exempt from balance checking.
pub const UNPAID_LEAVE_TYPE: &str = "unpaid";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HalfDay {
    #[serde(rename = "First Half")]
    First,
    #[serde(rename = "Second Half")]
    Second,
}

impl std::str::FromStr for HalfDay {
    type Err = FixpointError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "First Half" => Ok(HalfDay::First),
            "Second Half" => Ok(HalfDay::Second),
            other => Err(FixpointError::Validation(format!(
                "Unknown half-day value '{}'",
                other
            ))),
        }
    }
}

/// Chargeable days for a leave request. A half-day request is 0.5 days no
/// matter the range; the form keeps start and end equal in that case, but
/// the flag alone decides here.
pub fn compute_days(
    start: NaiveDate,
    end: NaiveDate,
    exclude_weekends: bool,
    half_day: Option<HalfDay>,
) -> FixpointResult<f64> {
    if half_day.is_some() {
        return Ok(0.5);
    }
    Ok(inclusive_day_count(start, end, exclude_weekends)? as f64)
}

/// Unpaid leave bypasses the balance check entirely.
pub fn check_balance(
    requested_days: f64,
    available_balance: f64,
    leave_type: &str,
) -> FixpointResult<()> {
    if leave_type
        .to_ascii_lowercase()
        .contains(UNPAID_LEAVE_TYPE)
    {
        return Ok(());
    }
    if requested_days > available_balance {
        return Err(FixpointError::InsufficientBalance(format!(
            "Requested {} day(s) but only {} available for {}",
            requested_days, available_balance, leave_type
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_full_week_request() {
        // Mon..Fri: flag makes no difference when no weekend is inside.
        assert_eq!(
            compute_days(d(2024, 3, 4), d(2024, 3, 8), true, None).unwrap(),
            5.0
        );
        assert_eq!(
            compute_days(d(2024, 3, 4), d(2024, 3, 8), false, None).unwrap(),
            5.0
        );
    }

    #[test]
    fn test_weekend_exclusion() {
        // Mon..next Mon: 8 calendar days, 6 working days.
        assert_eq!(
            compute_days(d(2024, 3, 4), d(2024, 3, 11), false, None).unwrap(),
            8.0
        );
        assert_eq!(
            compute_days(d(2024, 3, 4), d(2024, 3, 11), true, None).unwrap(),
            6.0
        );
    }

    #[test]
    fn test_half_day_wins() {
        assert_eq!(
            compute_days(d(2024, 3, 4), d(2024, 3, 4), true, Some(HalfDay::First)).unwrap(),
            0.5
        );
        assert_eq!(
            compute_days(d(2024, 3, 4), d(2024, 3, 8), false, Some(HalfDay::Second)).unwrap(),
            0.5
        );
    }

    #[test]
    fn test_inverted_range_rejected() {
        assert!(compute_days(d(2024, 3, 8), d(2024, 3, 4), false, None).is_err());
    }

    #[test]
    fn test_balance_check() {
        assert!(check_balance(3.0, 5.0, "Casual Leave").is_ok());
        assert!(check_balance(3.0, 3.0, "Casual Leave").is_ok());
        assert!(check_balance(5.5, 3.0, "Casual Leave").is_err());
    }

    #[test]
    fn test_unpaid_is_exempt() {
        assert!(check_balance(20.0, 0.0, "Unpaid Leave").is_ok());
        assert!(check_balance(20.0, 0.0, "unpaid").is_ok());
    }

    #[test]
    fn test_exemption_needs_the_full_word() {
        // "Paid Leave" contains "paid" but not "unpaid"; it is checked.
        assert!(check_balance(20.0, 0.0, "Paid Leave").is_err());
        assert!(check_balance(20.0, 0.0, "Special Paid Leave").is_err());
    }
}
