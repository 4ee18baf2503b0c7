use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::date_math::days_between;
use crate::db::AmcContract;
use crate::error::{FixpointError, FixpointResult};

/// A contract this close to expiry (in days) shows as Expiring.
pub const EXPIRY_WARNING_DAYS: i64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AmcStatus {
    Active,
    Expiring,
    Expired,
}

impl std::fmt::Display for AmcStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AmcStatus::Active => write!(f, "Active"),
            AmcStatus::Expiring => write!(f, "Expiring"),
            AmcStatus::Expired => write!(f, "Expired"),
        }
    }
}

/// Status is derived from the end date on every read, never stored.
/// Exactly 30 days remaining counts as Expiring.
pub fn derive_status(end_date: NaiveDate, today: NaiveDate) -> AmcStatus {
    let remaining = days_between(today, end_date);
    if remaining < 0 {
        AmcStatus::Expired
    } else if remaining <= EXPIRY_WARNING_DAYS {
        AmcStatus::Expiring
    } else {
        AmcStatus::Active
    }
}

/// A contract still provides coverage while it is Active or Expiring.
pub fn is_covered(end_date: NaiveDate, today: NaiveDate) -> bool {
    derive_status(end_date, today) != AmcStatus::Expired
}

/// Exact QR id match. A miss is a plain None so the caller can fall into
/// the walk-in customer flow.
pub fn find_by_qr<'a>(contracts: &'a [AmcContract], qr_code_id: &str) -> Option<&'a AmcContract> {
    contracts.iter().find(|c| c.qr_code_id == qr_code_id)
}

pub fn find_by_mobile<'a>(contracts: &'a [AmcContract], mobile: &str) -> Option<&'a AmcContract> {
    contracts.iter().find(|c| c.mobile_number == mobile)
}

/// A renewal must extend coverage.
pub fn validate_renewal(current_end: NaiveDate, new_end: NaiveDate) -> FixpointResult<()> {
    if new_end <= current_end {
        return Err(FixpointError::InvalidRenewal(format!(
            "New end date {} does not extend the current coverage ending {}",
            new_end, current_end
        )));
    }
    Ok(())
}

/// Contracts expiring within `window_days`, soonest first.
pub fn upcoming_renewals<'a>(
    contracts: &'a [AmcContract],
    window_days: i64,
    today: NaiveDate,
) -> Vec<(&'a AmcContract, i64)> {
    let mut due: Vec<(&AmcContract, i64)> = contracts
        .iter()
        .filter_map(|c| {
            let remaining = days_between(today, c.end_date);
            (0..=window_days).contains(&remaining).then_some((c, remaining))
        })
        .collect();
    due.sort_by_key(|(_, remaining)| *remaining);
    due
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn contract(amc_id: &str, qr: &str, mobile: &str, end: NaiveDate) -> AmcContract {
        AmcContract {
            amc_id: amc_id.to_string(),
            qr_code_id: qr.to_string(),
            customer_name: "Test Customer".to_string(),
            mobile_number: mobile.to_string(),
            email: None,
            address: None,
            device_serial: "SN-001".to_string(),
            device_name: "Office Desktop".to_string(),
            device_type: Some("Desktop".to_string()),
            start_date: d(2024, 1, 15),
            end_date: end,
            amc_amount: 4500.0,
            services_included: None,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_derive_status_boundaries() {
        let today = d(2024, 6, 1);
        assert_eq!(derive_status(d(2024, 5, 31), today), AmcStatus::Expired);
        assert_eq!(derive_status(d(2024, 6, 1), today), AmcStatus::Expiring);
        // Exactly 30 days out is Expiring, not Active.
        assert_eq!(derive_status(d(2024, 7, 1), today), AmcStatus::Expiring);
        assert_eq!(derive_status(d(2024, 7, 2), today), AmcStatus::Active);
    }

    #[test]
    fn test_status_monotonic_in_days_to_expiry() {
        let today = d(2024, 6, 1);
        let mut last = AmcStatus::Active;
        for offset in (-5..=40).rev() {
            let end = today + chrono::Duration::days(offset);
            let status = derive_status(end, today);
            let rank = |s: AmcStatus| match s {
                AmcStatus::Active => 0,
                AmcStatus::Expiring => 1,
                AmcStatus::Expired => 2,
            };
            assert!(rank(status) >= rank(last));
            last = status;
        }
    }

    #[test]
    fn test_lookups_are_exact() {
        let contracts = vec![
            contract("AMC-1", "QR-100", "9876543210", d(2025, 1, 1)),
            contract("AMC-2", "QR-200", "9123456780", d(2025, 2, 1)),
        ];
        assert_eq!(find_by_qr(&contracts, "QR-200").unwrap().amc_id, "AMC-2");
        assert!(find_by_qr(&contracts, "QR-2").is_none());
        assert_eq!(
            find_by_mobile(&contracts, "9876543210").unwrap().amc_id,
            "AMC-1"
        );
        assert!(find_by_mobile(&contracts, "987654321").is_none());
    }

    #[test]
    fn test_validate_renewal() {
        assert!(validate_renewal(d(2025, 1, 14), d(2026, 1, 14)).is_ok());
        assert!(validate_renewal(d(2025, 1, 14), d(2025, 1, 14)).is_err());
        assert!(validate_renewal(d(2025, 1, 14), d(2024, 12, 31)).is_err());
    }

    #[test]
    fn test_upcoming_renewals_sorted() {
        let today = d(2024, 6, 1);
        let contracts = vec![
            contract("AMC-1", "QR-1", "1", d(2024, 6, 20)), // 19 days
            contract("AMC-2", "QR-2", "2", d(2024, 6, 5)),  // 4 days
            contract("AMC-3", "QR-3", "3", d(2024, 9, 1)),  // outside window
            contract("AMC-4", "QR-4", "4", d(2024, 5, 20)), // already expired
        ];
        let due = upcoming_renewals(&contracts, 30, today);
        let ids: Vec<&str> = due.iter().map(|(c, _)| c.amc_id.as_str()).collect();
        assert_eq!(ids, vec!["AMC-2", "AMC-1"]);
        assert_eq!(due[0].1, 4);
    }

    #[test]
    fn test_custom_window() {
        let today = d(2024, 6, 1);
        let contracts = vec![contract("AMC-1", "QR-1", "1", d(2024, 6, 20))];
        assert!(upcoming_renewals(&contracts, 10, today).is_empty());
        assert_eq!(upcoming_renewals(&contracts, 19, today).len(), 1);
    }
}
