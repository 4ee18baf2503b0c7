use chrono::NaiveDateTime;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{FixpointError, FixpointResult};

/// RMA lifecycle is strictly linear. The last hop, Outbox -> Delivered, is
/// only reachable through OTP verification; everything else is a plain
/// status write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RmaStatus {
    Inbox,
    #[serde(rename = "In-Company")]
    InCompany,
    Outbox,
    Delivered,
}

impl RmaStatus {
    pub fn next(self) -> Option<RmaStatus> {
        match self {
            RmaStatus::Inbox => Some(RmaStatus::InCompany),
            RmaStatus::InCompany => Some(RmaStatus::Outbox),
            RmaStatus::Outbox => Some(RmaStatus::Delivered),
            RmaStatus::Delivered => None,
        }
    }
}

impl std::fmt::Display for RmaStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RmaStatus::Inbox => "Inbox",
            RmaStatus::InCompany => "In-Company",
            RmaStatus::Outbox => "Outbox",
            RmaStatus::Delivered => "Delivered",
        };
        write!(f, "{}", s)
    }
}

impl std::str::FromStr for RmaStatus {
    type Err = FixpointError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Inbox" => Ok(RmaStatus::Inbox),
            "In-Company" => Ok(RmaStatus::InCompany),
            "Outbox" => Ok(RmaStatus::Outbox),
            "Delivered" => Ok(RmaStatus::Delivered),
            other => Err(FixpointError::Validation(format!(
                "Unknown RMA status '{}'",
                other
            ))),
        }
    }
}

/// Successor for a plain status write. The final hop into Delivered is
/// reserved for OTP verification and refused here.
pub fn validate_plain_advance(status: RmaStatus) -> FixpointResult<RmaStatus> {
    let next = status.next().ok_or_else(|| {
        FixpointError::Validation("A delivered RMA ticket has no further status".to_string())
    })?;
    if next == RmaStatus::Delivered {
        return Err(FixpointError::Validation(
            "Delivery requires OTP verification".to_string(),
        ));
    }
    Ok(next)
}

/// A code issued for one ticket. Kept in memory only, never persisted with
/// the ticket record.
#[derive(Debug, Clone)]
pub struct OtpEntry {
    pub code: String,
    pub issued_at: NaiveDateTime,
    pub attempts: u32,
}

/// No expiry or attempt limit has been specified for delivery OTPs, so
/// both knobs default to off. They can be switched on without touching
/// the verification call sites.
#[derive(Debug, Clone, Copy, Default)]
pub struct OtpPolicy {
    pub ttl_minutes: Option<i64>,
    pub max_attempts: Option<u32>,
}

pub fn generate_code<R: Rng>(rng: &mut R) -> String {
    format!("{:04}", rng.random_range(0..10000))
}

/// Exact match against the most recently issued code. A mismatch leaves
/// the code valid for retry.
pub fn verify(
    entry: &OtpEntry,
    entered: &str,
    policy: OtpPolicy,
    now: NaiveDateTime,
) -> FixpointResult<()> {
    if let Some(ttl) = policy.ttl_minutes {
        if now - entry.issued_at > chrono::Duration::minutes(ttl) {
            return Err(FixpointError::OtpMismatch(
                "The OTP has expired. Please generate a new code.".to_string(),
            ));
        }
    }
    if let Some(max) = policy.max_attempts {
        if entry.attempts >= max {
            return Err(FixpointError::OtpMismatch(
                "Too many incorrect attempts. Please generate a new code.".to_string(),
            ));
        }
    }
    if entry.code != entered {
        return Err(FixpointError::OtpMismatch(
            "The entered OTP does not match. Please check the code and try again.".to_string(),
        ));
    }
    Ok(())
}
