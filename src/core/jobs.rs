use serde::{Deserialize, Serialize};

use crate::error::{FixpointError, FixpointResult};

/// Job workflow states in board order. Movement is forward-only; there is
/// no backward transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStatus {
    Open,
    #[serde(rename = "In Progress")]
    InProgress,
    #[serde(rename = "Pending Parts")]
    PendingParts,
    Completed,
    Delivered,
}

impl JobStatus {
    pub const ALL: [JobStatus; 5] = [
        JobStatus::Open,
        JobStatus::InProgress,
        JobStatus::PendingParts,
        JobStatus::Completed,
        JobStatus::Delivered,
    ];

    fn rank(self) -> u8 {
        match self {
            JobStatus::Open => 0,
            JobStatus::InProgress => 1,
            JobStatus::PendingParts => 2,
            JobStatus::Completed => 3,
            JobStatus::Delivered => 4,
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            JobStatus::Open => "Open",
            JobStatus::InProgress => "In Progress",
            JobStatus::PendingParts => "Pending Parts",
            JobStatus::Completed => "Completed",
            JobStatus::Delivered => "Delivered",
        };
        write!(f, "{}", s)
    }
}

impl std::str::FromStr for JobStatus {
    type Err = FixpointError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Open" => Ok(JobStatus::Open),
            "In Progress" => Ok(JobStatus::InProgress),
            "Pending Parts" => Ok(JobStatus::PendingParts),
            "Completed" => Ok(JobStatus::Completed),
            "Delivered" => Ok(JobStatus::Delivered),
            other => Err(FixpointError::Validation(format!(
                "Unknown job status '{}'",
                other
            ))),
        }
    }
}

pub fn validate_advance(from: JobStatus, to: JobStatus) -> FixpointResult<()> {
    if to.rank() <= from.rank() {
        return Err(FixpointError::Validation(format!(
            "Job status cannot move from '{}' to '{}'",
            from, to
        )));
    }
    Ok(())
}

/// Line mutation is allowed until the job has been handed back.
pub fn validate_editable(status: JobStatus) -> FixpointResult<()> {
    if status == JobStatus::Delivered {
        return Err(FixpointError::Validation(
            "A delivered job can no longer be edited".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_only() {
        assert!(validate_advance(JobStatus::Open, JobStatus::InProgress).is_ok());
        // Skipping ahead is allowed; walking back is not.
        assert!(validate_advance(JobStatus::Open, JobStatus::Completed).is_ok());
        assert!(validate_advance(JobStatus::Completed, JobStatus::Open).is_err());
        assert!(validate_advance(JobStatus::Open, JobStatus::Open).is_err());
    }

    #[test]
    fn test_wire_strings_round_trip() {
        for s in ["Open", "In Progress", "Pending Parts", "Completed", "Delivered"] {
            assert_eq!(s.parse::<JobStatus>().unwrap().to_string(), s);
        }
        assert!("Closed".parse::<JobStatus>().is_err());
    }

    #[test]
    fn test_delivered_is_frozen() {
        assert!(validate_editable(JobStatus::Completed).is_ok());
        assert!(validate_editable(JobStatus::Delivered).is_err());
    }
}
