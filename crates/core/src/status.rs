//! Status enums for the main domain entities.
//!
//! Statuses are stored as plain `TEXT` columns; these enums give the state
//! machines a typed surface. `as_str` / `parse` round-trip the stored form.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Lifecycle status of a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

impl ProjectStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::Pending => "pending",
            ProjectStatus::InProgress => "in_progress",
            ProjectStatus::Completed => "completed",
            ProjectStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            "pending" => Ok(ProjectStatus::Pending),
            "in_progress" => Ok(ProjectStatus::InProgress),
            "completed" => Ok(ProjectStatus::Completed),
            "cancelled" => Ok(ProjectStatus::Cancelled),
            other => Err(CoreError::Validation(format!(
                "Unknown project status: {other}"
            ))),
        }
    }
}

/// Lifecycle status of a payment stage.
///
/// Transitions: `pending → available` (progress gate),
/// `available → pending_verification` (client submits proof),
/// `pending_verification → paid` (admin approves) or
/// `pending_verification → available` (admin rejects).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    Pending,
    Available,
    PendingVerification,
    Paid,
}

impl StageStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StageStatus::Pending => "pending",
            StageStatus::Available => "available",
            StageStatus::PendingVerification => "pending_verification",
            StageStatus::Paid => "paid",
        }
    }

    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            "pending" => Ok(StageStatus::Pending),
            "available" => Ok(StageStatus::Available),
            "pending_verification" => Ok(StageStatus::PendingVerification),
            "paid" => Ok(StageStatus::Paid),
            other => Err(CoreError::Validation(format!(
                "Unknown stage status: {other}"
            ))),
        }
    }
}

/// Status of a budget negotiation row.
///
/// `accepted` and `rejected` are terminal. `countered` is terminal for the
/// row itself; the counter lives on as a brand-new `pending` row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NegotiationStatus {
    Pending,
    Accepted,
    Rejected,
    Countered,
}

impl NegotiationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            NegotiationStatus::Pending => "pending",
            NegotiationStatus::Accepted => "accepted",
            NegotiationStatus::Rejected => "rejected",
            NegotiationStatus::Countered => "countered",
        }
    }

    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            "pending" => Ok(NegotiationStatus::Pending),
            "accepted" => Ok(NegotiationStatus::Accepted),
            "rejected" => Ok(NegotiationStatus::Rejected),
            "countered" => Ok(NegotiationStatus::Countered),
            other => Err(CoreError::Validation(format!(
                "Unknown negotiation status: {other}"
            ))),
        }
    }
}

/// Severity/kind of a notification record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Info,
    Success,
    Warning,
    Error,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Info => "info",
            NotificationKind::Success => "success",
            NotificationKind::Warning => "warning",
            NotificationKind::Error => "error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_status_round_trips() {
        for status in [
            StageStatus::Pending,
            StageStatus::Available,
            StageStatus::PendingVerification,
            StageStatus::Paid,
        ] {
            assert_eq!(StageStatus::parse(status.as_str()).unwrap(), status);
        }
    }

    #[test]
    fn unknown_status_is_validation_error() {
        let err = StageStatus::parse("refunded").unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn project_status_round_trips() {
        for status in [
            ProjectStatus::Pending,
            ProjectStatus::InProgress,
            ProjectStatus::Completed,
            ProjectStatus::Cancelled,
        ] {
            assert_eq!(ProjectStatus::parse(status.as_str()).unwrap(), status);
        }
    }

    #[test]
    fn negotiation_status_round_trips() {
        for status in [
            NegotiationStatus::Pending,
            NegotiationStatus::Accepted,
            NegotiationStatus::Rejected,
            NegotiationStatus::Countered,
        ] {
            assert_eq!(NegotiationStatus::parse(status.as_str()).unwrap(), status);
        }
    }
}
