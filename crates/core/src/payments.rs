//! Payment-stage planning and transition rules.
//!
//! A project is paid in milestone "stages": each stage covers a percentage
//! of the total price and unlocks once the project's progress reaches the
//! stage's `required_progress` gate. Money never moves through the platform;
//! clients attest an out-of-band bank transfer and an admin verifies it.

use rust_decimal::Decimal;

use crate::error::CoreError;
use crate::status::StageStatus;
use crate::types::DbId;

/// Input for a single stage when creating a project's payment plan.
#[derive(Debug, Clone)]
pub struct StageSpec {
    pub name: String,
    /// Percentage of the project price, in (0, 100].
    pub percentage: Decimal,
    /// Project progress required before the stage becomes payable, in [0, 100].
    pub required_progress: i32,
}

/// A planned stage ready for insertion.
#[derive(Debug, Clone, PartialEq)]
pub struct StagePlan {
    pub name: String,
    pub percentage: Decimal,
    /// Computed at plan time as `price * percentage / 100` and captured
    /// permanently; a later price change via negotiation does not touch it.
    pub amount: Decimal,
    pub required_progress: i32,
    pub status: StageStatus,
}

/// Plan the payment stages for a project.
///
/// Each amount is `price * percentage / 100`, rounded to 2 decimal places.
/// A stage with `required_progress == 0` starts `available`; any positive
/// gate starts `pending`.
pub fn plan_stages(price: Decimal, specs: &[StageSpec]) -> Result<Vec<StagePlan>, CoreError> {
    if specs.is_empty() {
        return Err(CoreError::Validation(
            "At least one payment stage is required".into(),
        ));
    }

    let mut plans = Vec::with_capacity(specs.len());
    for spec in specs {
        if spec.name.trim().is_empty() {
            return Err(CoreError::Validation("Stage name must not be empty".into()));
        }
        if spec.percentage <= Decimal::ZERO || spec.percentage > Decimal::from(100) {
            return Err(CoreError::Validation(format!(
                "Stage percentage must be in (0, 100], got {}",
                spec.percentage
            )));
        }
        if !(0..=100).contains(&spec.required_progress) {
            return Err(CoreError::Validation(format!(
                "Required progress must be in [0, 100], got {}",
                spec.required_progress
            )));
        }

        let amount = (price * spec.percentage / Decimal::from(100)).round_dp(2);
        let status = if spec.required_progress == 0 {
            StageStatus::Available
        } else {
            StageStatus::Pending
        };

        plans.push(StagePlan {
            name: spec.name.clone(),
            percentage: spec.percentage,
            amount,
            required_progress: spec.required_progress,
            status,
        });
    }

    Ok(plans)
}

/// Guard for the admin verification actions.
///
/// Approve and reject are only legal while the stage is exactly
/// `pending_verification`. Proof submission intentionally carries no guard:
/// a client may resubmit at any point, which moves the stage (back) into
/// review rather than silently mutating a settled one.
pub fn ensure_pending_verification(current: StageStatus) -> Result<(), CoreError> {
    if current != StageStatus::PendingVerification {
        return Err(CoreError::InvalidState(format!(
            "Stage is '{}', expected 'pending_verification'",
            current.as_str()
        )));
    }
    Ok(())
}

/// Guard for settlement-document generation: only `paid` stages settle.
pub fn ensure_paid(current: StageStatus) -> Result<(), CoreError> {
    if current != StageStatus::Paid {
        return Err(CoreError::InvalidState("Stage is not paid".into()));
    }
    Ok(())
}

/// Deterministic 1-based position of a stage among its project's stages.
///
/// `stages` must already be ordered by ascending `required_progress`
/// (the repository query guarantees this). Returns `(position, total)`.
pub fn stage_position(stages: &[(DbId, i32)], stage_id: DbId) -> Result<(usize, usize), CoreError> {
    let total = stages.len();
    let index = stages
        .iter()
        .position(|(id, _)| *id == stage_id)
        .ok_or(CoreError::NotFound {
            entity: "PaymentStage",
            id: stage_id,
        })?;
    Ok((index + 1, total))
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use rust_decimal_macros::dec;

    use super::*;

    fn half(name: &str, required_progress: i32) -> StageSpec {
        StageSpec {
            name: name.to_string(),
            percentage: dec!(50),
            required_progress,
        }
    }

    #[test]
    fn zero_threshold_starts_available_positive_starts_pending() {
        let plans = plan_stages(dec!(1000), &[half("Upfront", 0), half("Delivery", 50)]).unwrap();

        assert_eq!(plans[0].status, StageStatus::Available);
        assert_eq!(plans[1].status, StageStatus::Pending);
    }

    #[test]
    fn amounts_are_price_times_percentage() {
        // Spec scenario: price 1000, two 50% stages -> 500 each.
        let plans = plan_stages(dec!(1000), &[half("Upfront", 0), half("Delivery", 50)]).unwrap();

        assert_eq!(plans[0].amount, dec!(500.00));
        assert_eq!(plans[1].amount, dec!(500.00));
    }

    #[test]
    fn amounts_round_to_two_decimals() {
        let specs = [StageSpec {
            name: "Odd".into(),
            percentage: dec!(33.33),
            required_progress: 0,
        }];
        let plans = plan_stages(dec!(999.99), &specs).unwrap();

        assert_eq!(plans[0].amount, dec!(333.30));
    }

    #[test]
    fn empty_plan_is_rejected() {
        let err = plan_stages(dec!(1000), &[]).unwrap_err();
        assert_matches!(err, CoreError::Validation(_));
    }

    #[test]
    fn out_of_range_percentage_is_rejected() {
        let specs = [StageSpec {
            name: "Too much".into(),
            percentage: dec!(120),
            required_progress: 0,
        }];
        assert_matches!(
            plan_stages(dec!(1000), &specs).unwrap_err(),
            CoreError::Validation(_)
        );
    }

    #[test]
    fn out_of_range_progress_is_rejected() {
        let specs = [StageSpec {
            name: "Gate".into(),
            percentage: dec!(50),
            required_progress: 101,
        }];
        assert_matches!(
            plan_stages(dec!(1000), &specs).unwrap_err(),
            CoreError::Validation(_)
        );
    }

    #[test]
    fn approve_guard_rejects_every_other_status() {
        for status in [StageStatus::Pending, StageStatus::Available, StageStatus::Paid] {
            assert_matches!(
                ensure_pending_verification(status).unwrap_err(),
                CoreError::InvalidState(msg) if msg.contains("expected 'pending_verification'")
            );
        }
        assert!(ensure_pending_verification(StageStatus::PendingVerification).is_ok());
    }

    #[test]
    fn settlement_guard_requires_paid() {
        assert!(ensure_paid(StageStatus::Paid).is_ok());
        assert_matches!(
            ensure_paid(StageStatus::Available).unwrap_err(),
            CoreError::InvalidState(_)
        );
    }

    #[test]
    fn stage_position_is_one_based_index_of_total() {
        // Ordered by ascending required_progress.
        let stages = [(11, 0), (12, 50), (13, 90)];

        assert_eq!(stage_position(&stages, 11).unwrap(), (1, 3));
        assert_eq!(stage_position(&stages, 12).unwrap(), (2, 3));
        assert_eq!(stage_position(&stages, 13).unwrap(), (3, 3));
    }

    #[test]
    fn stage_position_unknown_id_is_not_found() {
        let stages = [(11, 0)];
        assert_matches!(
            stage_position(&stages, 99).unwrap_err(),
            CoreError::NotFound { entity: "PaymentStage", id: 99 }
        );
    }
}
