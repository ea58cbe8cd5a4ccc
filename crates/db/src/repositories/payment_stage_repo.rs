//! Repository for the `payment_stages` table.
//!
//! Approve and reject are single conditional updates keyed on the current
//! status, so two concurrent verifications cannot both pass the
//! `pending_verification` guard: the loser sees zero rows affected.

use rust_decimal::Decimal;
use sqlx::PgPool;

use atelio_core::payments::StagePlan;
use atelio_core::status::StageStatus;
use atelio_core::types::DbId;

use crate::models::payment_stage::PaymentStage;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, project_id, name, percentage, amount, required_progress, status, \
     payment_method, proof_reference, metadata, submitted_by, submitted_at, \
     paid_at, approved_by, approved_at, created_at, updated_at";

/// Provides storage for payment stages.
pub struct PaymentStageRepo;

impl PaymentStageRepo {
    /// Insert the planned stages for a project inside an open transaction,
    /// returning the created rows in plan order.
    pub async fn create_many_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        project_id: DbId,
        plans: &[StagePlan],
    ) -> Result<Vec<PaymentStage>, sqlx::Error> {
        let query = format!(
            "INSERT INTO payment_stages (project_id, name, percentage, amount, \
                                         required_progress, status)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );

        let mut stages = Vec::with_capacity(plans.len());
        for plan in plans {
            let stage = sqlx::query_as::<_, PaymentStage>(&query)
                .bind(project_id)
                .bind(&plan.name)
                .bind(plan.percentage)
                .bind(plan.amount)
                .bind(plan.required_progress)
                .bind(plan.status.as_str())
                .fetch_one(&mut **tx)
                .await?;
            stages.push(stage);
        }
        Ok(stages)
    }

    /// Find a stage by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<PaymentStage>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM payment_stages WHERE id = $1");
        sqlx::query_as::<_, PaymentStage>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List a project's stages ordered by ascending required progress.
    /// Settlement-document numbering depends on this ordering.
    pub async fn list_for_project(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Vec<PaymentStage>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM payment_stages \
             WHERE project_id = $1 \
             ORDER BY required_progress ASC, id ASC"
        );
        sqlx::query_as::<_, PaymentStage>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await
    }

    /// Record a proof-of-payment submission and move the stage into
    /// `pending_verification`.
    ///
    /// Deliberately unconditional on the current status: a client may
    /// resubmit, which re-enters review. The submission is also appended to
    /// `metadata` so prior attempts stay on record.
    pub async fn submit_proof(
        pool: &PgPool,
        id: DbId,
        payment_method: &str,
        proof_reference: &str,
        submitted_by: DbId,
    ) -> Result<Option<PaymentStage>, sqlx::Error> {
        let query = format!(
            "UPDATE payment_stages SET
                status = '{pending_verification}',
                payment_method = $2,
                proof_reference = $3,
                submitted_by = $4,
                submitted_at = NOW(),
                metadata = metadata || jsonb_build_object(
                    'last_submission', jsonb_build_object(
                        'method', $2::text,
                        'proof_reference', $3::text,
                        'submitted_by', $4::bigint,
                        'submitted_at', NOW()
                    )
                ),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}",
            pending_verification = StageStatus::PendingVerification.as_str()
        );
        sqlx::query_as::<_, PaymentStage>(&query)
            .bind(id)
            .bind(payment_method)
            .bind(proof_reference)
            .bind(submitted_by)
            .fetch_optional(pool)
            .await
    }

    /// Approve a stage awaiting verification.
    ///
    /// Single conditional update: `None` means the stage either does not
    /// exist or is not in `pending_verification` — the caller distinguishes
    /// the two with a follow-up lookup.
    pub async fn approve(
        pool: &PgPool,
        id: DbId,
        approved_by: DbId,
    ) -> Result<Option<PaymentStage>, sqlx::Error> {
        let query = format!(
            "UPDATE payment_stages SET
                status = '{paid}',
                paid_at = NOW(),
                approved_by = $2,
                approved_at = NOW(),
                updated_at = NOW()
             WHERE id = $1 AND status = '{pending_verification}'
             RETURNING {COLUMNS}",
            paid = StageStatus::Paid.as_str(),
            pending_verification = StageStatus::PendingVerification.as_str()
        );
        sqlx::query_as::<_, PaymentStage>(&query)
            .bind(id)
            .bind(approved_by)
            .fetch_optional(pool)
            .await
    }

    /// Reject a stage awaiting verification, returning it to `available`.
    ///
    /// Clears the payment method and proof reference and merges rejection
    /// metadata into the existing JSONB without discarding prior fields.
    pub async fn reject(
        pool: &PgPool,
        id: DbId,
        rejected_by: DbId,
        reason: &str,
    ) -> Result<Option<PaymentStage>, sqlx::Error> {
        let query = format!(
            "UPDATE payment_stages SET
                status = '{available}',
                payment_method = NULL,
                proof_reference = NULL,
                metadata = metadata || jsonb_build_object(
                    'last_rejection', jsonb_build_object(
                        'rejected_by', $2::bigint,
                        'rejected_at', NOW(),
                        'reason', $3::text
                    )
                ),
                updated_at = NOW()
             WHERE id = $1 AND status = '{pending_verification}'
             RETURNING {COLUMNS}",
            available = StageStatus::Available.as_str(),
            pending_verification = StageStatus::PendingVerification.as_str()
        );
        sqlx::query_as::<_, PaymentStage>(&query)
            .bind(id)
            .bind(rejected_by)
            .bind(reason)
            .fetch_optional(pool)
            .await
    }

    /// Promote `pending` stages whose gate the project's progress has now
    /// crossed. Returns the stages that became available.
    pub async fn promote_unlocked(
        pool: &PgPool,
        project_id: DbId,
        progress: i32,
    ) -> Result<Vec<PaymentStage>, sqlx::Error> {
        let query = format!(
            "UPDATE payment_stages SET
                status = '{available}',
                updated_at = NOW()
             WHERE project_id = $1 AND status = '{pending}' AND required_progress <= $2
             RETURNING {COLUMNS}",
            available = StageStatus::Available.as_str(),
            pending = StageStatus::Pending.as_str()
        );
        sqlx::query_as::<_, PaymentStage>(&query)
            .bind(project_id)
            .bind(progress)
            .fetch_all(pool)
            .await
    }

    /// Sum of amounts already paid for a project.
    pub async fn paid_total(pool: &PgPool, project_id: DbId) -> Result<Decimal, sqlx::Error> {
        let total: Option<Decimal> = sqlx::query_scalar(
            "SELECT SUM(amount) FROM payment_stages WHERE project_id = $1 AND status = 'paid'",
        )
        .bind(project_id)
        .fetch_one(pool)
        .await?;
        Ok(total.unwrap_or(Decimal::ZERO))
    }
}
