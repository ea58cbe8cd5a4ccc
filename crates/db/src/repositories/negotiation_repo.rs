//! Repository for the `budget_negotiations` table.
//!
//! Accept and counter are multi-statement flows; each runs inside a single
//! transaction so a partial failure cannot leave the negotiation and the
//! project disagreeing about the price.

use rust_decimal::Decimal;
use sqlx::PgPool;

use atelio_core::status::{NegotiationStatus, ProjectStatus};
use atelio_core::types::DbId;

use crate::models::negotiation::BudgetNegotiation;
use crate::models::project::Project;
use crate::repositories::ProjectRepo;

const COLUMNS: &str = "id, project_id, proposed_by, original_price, proposed_price, message, \
     status, responded_by, responded_at, created_at";

/// Provides storage for the append-only negotiation chain.
pub struct NegotiationRepo;

impl NegotiationRepo {
    /// Open a new pending negotiation.
    pub async fn create(
        pool: &PgPool,
        project_id: DbId,
        proposed_by: DbId,
        original_price: Decimal,
        proposed_price: Decimal,
        message: Option<&str>,
    ) -> Result<BudgetNegotiation, sqlx::Error> {
        let query = format!(
            "INSERT INTO budget_negotiations \
                (project_id, proposed_by, original_price, proposed_price, message)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, BudgetNegotiation>(&query)
            .bind(project_id)
            .bind(proposed_by)
            .bind(original_price)
            .bind(proposed_price)
            .bind(message)
            .fetch_one(pool)
            .await
    }

    /// Find a negotiation by its internal ID.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<BudgetNegotiation>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM budget_negotiations WHERE id = $1");
        sqlx::query_as::<_, BudgetNegotiation>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List a project's negotiation chain, oldest first.
    pub async fn list_for_project(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Vec<BudgetNegotiation>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM budget_negotiations \
             WHERE project_id = $1 ORDER BY created_at ASC, id ASC"
        );
        sqlx::query_as::<_, BudgetNegotiation>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await
    }

    /// Accept a pending negotiation.
    ///
    /// One transaction: the negotiation becomes `accepted` and the project
    /// takes the proposed price and moves to `in_progress`. The status
    /// condition makes concurrent responses race-safe: the loser sees no
    /// row and the transaction rolls back.
    pub async fn accept(
        pool: &PgPool,
        id: DbId,
        responded_by: DbId,
    ) -> Result<Option<(BudgetNegotiation, Project)>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE budget_negotiations SET
                status = '{accepted}',
                responded_by = $2,
                responded_at = NOW()
             WHERE id = $1 AND status = '{pending}'
             RETURNING {COLUMNS}",
            accepted = NegotiationStatus::Accepted.as_str(),
            pending = NegotiationStatus::Pending.as_str()
        );
        let Some(negotiation) = sqlx::query_as::<_, BudgetNegotiation>(&query)
            .bind(id)
            .bind(responded_by)
            .fetch_optional(&mut *tx)
            .await?
        else {
            tx.rollback().await?;
            return Ok(None);
        };

        let Some(project) = ProjectRepo::set_price_and_status_tx(
            &mut tx,
            negotiation.project_id,
            negotiation.proposed_price,
            ProjectStatus::InProgress.as_str(),
        )
        .await?
        else {
            tx.rollback().await?;
            return Ok(None);
        };

        tx.commit().await?;
        Ok(Some((negotiation, project)))
    }

    /// Reject a pending negotiation. Returns the updated row, or `None`
    /// when the negotiation was not pending.
    pub async fn reject(
        pool: &PgPool,
        id: DbId,
        responded_by: DbId,
    ) -> Result<Option<BudgetNegotiation>, sqlx::Error> {
        let query = format!(
            "UPDATE budget_negotiations SET
                status = '{rejected}',
                responded_by = $2,
                responded_at = NOW()
             WHERE id = $1 AND status = '{pending}'
             RETURNING {COLUMNS}",
            rejected = NegotiationStatus::Rejected.as_str(),
            pending = NegotiationStatus::Pending.as_str()
        );
        sqlx::query_as::<_, BudgetNegotiation>(&query)
            .bind(id)
            .bind(responded_by)
            .fetch_optional(pool)
            .await
    }

    /// Counter a pending negotiation.
    ///
    /// One transaction: the old row becomes `countered` and a fresh
    /// `pending` row is appended whose `original_price` is the countered
    /// row's `proposed_price`. Returns `(countered_row, new_row)`.
    pub async fn counter(
        pool: &PgPool,
        id: DbId,
        responded_by: DbId,
        proposed_price: Decimal,
        message: Option<&str>,
    ) -> Result<Option<(BudgetNegotiation, BudgetNegotiation)>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE budget_negotiations SET
                status = '{countered}',
                responded_by = $2,
                responded_at = NOW()
             WHERE id = $1 AND status = '{pending}'
             RETURNING {COLUMNS}",
            countered = NegotiationStatus::Countered.as_str(),
            pending = NegotiationStatus::Pending.as_str()
        );
        let Some(countered) = sqlx::query_as::<_, BudgetNegotiation>(&query)
            .bind(id)
            .bind(responded_by)
            .fetch_optional(&mut *tx)
            .await?
        else {
            tx.rollback().await?;
            return Ok(None);
        };

        let insert = format!(
            "INSERT INTO budget_negotiations \
                (project_id, proposed_by, original_price, proposed_price, message)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        let new_row = sqlx::query_as::<_, BudgetNegotiation>(&insert)
            .bind(countered.project_id)
            .bind(responded_by)
            .bind(countered.proposed_price)
            .bind(proposed_price)
            .bind(message)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some((countered, new_row)))
    }
}
