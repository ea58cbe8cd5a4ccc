//! Repository for the `project_timeline` table.

use sqlx::PgPool;

use atelio_core::timeline::DEFAULT_TIMELINE;
use atelio_core::types::DbId;

use crate::models::timeline::TimelineEntry;

const COLUMNS: &str =
    "id, project_id, position, title, description, completed, completed_at, created_at";

/// Provides timeline storage per project.
pub struct TimelineRepo;

impl TimelineRepo {
    /// Seed the fixed default timeline for a project inside an open
    /// transaction. Idempotent: does nothing when the project already has
    /// any timeline rows. Returns `true` when rows were inserted.
    pub async fn seed_defaults_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        project_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let existing: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM project_timeline WHERE project_id = $1")
                .bind(project_id)
                .fetch_one(&mut **tx)
                .await?;
        if existing > 0 {
            return Ok(false);
        }

        for (position, step) in DEFAULT_TIMELINE.iter().enumerate() {
            sqlx::query(
                "INSERT INTO project_timeline (project_id, position, title, description) \
                 VALUES ($1, $2, $3, $4)",
            )
            .bind(project_id)
            .bind(position as i32 + 1)
            .bind(step.title)
            .bind(step.description)
            .execute(&mut **tx)
            .await?;
        }
        Ok(true)
    }

    /// List a project's timeline in delivery order.
    pub async fn list_for_project(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Vec<TimelineEntry>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM project_timeline WHERE project_id = $1 ORDER BY position ASC"
        );
        sqlx::query_as::<_, TimelineEntry>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await
    }

    /// Mark a timeline entry completed. Returns `true` if a row changed.
    pub async fn set_completed(
        pool: &PgPool,
        entry_id: DbId,
        completed: bool,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE project_timeline SET
                completed = $2,
                completed_at = CASE WHEN $2 THEN NOW() ELSE NULL END
             WHERE id = $1",
        )
        .bind(entry_id)
        .bind(completed)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
