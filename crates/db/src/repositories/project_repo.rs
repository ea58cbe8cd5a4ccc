//! Repository for the `projects` table.

use sqlx::PgPool;

use atelio_core::types::DbId;

use crate::models::project::{Project, UpdateProject};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "id, client_id, name, description, price, status, progress, created_at, updated_at";

/// Provides CRUD operations for projects.
pub struct ProjectRepo;

impl ProjectRepo {
    /// Insert a new project for a client, returning the created row.
    pub async fn create(
        pool: &PgPool,
        client_id: DbId,
        name: &str,
        description: Option<&str>,
        price: rust_decimal::Decimal,
    ) -> Result<Project, sqlx::Error> {
        let query = format!(
            "INSERT INTO projects (client_id, name, description, price)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(client_id)
            .bind(name)
            .bind(description)
            .bind(price)
            .fetch_one(pool)
            .await
    }

    /// Find a project by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Project>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM projects WHERE id = $1");
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all projects, most recently created first.
    pub async fn list(pool: &PgPool) -> Result<Vec<Project>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM projects ORDER BY created_at DESC");
        sqlx::query_as::<_, Project>(&query).fetch_all(pool).await
    }

    /// List the projects owned by one client, most recently created first.
    pub async fn list_for_client(
        pool: &PgPool,
        client_id: DbId,
    ) -> Result<Vec<Project>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM projects WHERE client_id = $1 ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(client_id)
            .fetch_all(pool)
            .await
    }

    /// Update a project. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateProject,
    ) -> Result<Option<Project>, sqlx::Error> {
        let query = format!(
            "UPDATE projects SET
                description = COALESCE($2, description),
                status = COALESCE($3, status),
                progress = COALESCE($4, progress),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(&input.description)
            .bind(&input.status)
            .bind(input.progress)
            .fetch_optional(pool)
            .await
    }

    /// Set price and status in one statement, inside an open transaction.
    /// Used by negotiation acceptance so both writes commit or neither does.
    pub async fn set_price_and_status_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: DbId,
        price: rust_decimal::Decimal,
        status: &str,
    ) -> Result<Option<Project>, sqlx::Error> {
        let query = format!(
            "UPDATE projects SET price = $2, status = $3, updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(price)
            .bind(status)
            .fetch_optional(&mut **tx)
            .await
    }
}
