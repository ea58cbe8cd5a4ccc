//! Repository for the `billing_profiles` table.

use sqlx::PgPool;

use atelio_core::types::DbId;

use crate::models::billing_profile::{BillingProfile, UpsertBillingProfile};

const COLUMNS: &str = "id, user_id, company_name, tax_id, address, created_at, updated_at";

/// Provides billing-profile storage, one profile per user.
pub struct BillingProfileRepo;

impl BillingProfileRepo {
    /// Create or replace the profile for a user, returning the row.
    pub async fn upsert(
        pool: &PgPool,
        user_id: DbId,
        input: &UpsertBillingProfile,
    ) -> Result<BillingProfile, sqlx::Error> {
        let query = format!(
            "INSERT INTO billing_profiles (user_id, company_name, tax_id, address)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT ON CONSTRAINT uq_billing_profiles_user_id DO UPDATE SET
                company_name = EXCLUDED.company_name,
                tax_id = EXCLUDED.tax_id,
                address = EXCLUDED.address,
                updated_at = NOW()
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, BillingProfile>(&query)
            .bind(user_id)
            .bind(&input.company_name)
            .bind(&input.tax_id)
            .bind(&input.address)
            .fetch_one(pool)
            .await
    }

    /// Find the profile for a user.
    pub async fn find_by_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Option<BillingProfile>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM billing_profiles WHERE user_id = $1");
        sqlx::query_as::<_, BillingProfile>(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }
}
