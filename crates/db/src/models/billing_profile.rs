//! Billing profile model and DTO.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use atelio_core::types::{DbId, Timestamp};

/// A row from the `billing_profiles` table. Supplies the billee block on
/// settlement documents.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct BillingProfile {
    pub id: DbId,
    pub user_id: DbId,
    pub company_name: String,
    pub tax_id: Option<String>,
    pub address: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating or replacing the caller's billing profile.
#[derive(Debug, Clone, Deserialize)]
pub struct UpsertBillingProfile {
    pub company_name: String,
    pub tax_id: Option<String>,
    pub address: Option<String>,
}
