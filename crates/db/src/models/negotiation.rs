//! Budget negotiation entity model and DTOs.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use atelio_core::types::{DbId, Timestamp};

/// A row from the `budget_negotiations` table.
///
/// Rows are append-only: a counter-offer marks this row `countered` and
/// inserts a new `pending` row whose `original_price` is this row's
/// `proposed_price`, so the full haggling history stays auditable.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct BudgetNegotiation {
    pub id: DbId,
    pub project_id: DbId,
    pub proposed_by: DbId,
    pub original_price: Decimal,
    pub proposed_price: Decimal,
    pub message: Option<String>,
    pub status: String,
    pub responded_by: Option<DbId>,
    pub responded_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

/// DTO for opening a negotiation.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateNegotiation {
    pub proposed_price: Decimal,
    pub message: Option<String>,
}

/// DTO for responding to a pending negotiation.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum NegotiationResponse {
    Accept,
    Reject,
    Counter {
        proposed_price: Decimal,
        message: Option<String>,
    },
}
