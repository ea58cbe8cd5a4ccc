//! Payment stage entity model and DTOs.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use atelio_core::types::{DbId, Timestamp};

/// A row from the `payment_stages` table.
///
/// `amount` is captured when the stage is created and never recomputed,
/// even if the project price later changes through negotiation. `metadata`
/// accumulates free-form payment history (submissions, rejections).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PaymentStage {
    pub id: DbId,
    pub project_id: DbId,
    pub name: String,
    pub percentage: Decimal,
    pub amount: Decimal,
    pub required_progress: i32,
    pub status: String,
    pub payment_method: Option<String>,
    pub proof_reference: Option<String>,
    pub metadata: serde_json::Value,
    pub submitted_by: Option<DbId>,
    pub submitted_at: Option<Timestamp>,
    pub paid_at: Option<Timestamp>,
    pub approved_by: Option<DbId>,
    pub approved_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// One stage entry in a stage-creation request.
#[derive(Debug, Clone, Deserialize)]
pub struct StageInput {
    pub name: String,
    pub percentage: Decimal,
    pub required_progress: i32,
}

/// DTO for a proof-of-payment submission.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitProof {
    pub payment_method: String,
    /// Original file name of the uploaded proof; only a synthesized
    /// reference is stored, never the bytes.
    pub file_name: String,
}

/// DTO for rejecting a submitted proof.
#[derive(Debug, Clone, Deserialize)]
pub struct RejectProof {
    pub reason: String,
}
