//! Payment-stage verification flow against a real database.
//!
//! The approve/reject guards live in SQL as conditional updates keyed on
//! `pending_verification`; these tests pin down the row-level effects:
//! proof fields cleared on reject, prior metadata preserved, and a second
//! concurrent verification losing cleanly.

use rust_decimal_macros::dec;
use sqlx::PgPool;

use atelio_core::payments::{plan_stages, StageSpec};
use atelio_core::types::DbId;
use atelio_db::models::user::CreateUser;
use atelio_db::repositories::{PaymentStageRepo, ProjectRepo, UserRepo};

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

async fn user(pool: &PgPool, email: &str, role: &str) -> DbId {
    UserRepo::create(
        pool,
        &CreateUser {
            email: email.to_string(),
            password_hash: "irrelevant".to_string(),
            full_name: "Test User".to_string(),
            role: role.to_string(),
        },
    )
    .await
    .unwrap()
    .id
}

/// One client, one admin, one project with a single immediately-payable
/// stage. Returns `(client_id, admin_id, stage_id)`.
async fn verifiable_stage(pool: &PgPool) -> (DbId, DbId, DbId) {
    let client = user(pool, "client@example.com", "client").await;
    let admin = user(pool, "admin@example.com", "admin").await;
    let project = ProjectRepo::create(pool, client, "Storefront", None, dec!(1000))
        .await
        .unwrap();

    let plans = plan_stages(
        project.price,
        &[StageSpec {
            name: "Upfront".to_string(),
            percentage: dec!(50),
            required_progress: 0,
        }],
    )
    .unwrap();

    let mut tx = pool.begin().await.unwrap();
    let stages = PaymentStageRepo::create_many_tx(&mut tx, project.id, &plans)
        .await
        .unwrap();
    tx.commit().await.unwrap();

    (client, admin, stages[0].id)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn reject_clears_proof_fields_and_keeps_prior_metadata(pool: PgPool) {
    let (client, admin, stage_id) = verifiable_stage(&pool).await;

    PaymentStageRepo::submit_proof(&pool, stage_id, "bank_transfer", "proof-1", client)
        .await
        .unwrap()
        .unwrap();

    let rejected = PaymentStageRepo::reject(&pool, stage_id, admin, "Blurry scan")
        .await
        .unwrap()
        .unwrap();

    assert_eq!(rejected.status, "available");
    assert_eq!(rejected.payment_method, None);
    assert_eq!(rejected.proof_reference, None);

    // The rejection merged into the metadata without discarding the
    // submission record.
    assert_eq!(
        rejected.metadata["last_submission"]["proof_reference"],
        "proof-1"
    );
    assert_eq!(rejected.metadata["last_rejection"]["reason"], "Blurry scan");
    assert_eq!(
        rejected.metadata["last_rejection"]["rejected_by"],
        serde_json::json!(admin)
    );
}

#[sqlx::test(migrations = "./migrations")]
async fn resubmission_reenters_review_after_rejection(pool: PgPool) {
    let (client, admin, stage_id) = verifiable_stage(&pool).await;

    PaymentStageRepo::submit_proof(&pool, stage_id, "bank_transfer", "proof-1", client)
        .await
        .unwrap()
        .unwrap();
    PaymentStageRepo::reject(&pool, stage_id, admin, "Wrong amount")
        .await
        .unwrap()
        .unwrap();

    let resubmitted =
        PaymentStageRepo::submit_proof(&pool, stage_id, "bank_transfer", "proof-2", client)
            .await
            .unwrap()
            .unwrap();

    assert_eq!(resubmitted.status, "pending_verification");
    assert_eq!(resubmitted.proof_reference.as_deref(), Some("proof-2"));
    // The earlier rejection stays on record.
    assert_eq!(
        resubmitted.metadata["last_rejection"]["reason"],
        "Wrong amount"
    );
}

#[sqlx::test(migrations = "./migrations")]
async fn approve_stamps_paid_fields(pool: PgPool) {
    let (client, admin, stage_id) = verifiable_stage(&pool).await;

    PaymentStageRepo::submit_proof(&pool, stage_id, "bank_transfer", "proof-1", client)
        .await
        .unwrap()
        .unwrap();

    let approved = PaymentStageRepo::approve(&pool, stage_id, admin)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(approved.status, "paid");
    assert_eq!(approved.approved_by, Some(admin));
    assert!(approved.paid_at.is_some());
    assert!(approved.approved_at.is_some());

    let paid = PaymentStageRepo::paid_total(&pool, approved.project_id)
        .await
        .unwrap();
    assert_eq!(paid, dec!(500.00));
}

#[sqlx::test(migrations = "./migrations")]
async fn verification_requires_a_submitted_proof(pool: PgPool) {
    let (_, admin, stage_id) = verifiable_stage(&pool).await;

    // Still 'available': the conditional updates match nothing.
    assert!(PaymentStageRepo::approve(&pool, stage_id, admin)
        .await
        .unwrap()
        .is_none());
    assert!(PaymentStageRepo::reject(&pool, stage_id, admin, "no proof")
        .await
        .unwrap()
        .is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn only_one_of_two_verifications_wins(pool: PgPool) {
    let (client, admin, stage_id) = verifiable_stage(&pool).await;

    PaymentStageRepo::submit_proof(&pool, stage_id, "bank_transfer", "proof-1", client)
        .await
        .unwrap()
        .unwrap();

    assert!(PaymentStageRepo::approve(&pool, stage_id, admin)
        .await
        .unwrap()
        .is_some());

    // The losing verifier sees zero rows, whichever action it attempts.
    assert!(PaymentStageRepo::approve(&pool, stage_id, admin)
        .await
        .unwrap()
        .is_none());
    assert!(PaymentStageRepo::reject(&pool, stage_id, admin, "late")
        .await
        .unwrap()
        .is_none());
}
