//! Budget negotiation chain against a real database.
//!
//! Accept and counter are transactional multi-statement flows; these tests
//! verify their cross-table effects: accept moves the project's price and
//! status together, counter appends a fresh pending row carrying the
//! countered row's proposed price forward as its original price.

use rust_decimal_macros::dec;
use sqlx::PgPool;

use atelio_core::types::DbId;
use atelio_db::models::user::CreateUser;
use atelio_db::repositories::{NegotiationRepo, ProjectRepo, UserRepo};

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

/// A pending project at 1000 with one open negotiation proposing 800.
/// Returns `(admin_id, project_id, negotiation_id)`.
async fn open_negotiation(pool: &PgPool) -> (DbId, DbId, DbId) {
    let client = user(pool, "client@example.com", "client").await;
    let admin = user(pool, "admin@example.com", "admin").await;
    let project = ProjectRepo::create(pool, client, "Storefront", None, dec!(1000))
        .await
        .unwrap();

    let negotiation = NegotiationRepo::create(
        pool,
        project.id,
        client,
        project.price,
        dec!(800),
        Some("Tight budget this quarter"),
    )
    .await
    .unwrap();

    (admin, project.id, negotiation.id)
}

#[sqlx::test(migrations = "./migrations")]
async fn accept_sets_project_price_and_starts_work(pool: PgPool) {
    let (admin, project_id, negotiation_id) = open_negotiation(&pool).await;

    let (accepted, project) = NegotiationRepo::accept(&pool, negotiation_id, admin)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(accepted.status, "accepted");
    assert_eq!(accepted.responded_by, Some(admin));
    assert!(accepted.responded_at.is_some());

    // Both sides of the transaction landed together.
    assert_eq!(project.id, project_id);
    assert_eq!(project.price, dec!(800));
    assert_eq!(project.status, "in_progress");

    let reloaded = ProjectRepo::find_by_id(&pool, project_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reloaded.price, dec!(800));
    assert_eq!(reloaded.status, "in_progress");
}

#[sqlx::test(migrations = "./migrations")]
async fn a_settled_negotiation_takes_no_further_responses(pool: PgPool) {
    let (admin, project_id, negotiation_id) = open_negotiation(&pool).await;

    NegotiationRepo::reject(&pool, negotiation_id, admin)
        .await
        .unwrap()
        .unwrap();

    // Every follow-up response loses against the status condition.
    assert!(NegotiationRepo::accept(&pool, negotiation_id, admin)
        .await
        .unwrap()
        .is_none());
    assert!(NegotiationRepo::reject(&pool, negotiation_id, admin)
        .await
        .unwrap()
        .is_none());
    assert!(
        NegotiationRepo::counter(&pool, negotiation_id, admin, dec!(900), None)
            .await
            .unwrap()
            .is_none()
    );

    // A rejected proposal leaves the project untouched.
    let project = ProjectRepo::find_by_id(&pool, project_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(project.price, dec!(1000));
    assert_eq!(project.status, "pending");
}

#[sqlx::test(migrations = "./migrations")]
async fn counter_carries_the_proposed_price_forward(pool: PgPool) {
    let (admin, project_id, negotiation_id) = open_negotiation(&pool).await;

    let (countered, fresh) =
        NegotiationRepo::counter(&pool, negotiation_id, admin, dec!(900), Some("Meet halfway"))
            .await
            .unwrap()
            .unwrap();

    assert_eq!(countered.status, "countered");
    assert_eq!(countered.responded_by, Some(admin));

    // The new link in the chain: pending, authored by the responder, and
    // anchored on what was just countered.
    assert_eq!(fresh.status, "pending");
    assert_eq!(fresh.proposed_by, admin);
    assert_eq!(fresh.original_price, countered.proposed_price);
    assert_eq!(fresh.original_price, dec!(800));
    assert_eq!(fresh.proposed_price, dec!(900));
    assert_eq!(fresh.message.as_deref(), Some("Meet halfway"));

    let chain = NegotiationRepo::list_for_project(&pool, project_id)
        .await
        .unwrap();
    assert_eq!(chain.len(), 2);
    assert_eq!(chain[0].id, countered.id);
    assert_eq!(chain[1].id, fresh.id);
}
