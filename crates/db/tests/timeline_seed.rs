//! Default-timeline seeding against a real database.

use rust_decimal_macros::dec;
use sqlx::PgPool;

use atelio_core::timeline::DEFAULT_TIMELINE;
use atelio_db::models::user::CreateUser;
use atelio_db::repositories::{ProjectRepo, TimelineRepo, UserRepo};

async fn project(pool: &PgPool) -> i64 {
    let client = UserRepo::create(
        pool,
        &CreateUser {
            email: "client@example.com".to_string(),
            password_hash: "irrelevant".to_string(),
            full_name: "Test User".to_string(),
            role: "client".to_string(),
        },
    )
    .await
    .unwrap()
    .id;

    ProjectRepo::create(pool, client, "Storefront", None, dec!(1000))
        .await
        .unwrap()
        .id
}

#[sqlx::test(migrations = "./migrations")]
async fn seeding_is_idempotent(pool: PgPool) {
    let project_id = project(&pool).await;

    let mut tx = pool.begin().await.unwrap();
    assert!(TimelineRepo::seed_defaults_tx(&mut tx, project_id)
        .await
        .unwrap());
    tx.commit().await.unwrap();

    // A second seeding attempt, as when a payment plan is re-created,
    // inserts nothing.
    let mut tx = pool.begin().await.unwrap();
    assert!(!TimelineRepo::seed_defaults_tx(&mut tx, project_id)
        .await
        .unwrap());
    tx.commit().await.unwrap();

    let entries = TimelineRepo::list_for_project(&pool, project_id)
        .await
        .unwrap();
    assert_eq!(entries.len(), DEFAULT_TIMELINE.len());

    for (i, entry) in entries.iter().enumerate() {
        assert_eq!(entry.position, i as i32 + 1);
        assert_eq!(entry.title, DEFAULT_TIMELINE[i].title);
        assert!(!entry.completed);
    }
}

#[sqlx::test(migrations = "./migrations")]
async fn completion_stamps_and_clears_the_timestamp(pool: PgPool) {
    let project_id = project(&pool).await;

    let mut tx = pool.begin().await.unwrap();
    TimelineRepo::seed_defaults_tx(&mut tx, project_id)
        .await
        .unwrap();
    tx.commit().await.unwrap();

    let entries = TimelineRepo::list_for_project(&pool, project_id)
        .await
        .unwrap();
    let first = entries[0].id;

    assert!(TimelineRepo::set_completed(&pool, first, true).await.unwrap());
    let entries = TimelineRepo::list_for_project(&pool, project_id)
        .await
        .unwrap();
    assert!(entries[0].completed);
    assert!(entries[0].completed_at.is_some());

    // Un-completing clears the timestamp again.
    assert!(TimelineRepo::set_completed(&pool, first, false).await.unwrap());
    let entries = TimelineRepo::list_for_project(&pool, project_id)
        .await
        .unwrap();
    assert!(!entries[0].completed);
    assert!(entries[0].completed_at.is_none());
}
