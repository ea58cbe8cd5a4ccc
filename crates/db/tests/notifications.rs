//! Notification read/unread bookkeeping against a real database.

use sqlx::PgPool;

use atelio_core::types::DbId;
use atelio_db::models::user::CreateUser;
use atelio_db::repositories::{NotificationRepo, UserRepo};

async fn user(pool: &PgPool, email: &str) -> DbId {
    UserRepo::create(
        pool,
        &CreateUser {
            email: email.to_string(),
            password_hash: "irrelevant".to_string(),
            full_name: "Test User".to_string(),
            role: "client".to_string(),
        },
    )
    .await
    .unwrap()
    .id
}

#[sqlx::test(migrations = "./migrations")]
async fn mark_read_is_idempotent(pool: PgPool) {
    let owner = user(&pool, "client@example.com").await;
    let id = NotificationRepo::create(&pool, owner, "Stage paid", "Upfront verified", "success")
        .await
        .unwrap();

    assert!(NotificationRepo::mark_read(&pool, id, owner).await.unwrap());
    let first = NotificationRepo::list_for_user(&pool, owner, false, 10, 0)
        .await
        .unwrap();
    assert!(first[0].is_read);
    let read_at = first[0].read_at.unwrap();

    // Marking again succeeds and keeps the original timestamp.
    assert!(NotificationRepo::mark_read(&pool, id, owner).await.unwrap());
    let second = NotificationRepo::list_for_user(&pool, owner, false, 10, 0)
        .await
        .unwrap();
    assert_eq!(second[0].read_at, Some(read_at));
}

#[sqlx::test(migrations = "./migrations")]
async fn mark_read_ignores_foreign_notifications(pool: PgPool) {
    let owner = user(&pool, "owner@example.com").await;
    let other = user(&pool, "other@example.com").await;
    let id = NotificationRepo::create(&pool, owner, "Private", "Owner only", "info")
        .await
        .unwrap();

    assert!(!NotificationRepo::mark_read(&pool, id, other).await.unwrap());
    assert_eq!(NotificationRepo::unread_count(&pool, owner).await.unwrap(), 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn unread_filter_and_counts_agree(pool: PgPool) {
    let owner = user(&pool, "client@example.com").await;
    for title in ["First", "Second", "Third"] {
        NotificationRepo::create(&pool, owner, title, "body", "info")
            .await
            .unwrap();
    }
    assert_eq!(NotificationRepo::unread_count(&pool, owner).await.unwrap(), 3);

    let marked = NotificationRepo::mark_all_read(&pool, owner).await.unwrap();
    assert_eq!(marked, 3);
    assert_eq!(NotificationRepo::unread_count(&pool, owner).await.unwrap(), 0);

    // Unread-only listing is now empty; the full listing still has all three.
    let unread = NotificationRepo::list_for_user(&pool, owner, true, 10, 0)
        .await
        .unwrap();
    assert!(unread.is_empty());
    let all = NotificationRepo::list_for_user(&pool, owner, false, 10, 0)
        .await
        .unwrap();
    assert_eq!(all.len(), 3);

    // Re-running the bulk mark changes nothing.
    assert_eq!(NotificationRepo::mark_all_read(&pool, owner).await.unwrap(), 0);
}
