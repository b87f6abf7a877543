/// Integration tests for embedded migrations

use stores_shared::db::migrations::{get_migration_status, run_migrations};
use stores_shared::db::pool::{create_pool, DatabaseConfig};

#[tokio::test]
async fn test_run_migrations() {
    let pool = create_pool(DatabaseConfig::in_memory()).await.unwrap();

    run_migrations(&pool).await.unwrap();

    let status = get_migration_status(&pool).await.unwrap();
    assert_eq!(status.applied_migrations, 2);
    assert!(status.is_up_to_date);
}

#[tokio::test]
async fn test_migrations_are_idempotent() {
    let pool = create_pool(DatabaseConfig::in_memory()).await.unwrap();

    run_migrations(&pool).await.unwrap();
    run_migrations(&pool).await.unwrap();

    let status = get_migration_status(&pool).await.unwrap();
    assert_eq!(status.applied_migrations, 2);
}

#[tokio::test]
async fn test_get_migration_status_before_migrations() {
    let pool = create_pool(DatabaseConfig::in_memory()).await.unwrap();

    let status = get_migration_status(&pool).await.unwrap();
    assert_eq!(status.applied_migrations, 0);
    assert_eq!(status.latest_version, None);
    assert!(!status.is_up_to_date);
}

#[tokio::test]
async fn test_migration_creates_all_tables() {
    let pool = create_pool(DatabaseConfig::in_memory()).await.unwrap();
    run_migrations(&pool).await.unwrap();

    let tables: Vec<String> = sqlx::query_scalar(
        "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE '\\_%' ESCAPE '\\' AND name NOT LIKE 'sqlite%' ORDER BY name",
    )
    .fetch_all(&pool)
    .await
    .unwrap();

    assert_eq!(
        tables,
        vec!["item_tags", "items", "revoked_tokens", "stores", "tags", "users"]
    );
}
