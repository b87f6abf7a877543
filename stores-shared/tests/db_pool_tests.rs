/// Integration tests for the database connection pool
///
/// In-memory databases need no setup; file-backed tests use a fresh file
/// under the system temp directory.

use sqlx::Row;
use stores_shared::db::pool::{close_pool, create_pool, health_check, DatabaseConfig};
use uuid::Uuid;

fn temp_database_url() -> (String, std::path::PathBuf) {
    let path = std::env::temp_dir().join(format!("stores-test-{}.db", Uuid::new_v4()));
    (format!("sqlite://{}", path.display()), path)
}

#[tokio::test]
async fn test_create_in_memory_pool() {
    let pool = create_pool(DatabaseConfig::in_memory()).await.unwrap();

    health_check(&pool).await.unwrap();

    close_pool(pool).await;
}

#[tokio::test]
async fn test_create_pool_creates_missing_file() {
    let (url, path) = temp_database_url();
    assert!(!path.exists());

    let pool = create_pool(DatabaseConfig {
        url,
        max_connections: 2,
        ..Default::default()
    })
    .await
    .unwrap();

    assert!(path.exists(), "Database file should be created");

    close_pool(pool).await;
    std::fs::remove_file(&path).ok();
}

#[tokio::test]
async fn test_create_pool_in_missing_directory() {
    let url = format!(
        "sqlite://{}",
        std::env::temp_dir()
            .join(Uuid::new_v4().to_string())
            .join("app.db")
            .display()
    );

    let result = create_pool(DatabaseConfig {
        url,
        connect_timeout_seconds: 2,
        ..DatabaseConfig::in_memory()
    })
    .await;

    assert!(result.is_err(), "Should fail when the parent directory is missing");
}

#[tokio::test]
async fn test_foreign_keys_enabled() {
    let pool = create_pool(DatabaseConfig::in_memory()).await.unwrap();

    let row = sqlx::query("PRAGMA foreign_keys").fetch_one(&pool).await.unwrap();
    let enabled: i64 = row.get(0);
    assert_eq!(enabled, 1);

    close_pool(pool).await;
}

#[tokio::test]
async fn test_in_memory_database_outlives_statements() {
    let pool = create_pool(DatabaseConfig::in_memory()).await.unwrap();

    sqlx::query("CREATE TABLE kv (k TEXT PRIMARY KEY, v TEXT)")
        .execute(&pool)
        .await
        .unwrap();
    sqlx::query("INSERT INTO kv VALUES ('a', 'b')")
        .execute(&pool)
        .await
        .unwrap();

    let value: String = sqlx::query_scalar("SELECT v FROM kv WHERE k = 'a'")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(value, "b");

    close_pool(pool).await;
}

#[tokio::test]
async fn test_pool_transaction_rollback() {
    let pool = create_pool(DatabaseConfig::in_memory()).await.unwrap();

    sqlx::query("CREATE TABLE counter (n INTEGER)")
        .execute(&pool)
        .await
        .unwrap();

    let mut tx = pool.begin().await.unwrap();
    sqlx::query("INSERT INTO counter VALUES (1)")
        .execute(&mut *tx)
        .await
        .unwrap();
    tx.rollback().await.unwrap();

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM counter")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 0, "Rolled back insert should not be visible");

    close_pool(pool).await;
}

#[tokio::test]
async fn test_close_pool() {
    let pool = create_pool(DatabaseConfig::in_memory()).await.unwrap();
    let handle = pool.clone();

    close_pool(pool).await;

    assert!(handle.is_closed());
    assert!(health_check(&handle).await.is_err());
}
