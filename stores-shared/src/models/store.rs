/// Store model and database operations
///
/// A store owns its items and tags. Deleting a store removes both through
/// `ON DELETE CASCADE`, and the item/tag links with them.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE stores (
///     id INTEGER PRIMARY KEY AUTOINCREMENT,
///     name VARCHAR(50) NOT NULL UNIQUE
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use stores_shared::models::store::Store;
/// use sqlx::SqlitePool;
///
/// # async fn example(pool: SqlitePool) -> Result<(), sqlx::Error> {
/// let store = Store::create(&pool, "Corner Shop").await?;
/// let found = Store::find_by_id(&pool, store.id).await?;
/// assert!(found.is_some());
/// # Ok(())
/// # }
/// ```

use serde::{Deserialize, Serialize};
use sqlx::SqliteExecutor;

/// Store row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Store {
    /// Store ID (autoincrement unless assigned by an upsert)
    pub id: i64,

    /// Store name, unique across all stores
    pub name: String,
}

impl Store {
    /// Creates a new store
    ///
    /// # Errors
    ///
    /// Returns a unique-violation database error if the name is taken
    pub async fn create<'e, E>(executor: E, name: &str) -> Result<Self, sqlx::Error>
    where
        E: SqliteExecutor<'e>,
    {
        sqlx::query_as::<_, Store>("INSERT INTO stores (name) VALUES (?) RETURNING id, name")
            .bind(name)
            .fetch_one(executor)
            .await
    }

    /// Creates a store with a caller-chosen ID
    ///
    /// Used by the create-or-update endpoints, which address rows by an ID the
    /// client picked.
    pub async fn create_with_id<'e, E>(executor: E, id: i64, name: &str) -> Result<Self, sqlx::Error>
    where
        E: SqliteExecutor<'e>,
    {
        sqlx::query_as::<_, Store>(
            "INSERT INTO stores (id, name) VALUES (?, ?) RETURNING id, name",
        )
        .bind(id)
        .bind(name)
        .fetch_one(executor)
        .await
    }

    /// Finds a store by ID
    pub async fn find_by_id<'e, E>(executor: E, id: i64) -> Result<Option<Self>, sqlx::Error>
    where
        E: SqliteExecutor<'e>,
    {
        sqlx::query_as::<_, Store>("SELECT id, name FROM stores WHERE id = ?")
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Lists all stores
    pub async fn list<'e, E>(executor: E) -> Result<Vec<Self>, sqlx::Error>
    where
        E: SqliteExecutor<'e>,
    {
        sqlx::query_as::<_, Store>("SELECT id, name FROM stores ORDER BY id")
            .fetch_all(executor)
            .await
    }

    /// Renames a store
    ///
    /// # Returns
    ///
    /// The updated store, or None if no store has that ID
    pub async fn rename<'e, E>(executor: E, id: i64, name: &str) -> Result<Option<Self>, sqlx::Error>
    where
        E: SqliteExecutor<'e>,
    {
        sqlx::query_as::<_, Store>(
            "UPDATE stores SET name = ? WHERE id = ? RETURNING id, name",
        )
        .bind(name)
        .bind(id)
        .fetch_optional(executor)
        .await
    }

    /// Deletes a store and, by cascade, its items and tags
    ///
    /// # Returns
    ///
    /// True if a store was deleted, false if it didn't exist
    pub async fn delete<'e, E>(executor: E, id: i64) -> Result<bool, sqlx::Error>
    where
        E: SqliteExecutor<'e>,
    {
        let result = sqlx::query("DELETE FROM stores WHERE id = ?")
            .bind(id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
