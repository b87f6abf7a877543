/// Tag model, item links and database operations
///
/// Tags belong to a store and are attached to items of the same store through
/// the `item_tags` association table.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE tags (
///     id INTEGER PRIMARY KEY AUTOINCREMENT,
///     name VARCHAR(80) NOT NULL,
///     store_id INTEGER NOT NULL REFERENCES stores(id) ON DELETE CASCADE,
///     UNIQUE (store_id, name)
/// );
///
/// CREATE TABLE item_tags (
///     item_id INTEGER NOT NULL REFERENCES items(id) ON DELETE CASCADE,
///     tag_id INTEGER NOT NULL REFERENCES tags(id) ON DELETE CASCADE,
///     PRIMARY KEY (item_id, tag_id)
/// );
/// ```

use serde::{Deserialize, Serialize};
use sqlx::SqliteExecutor;

/// Tag row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Tag {
    /// Tag ID
    pub id: i64,

    /// Tag name, unique within its store
    pub name: String,

    /// Owning store
    pub store_id: i64,
}

/// One row of the item/tag association table
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::FromRow)]
pub struct ItemTag {
    pub item_id: i64,
    pub tag_id: i64,
}

impl Tag {
    /// Creates a tag in a store
    ///
    /// # Errors
    ///
    /// Returns a unique-violation database error if the store already has a
    /// tag with this name
    pub async fn create<'e, E>(executor: E, store_id: i64, name: &str) -> Result<Self, sqlx::Error>
    where
        E: SqliteExecutor<'e>,
    {
        sqlx::query_as::<_, Tag>(
            "INSERT INTO tags (name, store_id) VALUES (?, ?) RETURNING id, name, store_id",
        )
        .bind(name)
        .bind(store_id)
        .fetch_one(executor)
        .await
    }

    /// Finds a tag by ID
    pub async fn find_by_id<'e, E>(executor: E, id: i64) -> Result<Option<Self>, sqlx::Error>
    where
        E: SqliteExecutor<'e>,
    {
        sqlx::query_as::<_, Tag>("SELECT id, name, store_id FROM tags WHERE id = ?")
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Finds a tag by name within a store
    pub async fn find_by_store_and_name<'e, E>(
        executor: E,
        store_id: i64,
        name: &str,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: SqliteExecutor<'e>,
    {
        sqlx::query_as::<_, Tag>(
            "SELECT id, name, store_id FROM tags WHERE store_id = ? AND name = ?",
        )
        .bind(store_id)
        .bind(name)
        .fetch_optional(executor)
        .await
    }

    /// Lists all tags
    pub async fn list<'e, E>(executor: E) -> Result<Vec<Self>, sqlx::Error>
    where
        E: SqliteExecutor<'e>,
    {
        sqlx::query_as::<_, Tag>("SELECT id, name, store_id FROM tags ORDER BY id")
            .fetch_all(executor)
            .await
    }

    /// Lists the tags of one store
    pub async fn list_by_store<'e, E>(executor: E, store_id: i64) -> Result<Vec<Self>, sqlx::Error>
    where
        E: SqliteExecutor<'e>,
    {
        sqlx::query_as::<_, Tag>(
            "SELECT id, name, store_id FROM tags WHERE store_id = ? ORDER BY id",
        )
        .bind(store_id)
        .fetch_all(executor)
        .await
    }

    /// Lists the tags attached to an item
    pub async fn list_by_item<'e, E>(executor: E, item_id: i64) -> Result<Vec<Self>, sqlx::Error>
    where
        E: SqliteExecutor<'e>,
    {
        sqlx::query_as::<_, Tag>(
            r#"
            SELECT t.id, t.name, t.store_id
            FROM tags t
            JOIN item_tags it ON it.tag_id = t.id
            WHERE it.item_id = ?
            ORDER BY t.id
            "#,
        )
        .bind(item_id)
        .fetch_all(executor)
        .await
    }

    /// Drops links between an item and tags of other stores
    ///
    /// Run after moving an item so every link stays within one store.
    ///
    /// # Returns
    ///
    /// Number of links removed
    pub async fn unlink_foreign_tags<'e, E>(executor: E, item_id: i64) -> Result<u64, sqlx::Error>
    where
        E: SqliteExecutor<'e>,
    {
        let result = sqlx::query(
            r#"
            DELETE FROM item_tags
            WHERE item_id = ?
              AND tag_id IN (
                  SELECT t.id
                  FROM tags t
                  JOIN items i ON i.id = item_tags.item_id
                  WHERE t.store_id <> i.store_id
              )
            "#,
        )
        .bind(item_id)
        .execute(executor)
        .await?;

        Ok(result.rows_affected())
    }

    /// Attaches a tag to an item
    ///
    /// # Returns
    ///
    /// True if a link was added, false if it already existed
    pub async fn link_item<'e, E>(executor: E, item_id: i64, tag_id: i64) -> Result<bool, sqlx::Error>
    where
        E: SqliteExecutor<'e>,
    {
        let result = sqlx::query("INSERT OR IGNORE INTO item_tags (item_id, tag_id) VALUES (?, ?)")
            .bind(item_id)
            .bind(tag_id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Detaches a tag from an item
    ///
    /// # Returns
    ///
    /// True if a link was removed, false if there was none
    pub async fn unlink_item<'e, E>(executor: E, item_id: i64, tag_id: i64) -> Result<bool, sqlx::Error>
    where
        E: SqliteExecutor<'e>,
    {
        let result = sqlx::query("DELETE FROM item_tags WHERE item_id = ? AND tag_id = ?")
            .bind(item_id)
            .bind(tag_id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists every item/tag link
    pub async fn list_links<'e, E>(executor: E) -> Result<Vec<ItemTag>, sqlx::Error>
    where
        E: SqliteExecutor<'e>,
    {
        sqlx::query_as::<_, ItemTag>("SELECT item_id, tag_id FROM item_tags ORDER BY item_id, tag_id")
            .fetch_all(executor)
            .await
    }

    /// Deletes a tag unless it is attached to an item
    ///
    /// The link check and the delete run as one statement.
    ///
    /// # Returns
    ///
    /// True if the tag was deleted, false if it is missing or still linked
    pub async fn delete_unlinked<'e, E>(executor: E, id: i64) -> Result<bool, sqlx::Error>
    where
        E: SqliteExecutor<'e>,
    {
        let result = sqlx::query(
            r#"
            DELETE FROM tags
            WHERE id = ?
              AND NOT EXISTS (SELECT 1 FROM item_tags WHERE tag_id = tags.id)
            "#,
        )
        .bind(id)
        .execute(executor)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
