/// Item model and database operations
///
/// # Schema
///
/// ```sql
/// CREATE TABLE items (
///     id INTEGER PRIMARY KEY AUTOINCREMENT,
///     name VARCHAR(80) NOT NULL,
///     price REAL NOT NULL,
///     store_id INTEGER NOT NULL REFERENCES stores(id) ON DELETE CASCADE
/// );
/// ```

use serde::{Deserialize, Serialize};
use sqlx::SqliteExecutor;

/// Item row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Item {
    /// Item ID
    pub id: i64,

    /// Item name
    pub name: String,

    /// Unit price
    pub price: f64,

    /// Owning store
    pub store_id: i64,
}

/// Input for creating a new item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateItem {
    /// Item name
    pub name: String,

    /// Unit price
    pub price: f64,

    /// Owning store (must exist)
    pub store_id: i64,
}

/// Input for updating an existing item
///
/// Only non-None fields are written.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateItem {
    /// New name
    pub name: Option<String>,

    /// New price
    pub price: Option<f64>,

    /// Move the item to another store
    pub store_id: Option<i64>,
}

impl UpdateItem {
    /// Returns true if no field would change
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.price.is_none() && self.store_id.is_none()
    }
}

const ITEM_COLUMNS: &str = "id, name, price, store_id";

impl Item {
    /// Creates a new item with an autoincrement ID
    ///
    /// # Errors
    ///
    /// Returns a foreign-key database error if the store does not exist
    pub async fn create<'e, E>(executor: E, data: CreateItem) -> Result<Self, sqlx::Error>
    where
        E: SqliteExecutor<'e>,
    {
        sqlx::query_as::<_, Item>(&format!(
            "INSERT INTO items (name, price, store_id) VALUES (?, ?, ?) RETURNING {ITEM_COLUMNS}"
        ))
        .bind(data.name)
        .bind(data.price)
        .bind(data.store_id)
        .fetch_one(executor)
        .await
    }

    /// Creates an item with a caller-chosen ID
    pub async fn create_with_id<'e, E>(
        executor: E,
        id: i64,
        data: CreateItem,
    ) -> Result<Self, sqlx::Error>
    where
        E: SqliteExecutor<'e>,
    {
        sqlx::query_as::<_, Item>(&format!(
            "INSERT INTO items (id, name, price, store_id) VALUES (?, ?, ?, ?) RETURNING {ITEM_COLUMNS}"
        ))
        .bind(id)
        .bind(data.name)
        .bind(data.price)
        .bind(data.store_id)
        .fetch_one(executor)
        .await
    }

    /// Finds an item by ID
    pub async fn find_by_id<'e, E>(executor: E, id: i64) -> Result<Option<Self>, sqlx::Error>
    where
        E: SqliteExecutor<'e>,
    {
        sqlx::query_as::<_, Item>(&format!("SELECT {ITEM_COLUMNS} FROM items WHERE id = ?"))
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Lists all items
    pub async fn list<'e, E>(executor: E) -> Result<Vec<Self>, sqlx::Error>
    where
        E: SqliteExecutor<'e>,
    {
        sqlx::query_as::<_, Item>(&format!("SELECT {ITEM_COLUMNS} FROM items ORDER BY id"))
            .fetch_all(executor)
            .await
    }

    /// Lists the items of one store
    pub async fn list_by_store<'e, E>(executor: E, store_id: i64) -> Result<Vec<Self>, sqlx::Error>
    where
        E: SqliteExecutor<'e>,
    {
        sqlx::query_as::<_, Item>(&format!(
            "SELECT {ITEM_COLUMNS} FROM items WHERE store_id = ? ORDER BY id"
        ))
        .bind(store_id)
        .fetch_all(executor)
        .await
    }

    /// Lists the items carrying a tag
    pub async fn list_by_tag<'e, E>(executor: E, tag_id: i64) -> Result<Vec<Self>, sqlx::Error>
    where
        E: SqliteExecutor<'e>,
    {
        sqlx::query_as::<_, Item>(
            r#"
            SELECT i.id, i.name, i.price, i.store_id
            FROM items i
            JOIN item_tags it ON it.item_id = i.id
            WHERE it.tag_id = ?
            ORDER BY i.id
            "#,
        )
        .bind(tag_id)
        .fetch_all(executor)
        .await
    }

    /// Updates an existing item
    ///
    /// Fields left as None keep their current value.
    ///
    /// # Returns
    ///
    /// The updated item, or None if no item has that ID
    pub async fn update<'e, E>(
        executor: E,
        id: i64,
        data: UpdateItem,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: SqliteExecutor<'e>,
    {
        sqlx::query_as::<_, Item>(&format!(
            r#"
            UPDATE items
            SET name = COALESCE(?, name),
                price = COALESCE(?, price),
                store_id = COALESCE(?, store_id)
            WHERE id = ?
            RETURNING {ITEM_COLUMNS}
            "#
        ))
        .bind(data.name)
        .bind(data.price)
        .bind(data.store_id)
        .bind(id)
        .fetch_optional(executor)
        .await
    }

    /// Deletes an item by ID
    ///
    /// # Returns
    ///
    /// True if the item was deleted, false if it didn't exist
    pub async fn delete<'e, E>(executor: E, id: i64) -> Result<bool, sqlx::Error>
    where
        E: SqliteExecutor<'e>,
    {
        let result = sqlx::query("DELETE FROM items WHERE id = ?")
            .bind(id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_item_default_is_empty() {
        assert!(UpdateItem::default().is_empty());

        let update = UpdateItem {
            price: Some(2.5),
            ..Default::default()
        };
        assert!(!update.is_empty());
    }
}
