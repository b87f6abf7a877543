/// Token revocation list
///
/// Logged-out access tokens and spent refresh tokens are recorded by their
/// `jti`. Every protected request checks membership before it is served; a
/// revoked token is rejected even though its signature and expiry are valid.
///
/// # Backends
///
/// - [`InMemoryRevocationList`]: process-local map, emptied on restart
/// - [`SqlRevocationList`]: `revoked_tokens` table, survives restarts
///
/// # Example
///
/// ```
/// use stores_shared::auth::revocation::{InMemoryRevocationList, RevocationStore};
/// use uuid::Uuid;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let list = InMemoryRevocationList::new();
/// let jti = Uuid::new_v4();
///
/// assert!(!list.is_revoked(jti).await?);
/// assert!(list.revoke(jti, i64::MAX).await?);
/// assert!(list.is_revoked(jti).await?);
/// assert!(!list.revoke(jti, i64::MAX).await?);
/// # Ok(())
/// # }
/// ```

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{SqliteExecutor, SqlitePool};
use std::collections::HashMap;
use std::str::FromStr;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Error type for revocation list operations
#[derive(Debug, thiserror::Error)]
pub enum RevocationError {
    /// Backing store failed
    #[error("Revocation store error: {0}")]
    Storage(#[from] sqlx::Error),
}

/// Which revocation backend to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RevocationBackend {
    /// Process-local set
    #[default]
    Memory,

    /// `revoked_tokens` table in the application database
    Database,
}

impl FromStr for RevocationBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "database" | "db" => Ok(Self::Database),
            other => Err(format!("Unknown revocation backend: {}", other)),
        }
    }
}

/// Set of revoked token IDs
#[async_trait]
pub trait RevocationStore: Send + Sync {
    /// Marks a token as revoked
    ///
    /// `expires_at` is the token's own expiry (Unix timestamp); past that
    /// point the entry can be forgotten, since the token fails validation anyway.
    /// Expired entries are pruned on every call.
    ///
    /// # Returns
    ///
    /// `true` if this call revoked the token, `false` if it was already revoked
    async fn revoke(&self, jti: Uuid, expires_at: i64) -> Result<bool, RevocationError>;

    /// Checks whether a token has been revoked
    async fn is_revoked(&self, jti: Uuid) -> Result<bool, RevocationError>;
}

/// Process-local revocation map (jti to expiry) guarded by an async RwLock
#[derive(Debug, Default)]
pub struct InMemoryRevocationList {
    revoked: RwLock<HashMap<Uuid, i64>>,
}

impl InMemoryRevocationList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of revoked tokens currently held
    pub async fn len(&self) -> usize {
        self.revoked.read().await.len()
    }
}

#[async_trait]
impl RevocationStore for InMemoryRevocationList {
    async fn revoke(&self, jti: Uuid, expires_at: i64) -> Result<bool, RevocationError> {
        let now = Utc::now().timestamp();
        let mut revoked = self.revoked.write().await;

        // Check and insert under one write lock so only one caller wins
        let newly_revoked = revoked.insert(jti, expires_at).is_none();
        revoked.retain(|_, exp| *exp > now);

        Ok(newly_revoked)
    }

    async fn is_revoked(&self, jti: Uuid) -> Result<bool, RevocationError> {
        Ok(self.revoked.read().await.contains_key(&jti))
    }
}

/// Revocation list persisted in the `revoked_tokens` table
#[derive(Debug, Clone)]
pub struct SqlRevocationList {
    pool: SqlitePool,
}

impl SqlRevocationList {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Deletes entries whose tokens have expired
    ///
    /// # Returns
    ///
    /// Number of entries removed
    pub async fn purge_expired(&self) -> Result<u64, RevocationError> {
        purge_expired(&self.pool).await
    }
}

async fn purge_expired<'e, E>(executor: E) -> Result<u64, RevocationError>
where
    E: SqliteExecutor<'e>,
{
    let result = sqlx::query("DELETE FROM revoked_tokens WHERE expires_at <= ?")
        .bind(Utc::now().timestamp())
        .execute(executor)
        .await?;

    Ok(result.rows_affected())
}

#[async_trait]
impl RevocationStore for SqlRevocationList {
    async fn revoke(&self, jti: Uuid, expires_at: i64) -> Result<bool, RevocationError> {
        let mut tx = self.pool.begin().await?;

        // The primary key on jti decides the winner between concurrent callers
        let inserted =
            sqlx::query("INSERT OR IGNORE INTO revoked_tokens (jti, expires_at) VALUES (?, ?)")
                .bind(jti.to_string())
                .bind(expires_at)
                .execute(&mut *tx)
                .await?
                .rows_affected();

        purge_expired(&mut *tx).await?;

        tx.commit().await?;

        Ok(inserted > 0)
    }

    async fn is_revoked(&self, jti: Uuid) -> Result<bool, RevocationError> {
        let revoked: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM revoked_tokens WHERE jti = ?)")
                .bind(jti.to_string())
                .fetch_one(&self.pool)
                .await?;

        Ok(revoked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_from_str() {
        assert_eq!("memory".parse::<RevocationBackend>(), Ok(RevocationBackend::Memory));
        assert_eq!("Database".parse::<RevocationBackend>(), Ok(RevocationBackend::Database));
        assert!("redis".parse::<RevocationBackend>().is_err());
        assert_eq!(RevocationBackend::default(), RevocationBackend::Memory);
    }

    #[tokio::test]
    async fn test_in_memory_revoke() {
        let list = InMemoryRevocationList::new();
        let revoked = Uuid::new_v4();
        let other = Uuid::new_v4();

        list.revoke(revoked, i64::MAX).await.unwrap();

        assert!(list.is_revoked(revoked).await.unwrap());
        assert!(!list.is_revoked(other).await.unwrap());
    }

    #[tokio::test]
    async fn test_in_memory_revoke_is_idempotent() {
        let list = InMemoryRevocationList::new();
        let jti = Uuid::new_v4();

        assert!(list.revoke(jti, i64::MAX).await.unwrap());
        assert!(!list.revoke(jti, i64::MAX).await.unwrap());

        assert_eq!(list.len().await, 1);
    }

    #[tokio::test]
    async fn test_in_memory_drops_expired_entries() {
        let list = InMemoryRevocationList::new();
        let now = Utc::now().timestamp();
        let live = Uuid::new_v4();

        list.revoke(live, now + 3600).await.unwrap();
        assert_eq!(list.len().await, 1);

        for _ in 0..8 {
            list.revoke(Uuid::new_v4(), now - 60).await.unwrap();
        }

        assert_eq!(list.len().await, 1);
        assert!(list.is_revoked(live).await.unwrap());
    }

    #[tokio::test]
    async fn test_in_memory_concurrent_revoke_has_one_winner() {
        let list = std::sync::Arc::new(InMemoryRevocationList::new());
        let jti = Uuid::new_v4();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let list = list.clone();
                tokio::spawn(async move { list.revoke(jti, i64::MAX).await.unwrap() })
            })
            .collect();

        let mut winners = 0;
        for handle in handles {
            if handle.await.unwrap() {
                winners += 1;
            }
        }
        assert_eq!(winners, 1);
    }

    #[tokio::test]
    async fn test_in_memory_concurrent_revocations() {
        let list = std::sync::Arc::new(InMemoryRevocationList::new());

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let list = list.clone();
                tokio::spawn(async move {
                    let jti = Uuid::new_v4();
                    list.revoke(jti, i64::MAX).await.unwrap();
                    jti
                })
            })
            .collect();

        for handle in handles {
            let jti = handle.await.unwrap();
            assert!(list.is_revoked(jti).await.unwrap());
        }
        assert_eq!(list.len().await, 16);
    }
}
