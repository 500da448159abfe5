//! SQLite-backed store: credentials, permission grants and provisioning.
//!
//! Catalog queries live in [`super::catalog`] on the same type.

use async_trait::async_trait;
use sqlx::{FromRow, SqlitePool};
use tracing::instrument;

use libcat_auth::{
    hash_password, CredentialStore, Permission, PermissionStore, StoreError, UserRecord,
};
use libcat_core::UserId;

use super::error::{is_unique_violation, ProvisionError};

/// Store over a SQLite pool.
///
/// Cheap to clone; each call checks a connection out of the pool for the
/// duration of its query and returns it afterwards.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pub(crate) pool: SqlitePool,
}

#[derive(FromRow)]
struct UserRow {
    id: i64,
    username: String,
    password_hash: String,
}

impl From<UserRow> for UserRecord {
    fn from(row: UserRow) -> Self {
        UserRecord {
            id: UserId::new(row.id),
            username: row.username,
            password_hash: row.password_hash,
        }
    }
}

fn store_error(e: sqlx::Error) -> StoreError {
    StoreError::from(anyhow::Error::new(e))
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Create a user with an argon2-hashed password.
    #[instrument(skip(self, password), err)]
    pub async fn create_user(&self, username: &str, password: &str) -> Result<UserId, ProvisionError> {
        let password_hash = hash_password(password)?;
        let result = sqlx::query("INSERT INTO users (username, password_hash) VALUES (?, ?)")
            .bind(username)
            .bind(&password_hash)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    ProvisionError::UsernameTaken(username.to_string())
                } else {
                    ProvisionError::Db(e)
                }
            })?;

        let id = UserId::new(result.last_insert_rowid());
        tracing::info!(%id, username, "user created");
        Ok(id)
    }

    /// Grant `permission` to `user_id`. Granting twice is a no-op.
    pub async fn grant_permission(&self, user_id: UserId, permission: Permission) -> Result<(), ProvisionError> {
        sqlx::query("INSERT OR IGNORE INTO user_permissions (user_id, permission) VALUES (?, ?)")
            .bind(user_id.get())
            .bind(permission.as_str())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn revoke_permission(&self, user_id: UserId, permission: Permission) -> Result<(), ProvisionError> {
        sqlx::query("DELETE FROM user_permissions WHERE user_id = ? AND permission = ?")
            .bind(user_id.get())
            .bind(permission.as_str())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// All permissions granted to a user, in declaration order.
    pub async fn permissions_for(&self, user_id: UserId) -> Result<Vec<Permission>, ProvisionError> {
        let tags: Vec<String> =
            sqlx::query_scalar("SELECT permission FROM user_permissions WHERE user_id = ?")
                .bind(user_id.get())
                .fetch_all(&self.pool)
                .await?;

        let mut permissions: Vec<Permission> = tags
            .iter()
            .filter_map(|tag| match tag.parse() {
                Ok(p) => Some(p),
                Err(e) => {
                    tracing::warn!(%user_id, "ignoring grant row: {e}");
                    None
                }
            })
            .collect();
        permissions.sort();
        Ok(permissions)
    }

    /// Make sure `username` exists and holds every permission.
    ///
    /// An existing account keeps its password.
    pub async fn ensure_admin(&self, username: &str, password: &str) -> Result<UserId, ProvisionError> {
        let existing = self.find_user(username).await?;
        let user_id = match existing {
            Some(user) => user.id,
            None => self.create_user(username, password).await?,
        };
        for permission in Permission::ALL {
            self.grant_permission(user_id, permission).await?;
        }
        tracing::info!(%user_id, username, "bootstrap admin ensured");
        Ok(user_id)
    }

    async fn find_user(&self, username: &str) -> Result<Option<UserRecord>, sqlx::Error> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, username, password_hash FROM users WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(UserRecord::from))
    }
}

#[async_trait]
impl CredentialStore for SqliteStore {
    async fn find_user_by_username(&self, username: &str) -> Result<Option<UserRecord>, StoreError> {
        self.find_user(username).await.map_err(store_error)
    }
}

#[async_trait]
impl PermissionStore for SqliteStore {
    async fn has_permission(&self, user_id: UserId, permission: Permission) -> Result<bool, StoreError> {
        let exists: i64 = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM user_permissions WHERE user_id = ? AND permission = ?)",
        )
        .bind(user_id.get())
        .bind(permission.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(store_error)?;
        Ok(exists != 0)
    }
}

#[cfg(test)]
mod tests {
    use libcat_auth::verify_password;

    use super::*;
    use crate::db::connect_in_memory;

    async fn store() -> SqliteStore {
        SqliteStore::new(connect_in_memory().await.unwrap())
    }

    #[tokio::test]
    async fn passwords_are_stored_hashed() {
        let store = store().await;
        store.create_user("alice", "wonderland").await.unwrap();

        let user = store.find_user_by_username("alice").await.unwrap().unwrap();
        assert_ne!(user.password_hash, "wonderland");
        assert!(verify_password("wonderland", &user.password_hash).unwrap());
    }

    #[tokio::test]
    async fn duplicate_usernames_are_rejected() {
        let store = store().await;
        store.create_user("alice", "one").await.unwrap();
        let err = store.create_user("alice", "two").await.unwrap_err();
        assert!(matches!(err, ProvisionError::UsernameTaken(name) if name == "alice"));
    }

    #[tokio::test]
    async fn grants_are_exact_and_idempotent() {
        let store = store().await;
        let alice = store.create_user("alice", "pw").await.unwrap();
        let bob = store.create_user("bob", "pw").await.unwrap();

        store.grant_permission(alice, Permission::Read).await.unwrap();
        store.grant_permission(alice, Permission::Read).await.unwrap();

        assert!(store.has_permission(alice, Permission::Read).await.unwrap());
        assert!(!store.has_permission(alice, Permission::Delete).await.unwrap());
        assert!(!store.has_permission(bob, Permission::Read).await.unwrap());
        assert_eq!(store.permissions_for(alice).await.unwrap(), vec![Permission::Read]);

        store.revoke_permission(alice, Permission::Read).await.unwrap();
        assert!(!store.has_permission(alice, Permission::Read).await.unwrap());
    }

    #[tokio::test]
    async fn unknown_user_has_no_permissions() {
        let store = store().await;
        assert!(!store.has_permission(UserId::new(999), Permission::Read).await.unwrap());
        assert!(store.find_user_by_username("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn ensure_admin_grants_everything_once() {
        let store = store().await;
        let first = store.ensure_admin("root", "pw").await.unwrap();
        let second = store.ensure_admin("root", "other").await.unwrap();
        assert_eq!(first, second);
        assert_eq!(store.permissions_for(first).await.unwrap(), Permission::ALL.to_vec());

        let user = store.find_user_by_username("root").await.unwrap().unwrap();
        assert!(verify_password("pw", &user.password_hash).unwrap());
    }
}
