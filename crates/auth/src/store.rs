//! Storage seams used by the gate and the token issuer.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use libcat_core::UserId;

use crate::{Permission, UserRecord};

/// Opaque storage fault. These are never turned into allow/deny decisions.
#[derive(Debug, Error)]
#[error("credential store failure: {0}")]
pub struct StoreError(#[from] anyhow::Error);

/// Read access to the user/permission association rows.
#[async_trait]
pub trait PermissionStore: Send + Sync {
    /// Whether a (user, permission) row exists.
    async fn has_permission(&self, user_id: UserId, permission: Permission) -> Result<bool, StoreError>;
}

/// Read access to user credentials.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find_user_by_username(&self, username: &str) -> Result<Option<UserRecord>, StoreError>;
}

#[async_trait]
impl<S> PermissionStore for Arc<S>
where
    S: PermissionStore + ?Sized,
{
    async fn has_permission(&self, user_id: UserId, permission: Permission) -> Result<bool, StoreError> {
        (**self).has_permission(user_id, permission).await
    }
}

#[async_trait]
impl<S> CredentialStore for Arc<S>
where
    S: CredentialStore + ?Sized,
{
    async fn find_user_by_username(&self, username: &str) -> Result<Option<UserRecord>, StoreError> {
        (**self).find_user_by_username(username).await
    }
}
