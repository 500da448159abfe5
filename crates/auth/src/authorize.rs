//! The permission gate.
//!
//! A request may proceed to an operation iff the operation declares no
//! permission, or the caller is authenticated and a (caller id, permission)
//! association row exists.

use thiserror::Error;

use crate::{CallerIdentity, Permission, PermissionStore, StoreError};

#[derive(Debug, Error)]
pub enum AuthzError {
    #[error("forbidden: caller is not authenticated")]
    Unauthenticated,

    #[error("forbidden: malformed identity claim ({0})")]
    MalformedIdentity(String),

    #[error("forbidden: missing permission '{0}'")]
    Forbidden(Permission),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl AuthzError {
    /// Whether this is a deny decision (as opposed to a storage fault).
    pub fn is_denial(&self) -> bool {
        !matches!(self, AuthzError::Store(_))
    }

    /// Short machine-readable reason for audit logs.
    pub fn reason(&self) -> &'static str {
        match self {
            AuthzError::Unauthenticated => "unauthenticated",
            AuthzError::MalformedIdentity(_) => "malformed_identity",
            AuthzError::Forbidden(_) => "missing_permission",
            AuthzError::Store(_) => "store_error",
        }
    }
}

/// Decide whether `caller` may invoke an operation declaring `required`.
///
/// - `None` means the operation carries no declaration: always allowed.
/// - Exactly one store query per call when a declaration is present and the
///   caller's id decodes; nothing is cached between calls.
pub async fn authorize<S>(
    caller: &CallerIdentity,
    required: Option<Permission>,
    store: &S,
) -> Result<(), AuthzError>
where
    S: PermissionStore + ?Sized,
{
    let Some(required) = required else {
        return Ok(());
    };

    let claims = caller.claims().ok_or(AuthzError::Unauthenticated)?;
    let user_id = claims
        .user_id()
        .map_err(|e| AuthzError::MalformedIdentity(e.to_string()))?;

    if store.has_permission(user_id, required).await? {
        Ok(())
    } else {
        Err(AuthzError::Forbidden(required))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use proptest::prelude::*;
    use uuid::Uuid;

    use libcat_core::UserId;

    use super::*;
    use crate::JwtClaims;

    #[derive(Default)]
    struct Grants {
        rows: HashSet<(UserId, Permission)>,
        queries: AtomicUsize,
    }

    impl Grants {
        fn with(rows: impl IntoIterator<Item = (i64, Permission)>) -> Self {
            Self {
                rows: rows.into_iter().map(|(u, p)| (UserId::new(u), p)).collect(),
                queries: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl PermissionStore for Grants {
        async fn has_permission(&self, user_id: UserId, permission: Permission) -> Result<bool, StoreError> {
            self.queries.fetch_add(1, Ordering::SeqCst);
            Ok(self.rows.contains(&(user_id, permission)))
        }
    }

    struct FailingStore;

    #[async_trait]
    impl PermissionStore for FailingStore {
        async fn has_permission(&self, _: UserId, _: Permission) -> Result<bool, StoreError> {
            Err(StoreError::from(anyhow::anyhow!("connection reset")))
        }
    }

    fn caller(nameidentifier: Option<&str>) -> CallerIdentity {
        CallerIdentity::Authenticated(JwtClaims {
            nameidentifier: nameidentifier.map(str::to_string),
            name: "alice".to_string(),
            iss: "libcat".to_string(),
            aud: "libcat-clients".to_string(),
            iat: 0,
            exp: 60,
            jti: Uuid::nil(),
        })
    }

    #[tokio::test]
    async fn user_seven_scenario() {
        let store = Grants::with([(7, Permission::Read)]);
        let seven = caller(Some("7"));

        assert!(authorize(&seven, Some(Permission::Read), &store).await.is_ok());
        assert!(matches!(
            authorize(&seven, Some(Permission::Delete), &store).await,
            Err(AuthzError::Forbidden(Permission::Delete))
        ));
        assert!(matches!(
            authorize(&CallerIdentity::Anonymous, Some(Permission::Read), &store).await,
            Err(AuthzError::Unauthenticated)
        ));
        assert!(authorize(&CallerIdentity::Anonymous, None, &store).await.is_ok());
    }

    #[tokio::test]
    async fn undeclared_operations_do_not_touch_the_store() {
        let store = Grants::default();
        authorize(&caller(Some("1")), None, &store).await.unwrap();
        assert_eq!(store.queries.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn every_check_queries_the_store() {
        let store = Grants::with([(1, Permission::Add)]);
        let c = caller(Some("1"));
        for _ in 0..3 {
            authorize(&c, Some(Permission::Add), &store).await.unwrap();
        }
        assert_eq!(store.queries.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn malformed_identity_is_a_denial_not_a_panic() {
        let store = Grants::with([(7, Permission::Read)]);

        let err = authorize(&caller(Some("seven")), Some(Permission::Read), &store)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthzError::MalformedIdentity(_)));
        assert!(err.is_denial());

        let err = authorize(&caller(None), Some(Permission::Read), &store)
            .await
            .unwrap_err();
        assert_eq!(err.reason(), "malformed_identity");
        assert_eq!(store.queries.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn store_faults_are_not_denials() {
        let err = authorize(&caller(Some("7")), Some(Permission::Read), &FailingStore)
            .await
            .unwrap_err();
        assert!(!err.is_denial());
    }

    fn permission() -> impl Strategy<Value = Permission> {
        prop::sample::select(Permission::ALL.to_vec())
    }

    proptest! {
        #[test]
        fn allowed_iff_association_row_exists(
            rows in prop::collection::hash_set((1i64..6, permission()), 0..12),
            user in 1i64..6,
            required in permission(),
        ) {
            let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
            let expected = rows.contains(&(user, required));
            let store = Grants::with(rows);
            let c = caller(Some(&user.to_string()));

            let first = rt.block_on(authorize(&c, Some(required), &store)).is_ok();
            let second = rt.block_on(authorize(&c, Some(required), &store)).is_ok();

            prop_assert_eq!(first, expected);
            prop_assert_eq!(first, second);
        }

        #[test]
        fn anonymous_is_denied_for_every_declared_permission(
            rows in prop::collection::hash_set((1i64..6, permission()), 0..12),
            required in permission(),
        ) {
            let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
            let store = Grants::with(rows);
            let decision = rt.block_on(authorize(&CallerIdentity::Anonymous, Some(required), &store));
            prop_assert!(matches!(decision, Err(AuthzError::Unauthenticated)));
        }
    }
}
