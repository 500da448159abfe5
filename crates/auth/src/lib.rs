//! `libcat-auth`: authentication and permission checks for the catalog.
//!
//! This crate is intentionally decoupled from HTTP and from any concrete
//! storage: stores are reached through the traits in [`store`].

pub mod authorize;
pub mod claims;
pub mod identity;
pub mod issuer;
pub mod password;
pub mod permissions;
pub mod store;
pub mod token;
pub mod user;

pub use authorize::{authorize, AuthzError};
pub use claims::{JwtClaims, TokenValidationError, validate_claims};
pub use identity::CallerIdentity;
pub use issuer::{AuthError, Credentials, TokenIssuer};
pub use password::{PasswordError, hash_password, verify_password};
pub use permissions::{Permission, UnknownPermission};
pub use store::{CredentialStore, PermissionStore, StoreError};
pub use token::{Hs256JwtValidator, JwtSettings, JwtValidator, TokenError};
pub use user::UserRecord;
