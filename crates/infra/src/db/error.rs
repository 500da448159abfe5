use thiserror::Error;

use libcat_auth::PasswordError;
use libcat_core::DomainError;

pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Invalid author ID.")]
    InvalidAuthor,

    #[error("Invalid category ID.")]
    InvalidCategory,

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
}

#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("username '{0}' is already taken")]
    UsernameTaken(String),

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
}
