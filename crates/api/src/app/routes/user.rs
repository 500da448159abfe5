use std::sync::Arc;

use axum::{
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;

use libcat_auth::{AuthError, Credentials};

use crate::app::{errors, AppServices};

/// Exchange a username/password for a bearer token (plain-text body).
///
/// Unknown users and wrong passwords both get an empty 401.
pub async fn authenticate(
    Extension(services): Extension<Arc<AppServices>>,
    Json(credentials): Json<Credentials>,
) -> axum::response::Response {
    match services
        .issuer
        .authenticate(&services.store, &credentials, Utc::now())
        .await
    {
        Ok(token) => (StatusCode::OK, token).into_response(),
        Err(AuthError::InvalidCredentials) => StatusCode::UNAUTHORIZED.into_response(),
        Err(e) => {
            tracing::error!(username = %credentials.username, error = %e, "token issuance failed");
            errors::internal_error()
        }
    }
}
