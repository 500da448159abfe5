use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use chrono::Utc;

use libcat_auth::{CallerIdentity, JwtValidator};

use crate::context::CallerContext;

#[derive(Clone)]
pub struct AuthState {
    pub jwt: Arc<dyn JwtValidator>,
}

/// Resolve the caller identity from the bearer token, if any.
///
/// Never rejects: a missing or invalid token yields an anonymous caller and
/// the decision is left to the permission gate.
pub async fn identity_middleware(
    State(state): State<AuthState>,
    mut req: Request,
    next: Next,
) -> Response {
    let identity = match extract_bearer(req.headers()) {
        Ok(None) => CallerIdentity::Anonymous,
        Ok(Some(token)) => match state.jwt.validate(token, Utc::now()) {
            Ok(claims) => CallerIdentity::Authenticated(claims),
            Err(e) => {
                tracing::debug!("bearer token rejected: {e}");
                CallerIdentity::Anonymous
            }
        },
        Err(reason) => {
            tracing::debug!("authorization header ignored: {reason}");
            CallerIdentity::Anonymous
        }
    };

    req.extensions_mut().insert(CallerContext::new(identity));
    next.run(req).await
}

fn extract_bearer(headers: &HeaderMap) -> Result<Option<&str>, &'static str> {
    let Some(header) = headers.get(axum::http::header::AUTHORIZATION) else {
        return Ok(None);
    };

    let header = header.to_str().map_err(|_| "non-ascii header value")?;

    let token = header
        .strip_prefix("Bearer ")
        .ok_or("not a bearer credential")?
        .trim();
    if token.is_empty() {
        return Err("empty bearer token");
    }

    Ok(Some(token))
}
