//! Permission gate applied in front of every routed operation.
//!
//! Resolves the matched route to its entry in the operation table, then runs
//! the permission check against the caller identity resolved earlier by
//! [`crate::middleware::identity_middleware`].

use std::sync::Arc;

use axum::{
    extract::{MatchedPath, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};

use libcat_auth::{authorize, AuthzError, PermissionStore};

use crate::app::errors;
use crate::context::CallerContext;
use crate::operations::OperationTable;

#[derive(Clone)]
pub struct GateState {
    pub operations: Arc<OperationTable>,
    pub store: Arc<dyn PermissionStore>,
}

/// Allow the request through or short-circuit with 401/403/500.
///
/// A route that is missing from the operation table is denied.
/// Handlers only run for (method, path) pairs found in the table.
pub async fn permission_gate(
    State(state): State<GateState>,
    matched: Option<MatchedPath>,
    req: Request,
    next: Next,
) -> Response {
    let Some(path) = matched.as_ref().map(|m| m.as_str()) else {
        tracing::error!(method = %req.method(), "request reached the gate without a matched route");
        return StatusCode::FORBIDDEN.into_response();
    };

    let Some(op) = state.operations.resolve(req.method(), path) else {
        if state.operations.has_path(path) {
            // Method not served on this path; the router answers 405.
            return next.run(req).await;
        }
        tracing::error!(method = %req.method(), path, "route has no registered operation");
        return StatusCode::FORBIDDEN.into_response();
    };

    let caller = req
        .extensions()
        .get::<CallerContext>()
        .cloned()
        .unwrap_or_default();
    let identity = caller.identity();

    if op.authenticated && !identity.is_authenticated() {
        tracing::info!(operation = op.id, "request rejected: authentication required");
        return StatusCode::UNAUTHORIZED.into_response();
    }

    match authorize(identity, op.permission, &*state.store).await {
        Ok(()) => next.run(req).await,
        Err(AuthzError::Store(e)) => {
            tracing::error!(operation = op.id, error = %e, "permission lookup failed");
            errors::internal_error()
        }
        Err(e) => {
            tracing::info!(
                operation = op.id,
                permission = op.permission.map(|p| p.as_str()),
                reason = e.reason(),
                user = identity.username(),
                "authorization denied"
            );
            StatusCode::FORBIDDEN.into_response()
        }
    }
}
