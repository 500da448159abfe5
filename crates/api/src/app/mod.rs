//! HTTP application wiring (Axum router + shared services).
//!
//! - `routes/`: handlers, one file per catalog area
//! - `dto.rs`: request bodies
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{middleware::from_fn_with_state, Extension, Router};
use tower::ServiceBuilder;

use libcat_auth::{Hs256JwtValidator, JwtSettings, TokenIssuer};
use libcat_infra::SqliteStore;

use crate::authz::{self, GateState};
use crate::middleware::{self, AuthState};
use crate::operations::OperationTable;

pub mod dto;
pub mod errors;
pub mod routes;

/// Shared state reachable from every handler.
pub struct AppServices {
    pub store: SqliteStore,
    pub issuer: TokenIssuer,
}

/// Build the full HTTP router (public entrypoint used by `main.rs` and tests).
///
/// Every request first has its caller identity resolved; every matched route
/// then passes the permission gate before its handler runs.
pub fn build_app(jwt: JwtSettings, store: SqliteStore) -> Router {
    let auth_state = AuthState {
        jwt: Arc::new(Hs256JwtValidator::new(&jwt)),
    };
    let gate = GateState {
        operations: Arc::new(OperationTable::default()),
        store: Arc::new(store.clone()),
    };
    let services = Arc::new(AppServices {
        store,
        issuer: TokenIssuer::new(jwt),
    });

    routes::router()
        .route_layer(from_fn_with_state(gate, authz::permission_gate))
        .layer(
            ServiceBuilder::new()
                .layer(Extension(services))
                .layer(from_fn_with_state(auth_state, middleware::identity_middleware)),
        )
}
