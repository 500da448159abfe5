//! HTTP API: router, identity resolution, permission gate, and handlers.

pub mod app;
pub mod authz;
pub mod context;
pub mod middleware;
pub mod operations;
