//! Shepherd authserver: multi-tenant token issuance.
//!
//! Owns per-tenant RSA signing keys, composes machine and dashboard claims,
//! and dispatches OAuth-style grants. The gateway verifies what this service
//! mints via the per-tenant JWKS endpoint.
pub mod api;
pub mod app;
pub mod auth;
pub mod config;
pub mod observability;
pub mod store;
