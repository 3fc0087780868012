//! Edge gateway: bearer resolution, token verification, role enforcement,
//! and token-bounded WebSocket sessions.
pub mod app;
pub mod config;
pub mod error;
pub mod jwks_client;
pub mod observability;
pub mod security;
pub mod ws;
