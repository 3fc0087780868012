//! HTTP API surface.
pub mod error;
pub mod jwks;
pub mod openapi;
pub mod system;
pub mod token;
pub mod types;
