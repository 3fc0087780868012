//! Token issuance internals: key registry, claim composition, grant dispatch.
pub mod composer;
pub mod grants;
pub mod registry;
