//! CLI command implementations.

pub mod manifest;
pub mod routes;
