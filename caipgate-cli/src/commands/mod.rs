//! CLI command implementations

pub mod identifier;
pub mod payload;
pub mod route;
