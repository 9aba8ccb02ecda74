//! Command implementations.

pub mod render;
pub mod schema;
pub mod validate;
