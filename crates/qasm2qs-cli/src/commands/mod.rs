//! CLI command implementations.

pub mod translate;
pub mod version;
