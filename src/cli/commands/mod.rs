//! CLI command implementations.

pub mod analyze;
pub mod cache;
pub mod execute;
pub mod mover;
pub mod parse;
pub mod rename;
pub mod settings;
pub mod sort;
pub mod usage;
