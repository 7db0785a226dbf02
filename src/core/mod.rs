//! Core business logic modules.

pub mod cache;
pub mod executor;
pub mod modules;
pub mod monitor;
pub mod parser;
pub mod queue;
pub mod renamer;
pub mod sorter;
pub mod usage;
