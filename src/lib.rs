//! Media Shelf Library
//!
//! A library for renaming, moving and sorting movie and TV files using
//! release-style filename parsing and TMDB/OMDb metadata.

pub mod cli;
pub mod core;
pub mod error;
pub mod models;
pub mod preflight;
pub mod services;
pub mod utils;

pub use error::{Error, Result};
