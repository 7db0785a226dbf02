//! External metadata services.

pub mod omdb;
pub mod resolver;
pub mod tmdb;
