//! # Stores Shared Library
//!
//! Persistence, models and auth primitives used by the stores API server.
//!
//! ## Module Organization
//!
//! - `db`: Connection pool and embedded migrations
//! - `models`: Stores, items, tags and users
//! - `auth`: Password hashing, JWT tokens, revocation list, access checks

pub mod auth;
pub mod db;
pub mod models;

/// Current version of the shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
