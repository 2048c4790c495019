//! Relational shadow store for Rapor
//!
//! Holds the local copies of directory accounts, groups, and their
//! memberships. SQLite backend via sqlx.

pub mod repository;
pub mod traits;

pub use repository::PortalStore;
pub use traits::PortalRepository;
