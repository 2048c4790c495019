//! LDAP/Active Directory integration
//!
//! - `client`: connection handling, bind, and attribute search
//! - `entry`: tolerant parsing of directory entries with localized
//!   attribute names
//! - `roles`: group-name based role derivation

mod client;
mod entry;
mod roles;
mod types;

pub use client::{DirectoryAuthenticator, LdapDirectoryClient};
pub use entry::parse_entry;
pub use roles::classify;
pub use types::DirectoryIdentity;
