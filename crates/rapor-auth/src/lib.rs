//! Directory-backed authentication for Rapor
//!
//! A login attempt binds against the corporate LDAP directory with the
//! user's own credentials, parses the directory entry into a normalized
//! identity, derives an application role from group membership, and
//! reconciles the local account and its group links with what the
//! directory currently reports.

pub mod ldap;
pub mod service;
pub mod sync;

pub use ldap::{DirectoryAuthenticator, DirectoryIdentity, LdapDirectoryClient};
pub use service::{AccountView, AuthResult, AuthService, GroupView};
pub use sync::IdentitySynchronizer;
