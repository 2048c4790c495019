//! Directory identity types

use rapor_core::utils::capitalize;
use serde::{Deserialize, Serialize};

/// Normalized identity produced from one directory login.
///
/// Ephemeral; the persisted shadow of this record is `Account`. Every field
/// except `groups` is best effort: the entry parser fills in whatever the
/// directory returned and derives the rest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryIdentity {
    /// Logon name, case-preserved as the directory returned it.
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub department: Option<String>,
    pub title: Option<String>,
    pub office: Option<String>,
    pub distinguished_name: Option<String>,
    /// Group display names; never empty.
    pub groups: Vec<String>,
}

impl DirectoryIdentity {
    /// Fallback identity used when the bind succeeded but the follow-up
    /// attribute search did not produce an entry. The bind alone is
    /// authoritative for authentication; the rest is synthesized.
    pub fn minimal(username: &str, domain: &str, default_group: &str) -> Self {
        Self {
            username: username.to_string(),
            email: format!("{}@{}", username, domain),
            first_name: capitalize(username),
            last_name: String::new(),
            phone: None,
            department: None,
            title: None,
            office: None,
            distinguished_name: None,
            groups: vec![default_group.to_string()],
        }
    }
}
