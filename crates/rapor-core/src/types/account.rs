//! Account types
//!
//! A local shadow of a directory principal. Accounts are unique by email and
//! are only ever created or refreshed by directory sync; nothing here deletes
//! them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Role;
use crate::utils::normalize;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    /// Diacritic-folded, lower-cased copies kept for search.
    pub normalized_first_name: String,
    pub normalized_last_name: String,
    pub phone: Option<String>,
    pub department: Option<String>,
    pub title: Option<String>,
    pub office: Option<String>,
    pub distinguished_name: Option<String>,
    pub role: Role,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Fields required to create a new account.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub department: Option<String>,
    pub title: Option<String>,
    pub office: Option<String>,
    pub distinguished_name: Option<String>,
    pub role: Role,
}

impl NewAccount {
    pub fn into_account(self) -> Account {
        let normalized_first_name = normalize(&self.first_name);
        let normalized_last_name = normalize(&self.last_name);
        Account {
            id: uuid::Uuid::new_v4().to_string(),
            email: self.email,
            first_name: self.first_name,
            last_name: self.last_name,
            normalized_first_name,
            normalized_last_name,
            phone: self.phone,
            department: self.department,
            title: self.title,
            office: self.office,
            distinguished_name: self.distinguished_name,
            role: self.role,
            is_active: true,
            created_at: Utc::now(),
        }
    }
}

/// Organizational fields refreshed on every successful login.
///
/// Name, email, role, and the active flag are deliberately absent: repeated
/// logins must not clobber values an administrator edited by hand.
#[derive(Debug, Clone, Default)]
pub struct AccountOrgFields {
    pub phone: Option<String>,
    pub department: Option<String>,
    pub title: Option<String>,
    pub office: Option<String>,
    pub distinguished_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_account_normalizes_names_and_activates() {
        let account = NewAccount {
            email: "cagri.gul@cashmgmt.net".to_string(),
            first_name: "Çağrı".to_string(),
            last_name: "Gül".to_string(),
            phone: None,
            department: None,
            title: None,
            office: None,
            distinguished_name: None,
            role: Role::User,
        }
        .into_account();

        assert_eq!(account.normalized_first_name, "cagri");
        assert_eq!(account.normalized_last_name, "gul");
        assert!(account.is_active);
    }
}
