//! Authentication service
//!
//! Orchestrates one login end to end: directory authentication, role
//! derivation, identity sync, and assembly of the response view. This is
//! the error boundary of the subsystem; every failure, expected or not,
//! comes back as a failed [`AuthResult`] rather than an error.

use std::sync::Arc;

use rapor_core::config::DirectoryConfig;
use rapor_core::types::{Account, Group, Role};
use rapor_core::Result;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::ldap::{classify, DirectoryAuthenticator, DirectoryIdentity};
use crate::sync::IdentitySynchronizer;
use rapor_store::PortalRepository;

/// Outcome of a login attempt. Failures carry a generic message only;
/// nothing about the directory leaks to the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<AccountView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl AuthResult {
    fn success(user: AccountView) -> Self {
        Self {
            success: true,
            user: Some(user),
            message: None,
        }
    }

    fn failure(message: &str) -> Self {
        Self {
            success: false,
            user: None,
            message: Some(message.to_string()),
        }
    }
}

/// Client-facing account projection. Credentials never appear here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountView {
    pub id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub office: Option<String>,
    pub groups: Vec<GroupView>,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupView {
    pub id: String,
    pub name: String,
}

impl AccountView {
    fn from_account(account: Account, groups: Vec<Group>) -> Self {
        Self {
            id: account.id,
            email: account.email,
            first_name: account.first_name,
            last_name: account.last_name,
            role: account.role,
            department: account.department,
            title: account.title,
            office: account.office,
            groups: groups
                .into_iter()
                .map(|g| GroupView {
                    id: g.id,
                    name: g.name,
                })
                .collect(),
            is_active: account.is_active,
        }
    }
}

pub struct AuthService<D: DirectoryAuthenticator, R: PortalRepository> {
    directory: D,
    repo: Arc<R>,
    synchronizer: IdentitySynchronizer<R>,
    admin_groups: Vec<String>,
}

impl<D: DirectoryAuthenticator, R: PortalRepository> AuthService<D, R> {
    pub fn new(directory: D, repo: Arc<R>, config: &DirectoryConfig) -> Self {
        Self {
            directory,
            synchronizer: IdentitySynchronizer::new(repo.clone()),
            repo,
            admin_groups: config.admin_groups.clone(),
        }
    }

    /// Run a full login attempt. Always resolves to an [`AuthResult`].
    pub async fn authenticate(&self, username: &str, password: &str) -> AuthResult {
        let identity = match self.directory.authenticate(username, password).await {
            Some(identity) => identity,
            None => return AuthResult::failure("Invalid username or password"),
        };

        match self.finish_login(&identity).await {
            Ok(result) => result,
            Err(e) => {
                // The user did prove their credentials; the failure is ours.
                error!("Post-authentication processing failed for {}: {}", username, e);
                AuthResult::failure("Authentication error")
            }
        }
    }

    async fn finish_login(&self, identity: &DirectoryIdentity) -> Result<AuthResult> {
        let role = classify(&identity.groups, &self.admin_groups);
        let account = self.synchronizer.sync(identity, role).await?;

        if !account.is_active {
            // The reason stays in the logs; the caller gets the same
            // message as any other failed login.
            info!("Rejected login for deactivated account {}", account.email);
            return Ok(AuthResult::failure("Invalid username or password"));
        }

        let groups = self.repo.get_account_groups(&account.id).await?;
        info!(
            "Authenticated {} ({:?}, {} groups)",
            account.email,
            account.role,
            groups.len()
        );
        Ok(AuthResult::success(AccountView::from_account(
            account, groups,
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use rapor_store::PortalStore;
    use std::collections::HashMap;

    /// Canned directory: maps (username, password) to an identity.
    struct FakeDirectory {
        users: HashMap<(String, String), DirectoryIdentity>,
    }

    impl FakeDirectory {
        fn with_user(username: &str, password: &str, identity: DirectoryIdentity) -> Self {
            let mut users = HashMap::new();
            users.insert((username.to_string(), password.to_string()), identity);
            Self { users }
        }
    }

    #[async_trait]
    impl DirectoryAuthenticator for FakeDirectory {
        async fn authenticate(&self, username: &str, password: &str) -> Option<DirectoryIdentity> {
            self.users
                .get(&(username.to_string(), password.to_string()))
                .cloned()
        }
    }

    fn identity(email: &str, department: &str, groups: &[&str]) -> DirectoryIdentity {
        DirectoryIdentity {
            username: "jdoe".to_string(),
            email: email.to_string(),
            first_name: "John".to_string(),
            last_name: "Doe".to_string(),
            phone: None,
            department: Some(department.to_string()),
            title: None,
            office: None,
            distinguished_name: None,
            groups: groups.iter().map(|g| g.to_string()).collect(),
        }
    }

    async fn service_with(
        directory: FakeDirectory,
    ) -> (AuthService<FakeDirectory, PortalStore>, Arc<PortalStore>) {
        let store = Arc::new(
            PortalStore::with_pool_size("sqlite::memory:", 1)
                .await
                .unwrap(),
        );
        let service = AuthService::new(directory, store.clone(), &DirectoryConfig::default());
        (service, store)
    }

    #[tokio::test]
    async fn successful_login_creates_and_links_everything() {
        let directory = FakeDirectory::with_user(
            "jdoe",
            "secret",
            identity("jdoe@cashmgmt.net", "Sales", &["Sales Team"]),
        );
        let (service, store) = service_with(directory).await;

        let result = service.authenticate("jdoe", "secret").await;

        assert!(result.success);
        let user = result.user.unwrap();
        assert_eq!(user.email, "jdoe@cashmgmt.net");
        assert_eq!(user.role, Role::User);
        assert_eq!(user.department.as_deref(), Some("Sales"));
        assert_eq!(user.groups.len(), 1);
        assert_eq!(user.groups[0].name, "Sales Team");

        // The account really is in the store.
        let account = store
            .find_account_by_email("jdoe@cashmgmt.net")
            .await
            .unwrap()
            .unwrap();
        assert!(account.is_active);
    }

    #[tokio::test]
    async fn wrong_password_fails_with_a_generic_message() {
        let directory = FakeDirectory::with_user(
            "jdoe",
            "secret",
            identity("jdoe@cashmgmt.net", "Sales", &["Sales Team"]),
        );
        let (service, store) = service_with(directory).await;

        let result = service.authenticate("jdoe", "wrong").await;

        assert!(!result.success);
        assert!(result.user.is_none());
        assert_eq!(result.message.as_deref(), Some("Invalid username or password"));
        // Nothing was persisted for a failed attempt.
        assert!(store
            .find_account_by_email("jdoe@cashmgmt.net")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn admin_group_membership_grants_admin_role() {
        let directory = FakeDirectory::with_user(
            "mkaya",
            "secret",
            identity(
                "mkaya@cashmgmt.net",
                "Finans",
                &["Domain Users", "TR-RG-Manager"],
            ),
        );
        let (service, _store) = service_with(directory).await;

        let result = service.authenticate("mkaya", "secret").await;

        assert!(result.success);
        let user = result.user.unwrap();
        assert_eq!(user.role, Role::Admin);
        assert_eq!(user.groups.len(), 2);
    }

    #[tokio::test]
    async fn deactivated_account_cannot_log_in() {
        let directory = FakeDirectory::with_user(
            "jdoe",
            "secret",
            identity("jdoe@cashmgmt.net", "Sales", &["Sales Team"]),
        );
        let (service, store) = service_with(directory).await;

        // First login creates the account, then an administrator turns it off.
        service.authenticate("jdoe", "secret").await;
        let account = store
            .find_account_by_email("jdoe@cashmgmt.net")
            .await
            .unwrap()
            .unwrap();
        store.set_account_active(&account.id, false).await.unwrap();

        let result = service.authenticate("jdoe", "secret").await;

        assert!(!result.success);
        assert!(result.user.is_none());
        // The refusal is indistinguishable from a bad password.
        assert_eq!(result.message.as_deref(), Some("Invalid username or password"));
    }

    #[tokio::test]
    async fn repeated_logins_are_stable() {
        let directory = FakeDirectory::with_user(
            "jdoe",
            "secret",
            identity("jdoe@cashmgmt.net", "Sales", &["Sales Team"]),
        );
        let (service, _store) = service_with(directory).await;

        let first = service.authenticate("jdoe", "secret").await;
        let second = service.authenticate("jdoe", "secret").await;

        let first = first.user.unwrap();
        let second = second.user.unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(first.groups.len(), second.groups.len());
    }
}
