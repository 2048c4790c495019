//! Identity synchronization
//!
//! Mirrors a directory identity into the portal database on every successful
//! login: find-or-create the account, refresh its organizational fields,
//! ensure every directory group exists locally, and reconcile memberships
//! with a single atomic set diff. Running the same identity twice is a
//! no-op on the second pass.

use std::collections::HashSet;
use std::sync::Arc;

use rapor_core::types::{Account, AccountOrgFields, NewAccount, NewGroup, Role};
use rapor_core::{Error, Result};
use tracing::{debug, info};

use crate::ldap::DirectoryIdentity;
use rapor_store::PortalRepository;

pub struct IdentitySynchronizer<R: PortalRepository> {
    repo: Arc<R>,
}

impl<R: PortalRepository> IdentitySynchronizer<R> {
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    /// Persist the identity and return the up-to-date account record.
    pub async fn sync(&self, identity: &DirectoryIdentity, role: Role) -> Result<Account> {
        let account = self.sync_account(identity, role).await?;
        self.sync_memberships(&account, &identity.groups).await?;
        Ok(account)
    }

    async fn sync_account(&self, identity: &DirectoryIdentity, role: Role) -> Result<Account> {
        let org_fields = AccountOrgFields {
            phone: identity.phone.clone(),
            department: identity.department.clone(),
            title: identity.title.clone(),
            office: identity.office.clone(),
            distinguished_name: identity.distinguished_name.clone(),
        };

        match self.repo.find_account_by_email(&identity.email).await? {
            Some(existing) => {
                // Only the organizational fields follow the directory on a
                // repeat login; name, email, role, and the active flag keep
                // whatever the portal already holds.
                debug!("Refreshing account {} from the directory", identity.email);
                self.repo
                    .update_account_org_fields(&existing.id, &org_fields)
                    .await
            }
            None => {
                info!("Creating account {} from the directory", identity.email);
                self.repo
                    .create_account(&NewAccount {
                        email: identity.email.clone(),
                        first_name: identity.first_name.clone(),
                        last_name: identity.last_name.clone(),
                        phone: org_fields.phone,
                        department: org_fields.department,
                        title: org_fields.title,
                        office: org_fields.office,
                        distinguished_name: org_fields.distinguished_name,
                        role,
                    })
                    .await
            }
        }
    }

    async fn sync_memberships(&self, account: &Account, group_names: &[String]) -> Result<()> {
        let mut target_ids = HashSet::new();
        for name in group_names {
            let name = name.trim();
            if name.is_empty() {
                continue;
            }
            target_ids.insert(self.ensure_group(name).await?);
        }

        let current_ids: HashSet<String> = self
            .repo
            .get_account_group_ids(&account.id)
            .await?
            .into_iter()
            .collect();

        let to_connect: Vec<String> = target_ids.difference(&current_ids).cloned().collect();
        let to_disconnect: Vec<String> = current_ids.difference(&target_ids).cloned().collect();

        if to_connect.is_empty() && to_disconnect.is_empty() {
            return Ok(());
        }

        debug!(
            "Reconciling memberships for {}: +{} -{}",
            account.email,
            to_connect.len(),
            to_disconnect.len()
        );
        self.repo
            .update_account_group_links(&account.id, &to_connect, &to_disconnect)
            .await
    }

    /// Return the id of the local group matching `name`, creating it when it
    /// does not exist yet. Lookup is diacritic- and case-insensitive, so
    /// "YÖNETİCİLER" and "Yöneticiler" resolve to one group.
    async fn ensure_group(&self, name: &str) -> Result<String> {
        if let Some(group) = self.repo.find_group_by_normalized_name(name).await? {
            return Ok(group.id);
        }

        match self.repo.create_group(&NewGroup::directory_sourced(name)).await {
            Ok(group) => Ok(group.id),
            // Lost a create race against a concurrent login; the group is
            // there now.
            Err(Error::GroupAlreadyExists) => self
                .repo
                .find_group_by_normalized_name(name)
                .await?
                .map(|g| g.id)
                .ok_or_else(|| {
                    Error::InternalError(format!("group {} vanished after create conflict", name))
                }),
            Err(e) => Err(e),
        }
    }
}
