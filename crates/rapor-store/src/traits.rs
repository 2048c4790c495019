//! Portal repository trait
//!
//! The persistence primitives consumed by directory sync and the
//! authentication service. Accounts and groups are owned by this layer;
//! callers only ever create, refresh, and link them.

use async_trait::async_trait;
use rapor_core::types::{Account, AccountOrgFields, Group, NewAccount, NewGroup};
use rapor_core::Result;

#[async_trait]
pub trait PortalRepository: Send + Sync {
    // ============= Account Operations =============

    async fn find_account_by_email(&self, email: &str) -> Result<Option<Account>>;

    async fn create_account(&self, account: &NewAccount) -> Result<Account>;

    /// Refresh only the organizational fields of an existing account.
    /// Name, email, role, and the active flag are never touched here.
    async fn update_account_org_fields(
        &self,
        account_id: &str,
        fields: &AccountOrgFields,
    ) -> Result<Account>;

    // ============= Group Operations =============

    /// Look up a group by name; matching is diacritic- and case-insensitive.
    async fn find_group_by_normalized_name(&self, name: &str) -> Result<Option<Group>>;

    async fn create_group(&self, group: &NewGroup) -> Result<Group>;

    // ============= Membership Operations =============

    /// Apply a membership reconciliation as one atomic write: add all
    /// `connect` links and remove all `disconnect` links, or neither.
    async fn update_account_group_links(
        &self,
        account_id: &str,
        connect: &[String],
        disconnect: &[String],
    ) -> Result<()>;

    async fn get_account_group_ids(&self, account_id: &str) -> Result<Vec<String>>;

    async fn get_account_groups(&self, account_id: &str) -> Result<Vec<Group>>;
}
