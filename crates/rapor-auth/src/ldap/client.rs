//! Directory client
//!
//! One short-lived connection per login attempt: bind with the user's own
//! credentials, then a best-effort attribute search. The bind alone decides
//! authentication; a failed or empty search degrades to a minimal identity
//! instead of failing the login. Nothing from this module escapes as an
//! error: the caller sees an identity or `None`.
//!
//! Post-bind transport drops surface through the search result here, so
//! they take the minimal-identity path rather than failing the login. The
//! bind already proved the credentials; the overall attempt timeout still
//! bounds a connection that stops responding entirely.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use ldap3::{
    ldap_escape, Ldap, LdapConnAsync, LdapConnSettings, Scope, SearchEntry, SearchOptions,
    SearchResult,
};
use rapor_core::config::DirectoryConfig;
use rapor_core::{Error, Result};
use tracing::{debug, info, warn};

use super::entry::parse_entry;
use super::types::DirectoryIdentity;

/// Seam between the authentication service and the directory protocol.
#[async_trait]
pub trait DirectoryAuthenticator: Send + Sync {
    /// Validate the credentials and return the directory identity, or
    /// `None` on any failure. Diagnostic detail is logged, never returned.
    async fn authenticate(&self, username: &str, password: &str) -> Option<DirectoryIdentity>;
}

pub struct LdapDirectoryClient {
    config: DirectoryConfig,
    closed_connections: Arc<AtomicU64>,
}

/// Counts a connection teardown exactly once, whichever of the racing
/// completion paths (bind error, search outcome, transport error, overall
/// timeout cancellation) reaches it first.
struct TeardownGuard {
    counter: Arc<AtomicU64>,
    done: bool,
}

impl TeardownGuard {
    fn new(counter: Arc<AtomicU64>) -> Self {
        Self {
            counter,
            done: false,
        }
    }

    fn mark(&mut self) {
        if !self.done {
            self.done = true;
            self.counter.fetch_add(1, Ordering::SeqCst);
        }
    }
}

impl Drop for TeardownGuard {
    fn drop(&mut self) {
        self.mark();
    }
}

impl LdapDirectoryClient {
    pub fn new(config: DirectoryConfig) -> Self {
        Self {
            config,
            closed_connections: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Number of directory connections torn down since construction.
    /// One per completed or cancelled attempt that reached the server.
    pub fn closed_connections(&self) -> u64 {
        self.closed_connections.load(Ordering::SeqCst)
    }

    async fn try_authenticate(&self, username: &str, password: &str) -> Option<DirectoryIdentity> {
        // An empty password would turn the simple bind into an anonymous
        // bind, which many servers accept.
        if username.is_empty() || password.is_empty() {
            debug!("Rejecting login with empty username or password");
            return None;
        }

        let settings = LdapConnSettings::new()
            .set_conn_timeout(Duration::from_secs(self.config.connect_timeout_secs))
            .set_starttls(self.config.start_tls);

        debug!("Connecting to directory: {}", self.config.url);

        let (conn, mut ldap) = match LdapConnAsync::with_settings(settings, &self.config.url).await
        {
            Ok(pair) => pair,
            Err(e) => {
                warn!("Failed to connect to directory {}: {}", self.config.url, e);
                return None;
            }
        };

        ldap3::drive!(conn);
        let mut guard = TeardownGuard::new(self.closed_connections.clone());

        let principal = self.config.principal_name(username);
        let bind = match ldap.simple_bind(&principal, password).await {
            Ok(result) => result,
            Err(e) => {
                warn!("Directory bind transport error for {}: {}", principal, e);
                let _ = ldap.unbind().await;
                guard.mark();
                return None;
            }
        };

        if bind.rc != 0 {
            // Invalid credentials, disabled account, expired password...
            // the caller only learns that the login failed.
            debug!(
                "Directory bind rejected for {}: rc={} {}",
                principal, bind.rc, bind.text
            );
            let _ = ldap.unbind().await;
            guard.mark();
            return None;
        }

        let identity = match self.search_identity(&mut ldap, username).await {
            Ok(Some(identity)) => identity,
            Ok(None) => {
                info!(
                    "Directory returned no entry for {} after a successful bind, \
                     using minimal identity",
                    username
                );
                self.minimal_identity(username)
            }
            Err(e) => {
                warn!(
                    "Directory search failed for {} after a successful bind ({}), \
                     using minimal identity",
                    username, e
                );
                self.minimal_identity(username)
            }
        };

        let _ = ldap.unbind().await;
        guard.mark();

        Some(identity)
    }

    async fn search_identity(
        &self,
        ldap: &mut Ldap,
        username: &str,
    ) -> Result<Option<DirectoryIdentity>> {
        let user = ldap_escape(username);
        let filter = format!(
            "(|(sAMAccountName={u})(cn={u})(userPrincipalName={u}@*))",
            u = user
        );

        debug!("Searching directory with filter: {}", filter);

        // Empty attribute list asks for everything; requesting localized
        // attribute display names by name runs into encoding trouble.
        let SearchResult(entries, outcome) = ldap
            .with_search_options(SearchOptions::new().sizelimit(1))
            .with_timeout(Duration::from_secs(self.config.search_timeout_secs))
            .search(
                &self.config.base_dn,
                Scope::Subtree,
                &filter,
                Vec::<String>::new(),
            )
            .await
            .map_err(|e| Error::DirectoryUnavailable(e.to_string()))?;

        match entries.into_iter().next() {
            Some(entry) => {
                let entry = SearchEntry::construct(entry);
                Ok(Some(parse_entry(
                    &entry.attrs,
                    username,
                    &self.config.domain(),
                    &self.config.default_group,
                )))
            }
            // rc 4 is sizeLimitExceeded, which the sizelimit(1) option invites
            None if outcome.rc == 0 || outcome.rc == 4 => Ok(None),
            None => Err(Error::DirectoryUnavailable(format!(
                "search failed: rc={} {}",
                outcome.rc, outcome.text
            ))),
        }
    }

    fn minimal_identity(&self, username: &str) -> DirectoryIdentity {
        DirectoryIdentity::minimal(username, &self.config.domain(), &self.config.default_group)
    }
}

#[async_trait]
impl DirectoryAuthenticator for LdapDirectoryClient {
    async fn authenticate(&self, username: &str, password: &str) -> Option<DirectoryIdentity> {
        let attempt = Duration::from_secs(self.config.attempt_timeout_secs);

        // The overall budget bounds connect + bind + search together; on
        // expiry the in-flight future is dropped, which closes the
        // connection and fires the teardown guard.
        match tokio::time::timeout(attempt, self.try_authenticate(username, password)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    "Directory authentication for {} timed out after {}s",
                    username, self.config.attempt_timeout_secs
                );
                None
            }
        }
    }
}
