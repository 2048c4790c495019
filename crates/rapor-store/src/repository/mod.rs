//! Portal repository
//!
//! SQLite-backed implementation of [`PortalRepository`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rapor_core::types::{Account, AccountOrgFields, Group, NewAccount, NewGroup, Role};
use rapor_core::utils::normalize;
use rapor_core::{Error, Result};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use tracing::{debug, info};

use crate::traits::PortalRepository;

pub struct PortalStore {
    pool: SqlitePool,
}

type AccountRow = (
    String,         // id
    String,         // email
    String,         // first_name
    String,         // last_name
    String,         // normalized_first_name
    String,         // normalized_last_name
    Option<String>, // phone
    Option<String>, // department
    Option<String>, // title
    Option<String>, // office
    Option<String>, // distinguished_name
    String,         // role
    bool,           // is_active
    String,         // created_at
);

type GroupRow = (String, String, String, Option<String>, String);

const ACCOUNT_COLUMNS: &str = "id, email, first_name, last_name, \
     normalized_first_name, normalized_last_name, phone, department, title, \
     office, distinguished_name, role, is_active, created_at";

impl PortalStore {
    pub async fn new(database_url: &str) -> Result<Self> {
        Self::with_pool_size(database_url, 50).await
    }

    pub async fn with_pool_size(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(|e| Error::DatabaseError(e.to_string()))?;

        let store = Self { pool };
        store.init().await?;

        Ok(store)
    }

    async fn init(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS accounts (
                id TEXT PRIMARY KEY,
                email TEXT NOT NULL COLLATE NOCASE UNIQUE,
                first_name TEXT NOT NULL,
                last_name TEXT NOT NULL,
                normalized_first_name TEXT NOT NULL,
                normalized_last_name TEXT NOT NULL,
                phone TEXT,
                department TEXT,
                title TEXT,
                office TEXT,
                distinguished_name TEXT,
                role TEXT NOT NULL DEFAULT 'user',
                is_active INTEGER NOT NULL DEFAULT 1,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| Error::DatabaseError(e.to_string()))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS groups (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                normalized_name TEXT UNIQUE NOT NULL,
                description TEXT,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| Error::DatabaseError(e.to_string()))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS memberships (
                account_id TEXT NOT NULL,
                group_id TEXT NOT NULL,
                PRIMARY KEY (account_id, group_id)
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| Error::DatabaseError(e.to_string()))?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_memberships_group ON memberships(group_id)
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| Error::DatabaseError(e.to_string()))?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_accounts_normalized_names
            ON accounts(normalized_last_name, normalized_first_name)
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| Error::DatabaseError(e.to_string()))?;

        info!("Portal store initialized");
        Ok(())
    }

    /// Administrative on/off switch. Directory sync never changes this flag,
    /// so a deactivation here sticks across logins.
    pub async fn set_account_active(&self, account_id: &str, is_active: bool) -> Result<Account> {
        let result = sqlx::query("UPDATE accounts SET is_active = ? WHERE id = ?")
            .bind(is_active)
            .bind(account_id)
            .execute(&self.pool)
            .await
            .map_err(|e| Error::DatabaseError(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(Error::EntityNotFound(format!("account {}", account_id)));
        }

        self.get_account(account_id).await
    }

    async fn get_account(&self, account_id: &str) -> Result<Account> {
        let row: Option<AccountRow> = sqlx::query_as(&format!(
            "SELECT {} FROM accounts WHERE id = ?",
            ACCOUNT_COLUMNS
        ))
        .bind(account_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| Error::DatabaseError(e.to_string()))?;

        row.map(account_from_row)
            .transpose()?
            .ok_or_else(|| Error::EntityNotFound(format!("account {}", account_id)))
    }
}

fn account_from_row(r: AccountRow) -> Result<Account> {
    Ok(Account {
        id: r.0,
        email: r.1,
        first_name: r.2,
        last_name: r.3,
        normalized_first_name: r.4,
        normalized_last_name: r.5,
        phone: r.6,
        department: r.7,
        title: r.8,
        office: r.9,
        distinguished_name: r.10,
        role: Role::from_str(&r.11)?,
        is_active: r.12,
        created_at: parse_timestamp(&r.13)?,
    })
}

fn group_from_row(r: GroupRow) -> Result<Group> {
    Ok(Group {
        id: r.0,
        name: r.1,
        normalized_name: r.2,
        description: r.3,
        created_at: parse_timestamp(&r.4)?,
    })
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| Error::DatabaseError(format!("Invalid timestamp {}: {}", s, e)))
}

#[async_trait]
impl PortalRepository for PortalStore {
    async fn find_account_by_email(&self, email: &str) -> Result<Option<Account>> {
        let row: Option<AccountRow> = sqlx::query_as(&format!(
            "SELECT {} FROM accounts WHERE email = ?",
            ACCOUNT_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| Error::DatabaseError(e.to_string()))?;

        row.map(account_from_row).transpose()
    }

    async fn create_account(&self, account: &NewAccount) -> Result<Account> {
        let account = account.clone().into_account();

        sqlx::query(
            r#"
            INSERT INTO accounts (
                id, email, first_name, last_name,
                normalized_first_name, normalized_last_name,
                phone, department, title, office, distinguished_name,
                role, is_active, created_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&account.id)
        .bind(&account.email)
        .bind(&account.first_name)
        .bind(&account.last_name)
        .bind(&account.normalized_first_name)
        .bind(&account.normalized_last_name)
        .bind(&account.phone)
        .bind(&account.department)
        .bind(&account.title)
        .bind(&account.office)
        .bind(&account.distinguished_name)
        .bind(account.role.as_str())
        .bind(account.is_active)
        .bind(account.created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if e.to_string().contains("UNIQUE constraint") {
                Error::AccountAlreadyExists
            } else {
                Error::DatabaseError(e.to_string())
            }
        })?;

        debug!("Created account: {}", account.email);
        Ok(account)
    }

    async fn update_account_org_fields(
        &self,
        account_id: &str,
        fields: &AccountOrgFields,
    ) -> Result<Account> {
        sqlx::query(
            r#"
            UPDATE accounts
            SET phone = ?, department = ?, title = ?, office = ?, distinguished_name = ?
            WHERE id = ?
            "#,
        )
        .bind(&fields.phone)
        .bind(&fields.department)
        .bind(&fields.title)
        .bind(&fields.office)
        .bind(&fields.distinguished_name)
        .bind(account_id)
        .execute(&self.pool)
        .await
        .map_err(|e| Error::DatabaseError(e.to_string()))?;

        self.get_account(account_id).await
    }

    async fn find_group_by_normalized_name(&self, name: &str) -> Result<Option<Group>> {
        let row: Option<GroupRow> = sqlx::query_as(
            r#"
            SELECT id, name, normalized_name, description, created_at
            FROM groups WHERE normalized_name = ?
            "#,
        )
        .bind(normalize(name))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| Error::DatabaseError(e.to_string()))?;

        row.map(group_from_row).transpose()
    }

    async fn create_group(&self, group: &NewGroup) -> Result<Group> {
        let group = group.clone().into_group();

        sqlx::query(
            r#"
            INSERT INTO groups (id, name, normalized_name, description, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&group.id)
        .bind(&group.name)
        .bind(&group.normalized_name)
        .bind(&group.description)
        .bind(group.created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if e.to_string().contains("UNIQUE constraint") {
                Error::GroupAlreadyExists
            } else {
                Error::DatabaseError(e.to_string())
            }
        })?;

        debug!("Created group: {}", group.name);
        Ok(group)
    }

    async fn update_account_group_links(
        &self,
        account_id: &str,
        connect: &[String],
        disconnect: &[String],
    ) -> Result<()> {
        if connect.is_empty() && disconnect.is_empty() {
            return Ok(());
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| Error::DatabaseError(e.to_string()))?;

        for group_id in connect {
            sqlx::query(
                r#"
                INSERT OR IGNORE INTO memberships (account_id, group_id)
                VALUES (?, ?)
                "#,
            )
            .bind(account_id)
            .bind(group_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| Error::DatabaseError(e.to_string()))?;
        }

        for group_id in disconnect {
            sqlx::query(
                r#"
                DELETE FROM memberships WHERE account_id = ? AND group_id = ?
                "#,
            )
            .bind(account_id)
            .bind(group_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| Error::DatabaseError(e.to_string()))?;
        }

        tx.commit()
            .await
            .map_err(|e| Error::DatabaseError(e.to_string()))?;

        debug!(
            "Updated memberships for {}: +{} -{}",
            account_id,
            connect.len(),
            disconnect.len()
        );
        Ok(())
    }

    async fn get_account_group_ids(&self, account_id: &str) -> Result<Vec<String>> {
        let rows: Vec<(String,)> = sqlx::query_as(
            r#"
            SELECT group_id FROM memberships WHERE account_id = ?
            "#,
        )
        .bind(account_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| Error::DatabaseError(e.to_string()))?;

        Ok(rows.into_iter().map(|r| r.0).collect())
    }

    async fn get_account_groups(&self, account_id: &str) -> Result<Vec<Group>> {
        let rows: Vec<GroupRow> = sqlx::query_as(
            r#"
            SELECT g.id, g.name, g.normalized_name, g.description, g.created_at
            FROM groups g
            JOIN memberships m ON m.group_id = g.id
            WHERE m.account_id = ?
            ORDER BY g.name
            "#,
        )
        .bind(account_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| Error::DatabaseError(e.to_string()))?;

        rows.into_iter().map(group_from_row).collect()
    }
}
