//! Configuration for Rapor

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RaporConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub directory: DirectoryConfig,
}

impl Default for RaporConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            logging: LoggingConfig::default(),
            directory: DirectoryConfig::default(),
        }
    }
}

impl RaporConfig {
    pub fn from_file(path: &str) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| crate::Error::InternalError(format!("Failed to read config: {}", e)))?;

        toml::from_str(&content)
            .map_err(|e| crate::Error::InternalError(format!("Failed to parse config: {}", e)))
    }

    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(addr) = std::env::var("RAPOR_BIND_ADDRESS") {
            config.server.bind_address = addr;
        }
        if let Ok(port) = std::env::var("RAPOR_PORT") {
            if let Ok(p) = port.parse() {
                config.server.port = p;
            }
        }
        if let Ok(url) = std::env::var("RAPOR_DATABASE_URL") {
            config.database.url = url;
        }
        if let Ok(level) = std::env::var("RAPOR_LOG_LEVEL") {
            config.logging.level = level;
        }
        if let Ok(url) = std::env::var("RAPOR_DIRECTORY_URL") {
            config.directory.url = url;
        }
        if let Ok(base_dn) = std::env::var("RAPOR_DIRECTORY_BASE_DN") {
            config.directory.base_dn = base_dn;
        }
        if let Ok(bind_dn) = std::env::var("RAPOR_DIRECTORY_BIND_DN") {
            config.directory.bind_dn = Some(bind_dn);
        }
        if let Ok(password) = std::env::var("RAPOR_DIRECTORY_BIND_PASSWORD") {
            config.directory.bind_password = Some(password);
        }

        config
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 8080,
            request_timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite:///data/rapor/rapor.db?mode=rwc".to_string(),
            max_connections: 50,
            min_connections: 2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

/// Directory (LDAP/Active Directory) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryConfig {
    /// Directory server URL (ldap:// or ldaps://)
    #[serde(default = "default_directory_url")]
    pub url: String,

    /// Use STARTTLS for connection upgrade
    #[serde(default)]
    pub start_tls: bool,

    /// Base DN the portal's users live under; its DC components also yield
    /// the logon domain used for principal names and fallback emails.
    #[serde(default = "default_base_dn")]
    pub base_dn: String,

    /// Optional service account for maintenance queries. Login itself always
    /// binds with the end user's own credentials.
    #[serde(default)]
    pub bind_dn: Option<String>,

    #[serde(default)]
    pub bind_password: Option<String>,

    /// Keywords matched (normalized, substring) against directory group
    /// names to grant the admin role.
    #[serde(default = "default_admin_groups")]
    pub admin_groups: Vec<String>,

    /// Group assigned when the directory reports no membership at all.
    #[serde(default = "default_group_name")]
    pub default_group: String,

    /// Overall budget for one authentication attempt.
    #[serde(default = "default_attempt_timeout")]
    pub attempt_timeout_secs: u64,

    /// TCP connect budget, inside the attempt budget.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Attribute search budget, inside the attempt budget.
    #[serde(default = "default_search_timeout")]
    pub search_timeout_secs: u64,
}

fn default_directory_url() -> String {
    "ldap://localhost:389".to_string()
}

fn default_base_dn() -> String {
    "DC=cashmgmt,DC=net".to_string()
}

fn default_admin_groups() -> Vec<String> {
    vec![
        "domain admins".to_string(),
        "administrators".to_string(),
        "yöneticiler".to_string(),
        "tr-rg-manager".to_string(),
    ]
}

fn default_group_name() -> String {
    "General Users".to_string()
}

fn default_attempt_timeout() -> u64 {
    15
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_search_timeout() -> u64 {
    5
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            url: default_directory_url(),
            start_tls: false,
            base_dn: default_base_dn(),
            bind_dn: None,
            bind_password: None,
            admin_groups: default_admin_groups(),
            default_group: default_group_name(),
            attempt_timeout_secs: default_attempt_timeout(),
            connect_timeout_secs: default_connect_timeout(),
            search_timeout_secs: default_search_timeout(),
        }
    }
}

impl DirectoryConfig {
    /// Logon domain derived from the base DN: each `DC=` component joined
    /// with dots, e.g. `DC=cashmgmt,DC=net` -> `cashmgmt.net`.
    pub fn domain(&self) -> String {
        self.base_dn
            .split(',')
            .filter_map(|part| {
                let part = part.trim();
                match part.get(..3) {
                    Some(prefix) if prefix.eq_ignore_ascii_case("dc=") => Some(&part[3..]),
                    _ => None,
                }
            })
            .collect::<Vec<_>>()
            .join(".")
    }

    /// User principal name used for the login bind.
    pub fn principal_name(&self, username: &str) -> String {
        format!("{}@{}", username, self.domain())
    }

    pub fn validate(&self) -> crate::Result<()> {
        if self.url.is_empty() {
            return Err(crate::Error::InvalidArgument(
                "Directory URL is required".into(),
            ));
        }

        if !self.url.starts_with("ldap://") && !self.url.starts_with("ldaps://") {
            return Err(crate::Error::InvalidArgument(
                "Directory URL must start with ldap:// or ldaps://".into(),
            ));
        }

        if self.base_dn.is_empty() {
            return Err(crate::Error::InvalidArgument(
                "Directory base DN is required".into(),
            ));
        }

        if self.domain().is_empty() {
            return Err(crate::Error::InvalidArgument(
                "Directory base DN has no DC components".into(),
            ));
        }

        Ok(())
    }
}
