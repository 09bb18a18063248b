//! Configuration management for sql-runner.
//!
//! Handles connection parameters, loading named connections from TOML files,
//! and environment variable overrides.

use crate::error::{Result, RunnerError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use url::Url;

/// Connection address used when none is configured.
pub const DEFAULT_URL: &str = "mysql://localhost:3306/musicadb2";

/// User used when none is configured.
pub const DEFAULT_USER: &str = "root";

/// Password used when none is configured.
pub const DEFAULT_PASSWORD: &str = "1234";

/// Schemes of database servers that take a user and password.
const SERVER_SCHEMES: &[&str] = &["mysql", "postgres", "postgresql"];

/// Environment variable overriding the connection address.
pub const ENV_URL: &str = "SQLRUN_URL";

/// Environment variable overriding the user.
pub const ENV_USER: &str = "SQLRUN_USER";

/// Environment variable overriding the password.
pub const ENV_PASSWORD: &str = "SQLRUN_PASSWORD";

/// The three strings needed to open a connection.
///
/// The address is passed through to the driver untouched apart from credential
/// merging; its format is driver-defined.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionParams {
    pub url: String,
    pub user: String,
    pub password: String,
}

impl ConnectionParams {
    pub fn new(url: impl Into<String>, user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            user: user.into(),
            password: password.into(),
        }
    }

    /// Returns the address with a leading `jdbc:` removed.
    pub fn address(&self) -> &str {
        self.url.strip_prefix("jdbc:").unwrap_or(&self.url)
    }

    /// Returns the address scheme (`mysql`, `postgres`, `sqlite`, ...), or an
    /// empty string when there is none.
    pub fn scheme(&self) -> &str {
        self.address().split_once(':').map_or("", |(scheme, _)| scheme)
    }

    fn is_server(&self) -> bool {
        SERVER_SCHEMES.contains(&self.scheme())
    }

    /// Returns the address with user and password merged in.
    ///
    /// Credentials are only added for server schemes whose address names a
    /// host and carries no user of its own. Every other address, including
    /// all SQLite forms, is returned as is.
    pub fn to_connection_string(&self) -> Result<String> {
        let address = self.address();
        if !self.is_server() {
            return Ok(address.to_string());
        }

        let mut url = Url::parse(address).map_err(|e| {
            RunnerError::config(format!("Invalid connection string '{address}': {e}"))
        })?;

        let has_host = url.host_str().is_some_and(|host| !host.is_empty());
        if !has_host || !url.username().is_empty() {
            return Ok(address.to_string());
        }

        if !self.user.is_empty() {
            url.set_username(&self.user)
                .map_err(|_| RunnerError::config("Cannot set user on connection string"))?;
        }
        if !self.password.is_empty() {
            url.set_password(Some(&self.password))
                .map_err(|_| RunnerError::config("Cannot set password on connection string"))?;
        }

        Ok(url.to_string())
    }

    /// Returns a display-safe string (no credentials) for logs.
    pub fn display_string(&self) -> String {
        let address = self.address();
        if !self.is_server() {
            return address.to_string();
        }
        match Url::parse(address) {
            Ok(mut url) => {
                let _ = url.set_password(None);
                let _ = url.set_username("");
                url.to_string()
            }
            Err(_) => address.to_string(),
        }
    }
}

impl Default for ConnectionParams {
    fn default() -> Self {
        Self::new(DEFAULT_URL, DEFAULT_USER, DEFAULT_PASSWORD)
    }
}

impl std::fmt::Debug for ConnectionParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionParams")
            .field("url", &self.display_string())
            .field("user", &self.user)
            .field("password", &"***")
            .finish()
    }
}

/// A named connection as written in the config file.
///
/// Every field is optional; missing ones fall back to the environment and
/// then to the built-in defaults.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct ConnectionConfig {
    /// Connection address, e.g. `mysql://localhost:3306/musicadb2`.
    pub url: Option<String>,

    /// Database user.
    pub user: Option<String>,

    /// Database password (not recommended to store in config).
    pub password: Option<String>,
}

impl ConnectionConfig {
    /// Merges another config into this one, with the other taking precedence.
    pub fn merge(&mut self, other: &ConnectionConfig) {
        if other.url.is_some() {
            self.url = other.url.clone();
        }
        if other.user.is_some() {
            self.user = other.user.clone();
        }
        if other.password.is_some() {
            self.password = other.password.clone();
        }
    }

    /// Fills missing fields from `SQLRUN_URL`, `SQLRUN_USER` and
    /// `SQLRUN_PASSWORD`, read through `lookup`.
    pub fn apply_defaults_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if self.url.is_none() {
            self.url = lookup(ENV_URL);
        }
        if self.user.is_none() {
            self.user = lookup(ENV_USER);
        }
        if self.password.is_none() {
            self.password = lookup(ENV_PASSWORD);
        }
    }

    /// Fills the remaining gaps with the built-in defaults.
    pub fn into_params(self) -> ConnectionParams {
        ConnectionParams {
            url: self.url.unwrap_or_else(|| DEFAULT_URL.to_string()),
            user: self.user.unwrap_or_else(|| DEFAULT_USER.to_string()),
            password: self.password.unwrap_or_else(|| DEFAULT_PASSWORD.to_string()),
        }
    }
}

/// Main configuration structure for sql-runner.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Named database connections.
    #[serde(default)]
    pub connections: HashMap<String, ConnectionConfig>,
}

impl Config {
    /// Returns the default config file path for the current platform.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("sql-runner")
            .join("config.toml")
    }

    /// Loads configuration from a TOML file. A missing file is an empty config.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| RunnerError::config(format!("Failed to read config file: {e}")))?;

        Self::parse_toml(&content, path)
    }

    fn parse_toml(content: &str, path: &Path) -> Result<Self> {
        toml::from_str(content).map_err(|e| {
            RunnerError::config(format!(
                "Configuration error in {}:\n  {}",
                path.display(),
                e
            ))
        })
    }

    /// Gets a named connection, or the default connection if name is None.
    pub fn get_connection(&self, name: Option<&str>) -> Option<&ConnectionConfig> {
        let key = name.unwrap_or("default");
        self.connections.get(key)
    }
}
