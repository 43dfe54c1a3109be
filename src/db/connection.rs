// Connection Parameters
// Resolves the descriptor's connection record against caller-supplied defaults

use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_PORT: u16 = 5432;
pub const DEFAULT_USERNAME: &str = "postgres";
pub const DEFAULT_HOST: &str = "localhost";
pub const ADMIN_DATABASE: &str = "template1";

/// Connection record carried by a resource descriptor
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionParams {
    pub host: Option<String>,
    pub port: Option<u16>,
    #[serde(alias = "user")]
    pub username: Option<String>,
    #[serde(skip_serializing)] // Don't serialize password
    pub password: Option<String>,
    /// Overrides the database every action would otherwise target
    #[serde(alias = "dbname")]
    pub database: Option<String>,
}

impl ConnectionParams {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: Some(host.into()),
            ..Self::default()
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }
}

/// Defaults injected by the layer above the core.
///
/// This replaces any lookup of node-wide settings: whatever resolves a
/// password from files or the environment does so before building this.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionDefaults {
    pub host: String,
    #[serde(skip_serializing)]
    pub password: Option<String>,
    pub admin_database: String,
}

impl Default for ConnectionDefaults {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            password: None,
            admin_database: ADMIN_DATABASE.to_string(),
        }
    }
}

impl ConnectionDefaults {
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Resolve the parameters for one connection.
    ///
    /// An explicit `database` in the record always wins over `requested`.
    pub fn resolve(&self, params: &ConnectionParams, requested: &str) -> ResolvedConnection {
        ResolvedConnection {
            host: params.host.clone().unwrap_or_else(|| self.host.clone()),
            port: params.port.unwrap_or(DEFAULT_PORT),
            username: params
                .username
                .clone()
                .unwrap_or_else(|| DEFAULT_USERNAME.to_string()),
            password: params.password.clone().or_else(|| self.password.clone()),
            database: params
                .database
                .clone()
                .unwrap_or_else(|| requested.to_string()),
        }
    }
}

/// Fully resolved target for a single session
#[derive(Clone, PartialEq, Eq)]
pub struct ResolvedConnection {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: Option<String>,
    pub database: String,
}

// Hand-written so the password never reaches a log line
impl fmt::Debug for ResolvedConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedConnection")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("database", &self.database)
            .finish()
    }
}

impl fmt::Display for ResolvedConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "database {} on {}:{} as {}",
            self.database, self.host, self.port, self.username
        )
    }
}
