// Resource Descriptor
// Desired database state supplied by the orchestration layer

use crate::db::connection::ConnectionParams;
use crate::db::traits::{DatabaseError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Convergence actions. The set is closed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Create,
    Drop,
    Query,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Create => "create",
            Action::Drop => "drop",
            Action::Query => "query",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = DatabaseError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "create" => Ok(Action::Create),
            "drop" => Ok(Action::Drop),
            "query" => Ok(Action::Query),
            other => Err(DatabaseError::InvalidConfig(format!(
                "Unknown action '{}', expected one of: create, drop, query",
                other
            ))),
        }
    }
}

/// Desired state of one database
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceDescriptor {
    #[serde(alias = "databaseName")]
    pub database_name: String,
    #[serde(default)]
    pub template: Option<String>,
    /// `DEFAULT` is rendered as a keyword, anything else as a string literal
    #[serde(default)]
    pub encoding: Option<String>,
    #[serde(default)]
    pub tablespace: Option<String>,
    /// Used for both LC_CTYPE and LC_COLLATE
    #[serde(default)]
    pub collation: Option<String>,
    #[serde(default, alias = "connectionLimit")]
    pub connection_limit: Option<i32>,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default, alias = "sqlQuery")]
    pub sql_query: Option<String>,
    #[serde(default)]
    pub connection: ConnectionParams,
}

impl ResourceDescriptor {
    pub fn new(database_name: impl Into<String>) -> Self {
        Self {
            database_name: database_name.into(),
            template: None,
            encoding: None,
            tablespace: None,
            collation: None,
            connection_limit: None,
            owner: None,
            sql_query: None,
            connection: ConnectionParams::default(),
        }
    }

    pub fn with_connection(mut self, connection: ConnectionParams) -> Self {
        self.connection = connection;
        self
    }

    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    pub fn with_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.encoding = Some(encoding.into());
        self
    }

    pub fn with_sql_query(mut self, sql: impl Into<String>) -> Self {
        self.sql_query = Some(sql.into());
        self
    }

    /// Check the fields an action needs before anything touches the server
    pub fn validate(&self, action: Action) -> Result<()> {
        if self.database_name.trim().is_empty() {
            return Err(DatabaseError::InvalidConfig(
                "Database name is required".to_string(),
            ));
        }
        if action == Action::Query
            && self
                .sql_query
                .as_ref()
                .map(|q| q.trim().is_empty())
                .unwrap_or(true)
        {
            return Err(DatabaseError::InvalidConfig(format!(
                "sql_query is required for the query action on database {}",
                self.database_name
            )));
        }
        Ok(())
    }
}

impl fmt::Display for ResourceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "database[{}]", self.database_name)
    }
}
